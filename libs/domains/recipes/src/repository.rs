use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::RecipeResult;
use crate::models::{EmbeddingReference, Recipe};

/// Stream of recipes; decoding failures surface as items, not as the end of the stream
pub type RecipeStream = BoxStream<'static, RecipeResult<Recipe>>;

/// Repository trait for recipe persistence
///
/// This trait defines the data access contract used by the embedding backfill.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Recipes without an embedding reference, read lazily.
    ///
    /// Each call queries current state, so a new call after some recipes were
    /// linked no longer yields them.
    async fn records_needing_embedding(&self) -> RecipeResult<RecipeStream>;

    /// Number of recipes without an embedding reference
    async fn count_needing_embedding(&self) -> RecipeResult<u64>;

    /// Get a recipe by ID
    async fn get_by_id(&self, id: &str) -> RecipeResult<Option<Recipe>>;

    /// Set the embedding reference on an existing recipe and bump its
    /// modification time. Never creates a recipe; an unknown id is
    /// `RecipeError::NotFound`.
    async fn update_embedding_reference(
        &self,
        recipe_id: &str,
        index_name: &str,
        vector_id: &str,
    ) -> RecipeResult<EmbeddingReference>;
}
