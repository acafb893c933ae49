use std::sync::Arc;

use domain_vector::{EmbeddingConfig, EmbeddingProvider, VectorError, VectorResult};
use tracing::{debug, info};

use crate::models::Recipe;
use crate::text::recipe_text;

const PROBE_TEXT: &str = "embedding model probe";

/// Turns recipes (or free text) into vectors with one configured model
#[derive(Clone)]
pub struct RecipeEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    config: EmbeddingConfig,
}

impl RecipeEmbedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: EmbeddingConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    pub async fn embed_text(&self, text: &str) -> VectorResult<Vec<f32>> {
        let result = self.provider.embed(&self.config.model, text).await?;
        debug!(dimension = result.dimension, "Text embedded");
        Ok(result.values)
    }

    pub async fn embed_recipe(&self, recipe: &Recipe) -> VectorResult<Vec<f32>> {
        self.embed_text(&recipe_text(recipe)).await
    }

    /// Embed a fixed text once and check the width against the configured
    /// dimension. Fails when the model is unreachable or mis-sized.
    pub async fn probe(&self) -> VectorResult<u32> {
        let values = self.embed_text(PROBE_TEXT).await?;
        let width = values.len() as u32;

        if width != self.config.dimension {
            return Err(VectorError::Config(format!(
                "model '{}' produces {}-dimensional vectors, configured dimension is {}",
                self.config.model.model_name(),
                width,
                self.config.dimension
            )));
        }

        info!(
            model = self.config.model.model_name(),
            dimension = width,
            "Embedding model ready"
        );
        Ok(width)
    }
}
