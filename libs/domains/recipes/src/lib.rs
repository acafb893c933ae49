//! Recipe Domain Library
//!
//! Recipes as stored in MongoDB, the text they are embedded from, and the
//! backfill that indexes unembedded recipes in the vector store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │     BackfillPipeline     │  ← embed → index → link, one recipe at a time
//! └──┬──────────┬─────────┬──┘
//!    │          │         │
//! ┌──▼────────┐ │ ┌───────▼──────────┐
//! │ Recipe    │ │ │ VectorRepository │  (domain_vector)
//! │ Embedder  │ │ └──────────────────┘
//! └───────────┘ │
//!      ┌────────▼─────────┐
//!      │ RecipeRepository │ ← MongoRecipeRepository
//!      └──────────────────┘
//! ```

pub mod backfill;
pub mod embedder;
pub mod error;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod text;

#[cfg(test)]
mod fakes;

pub use backfill::{BackfillPipeline, BackfillReport, FailureStage, RecordFailure, RecordState};
pub use embedder::RecipeEmbedder;
pub use error::{RecipeError, RecipeResult};
pub use models::{EmbeddingReference, Recipe, RecipeIngredient};
pub use self::mongodb::MongoRecipeRepository;
pub use repository::{RecipeRepository, RecipeStream};
pub use text::recipe_text;
