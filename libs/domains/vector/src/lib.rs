//! Vector Domain Library
//!
//! Vector index storage on Qdrant plus text embedding generation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ VectorRepository│     │ EmbeddingProvider│
//! │   (trait)       │     │    (trait)       │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//! ┌────────▼────────┐     ┌────────▼─────────┐
//! │ QdrantRepository│     │  OpenAIProvider  │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! Entries are keyed by the caller's id. Ids that are not UUIDs (MongoDB
//! ObjectIds, for instance) are mapped to a deterministic UUIDv5 point id and
//! the original id is kept in the payload, so re-indexing the same id always
//! replaces the same point.
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_vector::{
//!     EmbeddingConfig, EmbeddingProvider, IndexEntry, OpenAIProvider, QdrantConfig,
//!     QdrantRepository, VectorRepository,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedding = EmbeddingConfig::from_env()?;
//! let repository = QdrantRepository::new(QdrantConfig::from_env()?, embedding.vector_config())?;
//! repository.ensure_collection().await?;
//!
//! let provider = OpenAIProvider::from_env()?;
//! let result = provider.embed(&embedding.model, "Tomato soup").await?;
//! repository.upsert(IndexEntry::new("65f1c2a9e4b0a1b2c3d4e5f6", result.values)).await?;
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod models;
pub mod qdrant;
pub mod repository;

pub use embedding::{EmbeddingConfig, EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{VectorError, VectorResult};
pub use models::{
    DistanceMetric, EmbeddingModel, EmbeddingResult, IndexEntry, SearchQuery, SearchResult,
    VectorConfig,
};
pub use qdrant::{QdrantConfig, QdrantRepository};
pub use repository::VectorRepository;
