use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{IndexEntry, SearchQuery, SearchResult, VectorConfig};

/// Repository trait for the vector index
///
/// An implementation is bound to one collection. Entries are keyed by the
/// caller's identifier and every write fully replaces the previous entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Name of the collection this repository writes to
    fn collection_name(&self) -> &str;

    /// Width and metric the collection is (or will be) created with
    fn vector_config(&self) -> &VectorConfig;

    /// Whether the collection already exists
    async fn collection_exists(&self) -> VectorResult<bool>;

    /// Create the collection unless it exists. Returns `true` when created.
    async fn ensure_collection(&self) -> VectorResult<bool>;

    /// Insert or fully replace the entry keyed by `entry.id`.
    ///
    /// Returns `entry.id` unchanged.
    async fn upsert(&self, entry: IndexEntry) -> VectorResult<String>;

    /// Nearest neighbours, highest score first, at most `query.limit` hits
    async fn search(&self, query: SearchQuery) -> VectorResult<Vec<SearchResult>>;

    /// Remove an entry; succeeds when it does not exist
    async fn delete(&self, id: &str) -> VectorResult<()>;
}
