use serde::{Deserialize, Serialize};

/// Distance metric for similarity calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
    Manhattan,
}

/// Vector collection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorConfig {
    pub dimension: u32,
    pub distance: DistanceMetric,
}

impl VectorConfig {
    /// Cosine collection of the given width
    pub fn new(dimension: u32) -> Self {
        Self {
            dimension,
            distance: DistanceMetric::default(),
        }
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }
}

/// An entry in the vector index, keyed by the caller's identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// External identifier (a document id). Returned unchanged by upsert.
    pub id: String,
    pub values: Vec<f32>,
    /// Denormalized snapshot of the source document
    pub payload: Option<serde_json::Value>,
}

impl IndexEntry {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub limit: u32,
    pub score_threshold: Option<f32>,
    pub with_payloads: bool,
}

impl SearchQuery {
    pub fn new(vector: Vec<f32>, limit: u32) -> Self {
        Self {
            vector,
            limit,
            score_threshold: None,
            with_payloads: true,
        }
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }
}

/// One nearest-neighbour hit, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
}

/// Embedding model selection
///
/// Known models carry their native output width; anything else is
/// `Custom` and relies on the configured dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmbeddingModel {
    /// sentence-transformers all-MiniLM-L6-v2 (384 dimensions)
    #[default]
    AllMiniLmL6V2,
    /// sentence-transformers all-MiniLM-L12-v2 (384 dimensions)
    AllMiniLmL12V2,
    /// sentence-transformers all-mpnet-base-v2 (768 dimensions)
    AllMpnetBaseV2,
    /// BAAI bge-small-en-v1.5 (384 dimensions)
    BgeSmallEnV15,
    /// nomic-embed-text v1.5 (768 dimensions)
    NomicEmbedTextV15,
    /// OpenAI text-embedding-3-small (1536 dimensions)
    TextEmbedding3Small,
    /// OpenAI text-embedding-3-large (3072 dimensions)
    TextEmbedding3Large,
    Custom { name: String, dimension: u32 },
}

impl EmbeddingModel {
    /// Resolve a model identifier; unknown names become `Custom` with
    /// `fallback_dimension`.
    pub fn from_name(name: &str, fallback_dimension: u32) -> Self {
        let trimmed = name.trim();
        let short = trimmed
            .strip_prefix("sentence-transformers/")
            .or_else(|| trimmed.strip_prefix("BAAI/"))
            .or_else(|| trimmed.strip_prefix("nomic-ai/"))
            .unwrap_or(trimmed);

        match short.to_ascii_lowercase().as_str() {
            "all-minilm-l6-v2" | "all-minilm" => EmbeddingModel::AllMiniLmL6V2,
            "all-minilm-l12-v2" => EmbeddingModel::AllMiniLmL12V2,
            "all-mpnet-base-v2" => EmbeddingModel::AllMpnetBaseV2,
            "bge-small-en-v1.5" => EmbeddingModel::BgeSmallEnV15,
            "nomic-embed-text" | "nomic-embed-text-v1.5" => EmbeddingModel::NomicEmbedTextV15,
            "text-embedding-3-small" => EmbeddingModel::TextEmbedding3Small,
            "text-embedding-3-large" => EmbeddingModel::TextEmbedding3Large,
            _ => EmbeddingModel::Custom {
                name: trimmed.to_string(),
                dimension: fallback_dimension,
            },
        }
    }

    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::AllMiniLmL6V2 => 384,
            EmbeddingModel::AllMiniLmL12V2 => 384,
            EmbeddingModel::AllMpnetBaseV2 => 768,
            EmbeddingModel::BgeSmallEnV15 => 384,
            EmbeddingModel::NomicEmbedTextV15 => 768,
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::Custom { dimension, .. } => *dimension,
        }
    }

    /// Identifier sent to the embedding endpoint
    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingModel::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            EmbeddingModel::AllMiniLmL12V2 => "all-MiniLM-L12-v2",
            EmbeddingModel::AllMpnetBaseV2 => "all-mpnet-base-v2",
            EmbeddingModel::BgeSmallEnV15 => "bge-small-en-v1.5",
            EmbeddingModel::NomicEmbedTextV15 => "nomic-embed-text",
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
            EmbeddingModel::Custom { name, .. } => name,
        }
    }
}

/// Embedding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: u32,
}

impl EmbeddingResult {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            dimension: values.len() as u32,
            values,
            tokens_used: 0,
        }
    }
}
