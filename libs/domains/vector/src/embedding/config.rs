use core_config::{ConfigError, FromEnv, env_optional, env_parse_or};

use crate::models::{EmbeddingModel, VectorConfig};

/// Which model to embed with and the width its vectors must have
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    pub model: EmbeddingModel,
    pub dimension: u32,
}

impl EmbeddingConfig {
    pub fn new(model: EmbeddingModel) -> Self {
        let dimension = model.dimension();
        Self { model, dimension }
    }

    /// Collection settings matching this model
    pub fn vector_config(&self) -> VectorConfig {
        VectorConfig::new(self.dimension)
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::new(EmbeddingModel::default())
    }
}

/// `EMBEDDING_MODEL` (default `all-MiniLM-L6-v2`) and `EMBEDDING_DIMENSION`
/// (default: the model's native width, 384 for unknown models)
impl FromEnv for EmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let explicit: Option<u32> = match env_optional("EMBEDDING_DIMENSION") {
            Some(_) => Some(env_parse_or("EMBEDDING_DIMENSION", 0)?),
            None => None,
        };

        if explicit == Some(0) {
            return Err(ConfigError::Invalid {
                key: "EMBEDDING_DIMENSION".to_string(),
                details: "dimension must be greater than zero".to_string(),
            });
        }

        let model = match env_optional("EMBEDDING_MODEL") {
            Some(name) => EmbeddingModel::from_name(&name, explicit.unwrap_or(384)),
            None => EmbeddingModel::default(),
        };
        let dimension = explicit.unwrap_or_else(|| model.dimension());

        Ok(Self { model, dimension })
    }
}
