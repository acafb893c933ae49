//! Configuration for the recipe embedder

use core_config::{ConfigError, Environment, FromEnv, env_or_default};
use database::mongodb::MongoConfig;
use domain_vector::{EmbeddingConfig, OpenAIConfig, QdrantConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub mongo: MongoConfig,
    /// Collection holding the recipe documents
    pub recipes_collection: String,
    pub qdrant: QdrantConfig,
    pub embedding: EmbeddingConfig,
    /// Endpoint serving the embedding model
    pub provider: OpenAIConfig,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let recipes_collection = env_or_default("MONGODB_COLLECTION", "recipes");
        if recipes_collection.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "MONGODB_COLLECTION".to_string(),
                details: "collection name must not be empty".to_string(),
            });
        }

        Ok(Self {
            environment: Environment::from_env(),
            mongo: MongoConfig::from_env()?,
            recipes_collection,
            qdrant: QdrantConfig::from_env()?,
            embedding: EmbeddingConfig::from_env()?,
            provider: OpenAIConfig::from_env()?,
        })
    }
}
