mod config;
mod openai;
mod provider;

pub use config::EmbeddingConfig;
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;
