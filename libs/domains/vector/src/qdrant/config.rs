use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};

/// Qdrant connection and collection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// gRPC endpoint, e.g. `http://localhost:6334`
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Collection holding the entries
    pub collection: String,
    /// Payload field that keeps the caller's id next to the point id
    pub id_field: String,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
            collection: "recipes".to_string(),
            id_field: "recipeId".to_string(),
        }
    }
}

/// Environment variables (all optional):
/// - `QDRANT_URL`, or `QDRANT_HOST` (default `localhost`) + `QDRANT_PORT` (default 6334)
/// - `QDRANT_API_KEY`
/// - `QDRANT_TIMEOUT_SECS` (default 30)
/// - `QDRANT_COLLECTION` (default `recipes`)
/// - `QDRANT_ID_FIELD` (default `recipeId`)
impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = match env_optional("QDRANT_URL") {
            Some(url) => url,
            None => {
                let host = env_or_default("QDRANT_HOST", "localhost");
                let port: u16 = env_parse_or("QDRANT_PORT", 6334)?;
                format!("http://{}:{}", host, port)
            }
        };

        let collection = env_or_default("QDRANT_COLLECTION", "recipes");
        if collection.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "QDRANT_COLLECTION".to_string(),
                details: "collection name must not be empty".to_string(),
            });
        }

        Ok(Self {
            url,
            api_key: env_optional("QDRANT_API_KEY"),
            timeout_secs: env_parse_or("QDRANT_TIMEOUT_SECS", 30)?,
            collection,
            id_field: env_or_default("QDRANT_ID_FIELD", "recipeId"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(
            [
                "QDRANT_URL",
                "QDRANT_HOST",
                "QDRANT_PORT",
                "QDRANT_API_KEY",
                "QDRANT_COLLECTION",
                "QDRANT_ID_FIELD",
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://localhost:6334");
                assert_eq!(config.collection, "recipes");
                assert_eq!(config.id_field, "recipeId");
                assert!(config.api_key.is_none());
            },
        );
    }

    #[test]
    fn test_from_env_host_and_port() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", None),
                ("QDRANT_HOST", Some("qdrant.internal")),
                ("QDRANT_PORT", Some("7334")),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://qdrant.internal:7334");
            },
        );
    }

    #[test]
    fn test_from_env_url_wins_over_host() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", Some("https://cloud.qdrant.io:6334")),
                ("QDRANT_HOST", Some("ignored")),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "https://cloud.qdrant.io:6334");
            },
        );
    }

    #[test]
    fn test_from_env_bad_port() {
        temp_env::with_vars(
            [("QDRANT_URL", None), ("QDRANT_PORT", Some("99999"))],
            || {
                assert!(QdrantConfig::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_from_env_blank_collection() {
        temp_env::with_var("QDRANT_COLLECTION", Some(" "), || {
            assert!(QdrantConfig::from_env().is_err());
        });
    }
}
