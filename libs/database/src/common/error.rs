/// Database error type shared by connectors
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Driver-level MongoDB error
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The deployment could not be reached (after retries, if any)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Configuration could not be loaded or was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] core_config::ConfigError),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: DatabaseError =
            core_config::ConfigError::MissingEnvVar("MONGODB_URI".to_string()).into();
        assert!(matches!(err, DatabaseError::Config(_)));
        assert!(err.to_string().contains("MONGODB_URI"));
    }
}
