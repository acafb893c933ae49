use domain_vector::VectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Invalid recipe id: {0}")]
    InvalidId(String),

    #[error("Recipe {id} could not be decoded: {details}")]
    InvalidDocument { id: String, details: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Vector(#[from] VectorError),
}

pub type RecipeResult<T> = Result<T, RecipeError>;

impl RecipeError {
    /// Whether repeating the failed call could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RecipeError::Database(_) => true,
            RecipeError::Vector(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<mongodb::error::Error> for RecipeError {
    fn from(err: mongodb::error::Error) -> Self {
        RecipeError::Database(err.to_string())
    }
}
