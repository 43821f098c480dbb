use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    ValidationError(String),
    ParseError(String),
    GenerationError(String),
    PersistenceError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::GenerationError(msg) => write!(f, "Generation error: {}", msg),
            AppError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

// Implement std::error::Error so embedders can serialize the error across their boundary
impl std::error::Error for AppError {}

pub type Result<T> = std::result::Result<T, AppError>;
