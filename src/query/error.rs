use crate::llm::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Please enter a question first")]
    EmptyQuestion,
    #[error("Query generation failed: {0}")]
    Generation(String),
    #[error("Query execution failed: {message}")]
    Execution { sql: String, message: String },
    #[error("Database error: {0}")]
    Store(String),
}

impl From<ModelError> for QueryError {
    fn from(e: ModelError) -> Self {
        QueryError::Generation(e.to_string())
    }
}
