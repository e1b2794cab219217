use crate::llm::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Model(#[from] ModelError),
}
