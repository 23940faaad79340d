use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::file_edit::EditError;

#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

// File edit failures are reported back to the model, so they keep their own message
impl From<EditError> for AgentError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::EmptyPattern
            | EditError::LineOutOfRange { .. }
            | EditError::InvalidRange { .. } => {
                AgentError::InvalidParameters(err.to_string())
            }
            _ => AgentError::ExecutionError(err.to_string()),
        }
    }
}
