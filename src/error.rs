use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Failures that end an invocation early. Each one still turns into a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("No question provided")]
    MissingQuestion,

    #[error("Missing API Key")]
    MissingCredential,

    #[error("{0}")]
    GenerationFailure(String),
}

impl InvocationError {
    pub fn status(&self) -> u16 {
        match self {
            InvocationError::MissingQuestion => STATUS_BAD_REQUEST,
            InvocationError::MissingCredential | InvocationError::GenerationFailure(_) => {
                STATUS_INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpErrorResponse {
    pub error: String,
}

impl From<String> for HttpErrorResponse {
    fn from(message: String) -> Self {
        HttpErrorResponse { error: message }
    }
}

impl From<&str> for HttpErrorResponse {
    fn from(message: &str) -> Self {
        HttpErrorResponse {
            error: message.to_string(),
        }
    }
}

impl From<&InvocationError> for HttpErrorResponse {
    fn from(err: &InvocationError) -> Self {
        HttpErrorResponse::from(err.to_string())
    }
}
