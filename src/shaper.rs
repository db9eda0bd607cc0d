use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{HttpErrorResponse, InvocationError, STATUS_INTERNAL_SERVER_ERROR};
use crate::event::OutboundResponse;

pub const STATUS_OK: u16 = 200;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// How error bodies are encoded for a deployment.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBodyFormat {
    #[default]
    Json,
    PlainText,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AnswerBody {
    pub answer: String,
}

pub fn preflight() -> OutboundResponse {
    OutboundResponse::with_cors(STATUS_OK, String::new())
}

pub fn answer(text: String) -> OutboundResponse {
    json_response(STATUS_OK, &AnswerBody { answer: text })
}

pub fn failure(err: &InvocationError, format: ErrorBodyFormat) -> OutboundResponse {
    let status = err.status();
    match format {
        ErrorBodyFormat::Json => json_response(status, &HttpErrorResponse::from(err)),
        ErrorBodyFormat::PlainText => {
            OutboundResponse::with_cors(status, err.to_string()).content_type(TEXT_CONTENT_TYPE)
        }
    }
}

fn json_response<T: Serialize>(status: u16, body: &T) -> OutboundResponse {
    match serde_json::to_string(body) {
        Ok(body) => OutboundResponse::with_cors(status, body).content_type(JSON_CONTENT_TYPE),
        Err(err) => {
            error!("Failed to encode response body: {}", err);
            OutboundResponse::with_cors(
                STATUS_INTERNAL_SERVER_ERROR,
                r#"{"error":"Failed to encode response"}"#.to_string(),
            )
            .content_type(JSON_CONTENT_TYPE)
        }
    }
}
