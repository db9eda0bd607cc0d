//! Calls the hosted model with a composed prompt.
//!
//! The provider sits behind [`TextGenerator`] so the invocation pipeline can be
//! exercised without a network. The credential is resolved once at startup and
//! handed to [`ModelInvoker`]; an absent credential fails before any call is made.

pub mod gemini;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::error::InvocationError;

pub use gemini::GeminiGenerator;

/// Provider API credential. Never empty.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` when the configured value is empty or blank.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Optional sampling settings forwarded to the provider.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Failed to decode model response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        api_key: &ApiKey,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct ModelInvoker {
    api_key: Option<ApiKey>,
    generator: Arc<dyn TextGenerator>,
}

impl ModelInvoker {
    pub fn new(api_key: Option<ApiKey>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { api_key, generator }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Single attempt, no retries.
    #[tracing::instrument(level = "info", skip(self, prompt, params), fields(prompt_len = prompt.len()))]
    pub async fn invoke(
        &self,
        prompt: &str,
        model: &str,
        params: &GenerationParams,
    ) -> Result<String, InvocationError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            error!("No API key configured, refusing to call the model");
            InvocationError::MissingCredential
        })?;

        match self.generator.generate(api_key, model, prompt, params).await {
            Ok(text) => {
                debug!("Model returned {} bytes", text.len());
                Ok(text)
            }
            Err(err) => {
                error!("Generation failed: {:?}", err);
                Err(InvocationError::GenerationFailure(err.to_string()))
            }
        }
    }
}
