//! Stateless question-answering endpoints for Traditional Chinese Medicine advice.
//!
//! An invocation flows through [`adapter`] (find the question), [`prompt`] (compose the
//! instruction), [`invoker`] (call the hosted model) and [`shaper`] (build the HTTP
//! envelope). [`advisor::Advisor`] ties them together for one configured endpoint.

pub mod adapter;
pub mod advisor;
pub mod config;
pub mod error;
pub mod event;
pub mod invoker;
pub mod passgen;
pub mod prompt;
pub mod server;
pub mod shaper;
pub mod telemetry;

use std::sync::Arc;

use crate::advisor::Advisor;
use crate::config::Config;
use crate::invoker::{ApiKey, GeminiGenerator, ModelInvoker, TextGenerator};

/// Builds one advisor per configured endpoint, all sharing the same credential and provider client.
pub fn build_advisors(config: &Config, generator: Arc<dyn TextGenerator>) -> Vec<Advisor> {
    let invoker = ModelInvoker::new(ApiKey::new(config.api_key.as_str()), generator);
    config
        .endpoints
        .iter()
        .cloned()
        .map(|profile| Advisor::new(profile, invoker.clone()))
        .collect()
}

pub fn gemini_advisors(config: &Config) -> Vec<Advisor> {
    build_advisors(config, Arc::new(GeminiGenerator::new(config.api_base.as_str())))
}
