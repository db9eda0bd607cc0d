use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::InvocationError;
use crate::event::InboundRequest;

pub const QUESTION_KEY: &str = "question";
pub const DEFAULT_QUESTION: &str = "Hello";

/// A question that is known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Returns `None` for empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `max_chars` characters, for logging.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to do when neither the query string nor the body carry a question.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingQuestionPolicy {
    #[default]
    Fail,
    UseDefault(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSource {
    Query,
    Body,
    Default,
}

impl Display for QuestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionSource::Query => write!(f, "query"),
            QuestionSource::Body => write!(f, "body"),
            QuestionSource::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adapted {
    Preflight,
    Question {
        question: Question,
        source: QuestionSource,
    },
}

/// Normalizes an inbound request into a pre-flight marker or a validated question.
pub fn adapt(
    request: &InboundRequest,
    policy: &MissingQuestionPolicy,
) -> Result<Adapted, InvocationError> {
    if request.is_preflight() {
        return Ok(Adapted::Preflight);
    }

    if let Some((question, source)) = extract_question(request) {
        return Ok(Adapted::Question { question, source });
    }

    match policy {
        MissingQuestionPolicy::Fail => Err(InvocationError::MissingQuestion),
        MissingQuestionPolicy::UseDefault(default) => {
            let question = Question::new(default.as_str())
                .or_else(|| Question::new(DEFAULT_QUESTION))
                .ok_or(InvocationError::MissingQuestion)?;
            Ok(Adapted::Question {
                question,
                source: QuestionSource::Default,
            })
        }
    }
}

/// Looks for the question in the query string first, then in a JSON body.
pub fn extract_question(request: &InboundRequest) -> Option<(Question, QuestionSource)> {
    if let Some(question) = request.query_param(QUESTION_KEY).and_then(Question::new) {
        return Some((question, QuestionSource::Query));
    }

    request
        .body
        .as_deref()
        .and_then(question_from_body)
        .map(|question| (question, QuestionSource::Body))
}

// Malformed JSON is treated as "no question here".
fn question_from_body(body: &str) -> Option<Question> {
    if body.trim().is_empty() {
        return None;
    }
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            debug!("Ignoring request body that is not valid JSON: {}", err);
            return None;
        }
    };
    value
        .get(QUESTION_KEY)
        .and_then(Value::as_str)
        .and_then(Question::new)
}
