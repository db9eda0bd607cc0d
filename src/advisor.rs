use tracing::{info, warn};

use crate::adapter::{adapt, Adapted};
use crate::config::EndpointProfile;
use crate::error::InvocationError;
use crate::event::{InboundRequest, OutboundResponse};
use crate::invoker::ModelInvoker;
use crate::prompt::build_prompt;
use crate::shaper;

const QUESTION_PREVIEW_CHARS: usize = 100;

/// One configured endpoint. Holds no per-request state, every call runs start to finish on its own.
#[derive(Clone)]
pub struct Advisor {
    profile: EndpointProfile,
    invoker: ModelInvoker,
}

impl Advisor {
    pub fn new(profile: EndpointProfile, invoker: ModelInvoker) -> Self {
        Self { profile, invoker }
    }

    pub fn profile(&self) -> &EndpointProfile {
        &self.profile
    }

    /// Handles one invocation. Always yields exactly one response, failures included.
    #[tracing::instrument(level = "info", skip(self, request), fields(endpoint = %self.profile.name, method = %request.method))]
    pub async fn handle(&self, request: &InboundRequest) -> OutboundResponse {
        let response = match self.answer(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("Invocation failed: {}", err);
                shaper::failure(&err, self.profile.error_body_format)
            }
        };
        info!(status = response.status_code, "Invocation finished");
        response
    }

    async fn answer(&self, request: &InboundRequest) -> Result<OutboundResponse, InvocationError> {
        let (question, source) = match adapt(request, &self.profile.on_missing_question)? {
            Adapted::Preflight => return Ok(shaper::preflight()),
            Adapted::Question { question, source } => (question, source),
        };
        info!(
            source = %source,
            "Question: \"{}\"",
            question.preview(QUESTION_PREVIEW_CHARS)
        );

        let prompt = build_prompt(&question, self.profile.prompt_style);
        let text = self
            .invoker
            .invoke(&prompt, &self.profile.model, &self.profile.generation)
            .await?;
        Ok(shaper::answer(text))
    }
}
