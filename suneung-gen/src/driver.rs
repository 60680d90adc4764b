//! Sequential problem generation with pacing
//!
//! One run resolves its credential once, binds a model handle to it, then
//! asks for `count` problems strictly one after another. The first failure
//! ends the run; everything emitted before it stays in the pane.

use llm_client::{ApiKey, GatewayConfig, GeminiProvider, LlmProvider, LlmRequest};
use log::{debug, info, warn};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::classify::{Diagnostic, ErrorKind, classify};
use crate::credential;
use crate::models::Model;
use crate::pane::{Emission, OutputPane};

/// What the operator asked for with one press of start
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub subject: String,
    pub count: NonZeroU32,
    pub model: Model,
    /// Blank means "use the configured defaults"
    pub override_credential: Option<String>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { count: u32 },
    Aborted { completed: u32, kind: ErrorKind },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Builds a model handle bound to one credential
pub trait Gateway {
    fn connect(&self, model: Model, api_key: ApiKey) -> llm_client::Result<Box<dyn LlmProvider>>;
}

/// Production gateway talking to the hosted Gemini API
pub struct GeminiGateway {
    base_url: Option<String>,
}

impl GeminiGateway {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
        }
    }
}

impl Gateway for GeminiGateway {
    fn connect(&self, model: Model, api_key: ApiKey) -> llm_client::Result<Box<dyn LlmProvider>> {
        let provider = match &self.base_url {
            Some(base_url) => GeminiProvider::with_base_url(model.id(), base_url, api_key)?,
            None => GeminiProvider::new(model.id(), api_key)?,
        };
        Ok(Box::new(provider))
    }
}

/// Prompt for a single problem
pub fn problem_prompt(subject: &str) -> String {
    format!(
        "Write one new {subject} problem in the style of the Korean college scholastic ability test (수능). \
         Give the problem statement, five answer choices, the correct answer, and a short solution."
    )
}

pub struct Driver<G> {
    gateway: G,
    defaults: Vec<ApiKey>,
    pacing: Duration,
}

impl<G: Gateway> Driver<G> {
    pub fn new(gateway: G, defaults: Vec<ApiKey>, pacing: Duration) -> Self {
        Self {
            gateway,
            defaults,
            pacing,
        }
    }

    /// Execute one run, reporting every step to `pane`
    pub async fn run(
        &self,
        request: &GenerationRequest,
        pane: &mut impl OutputPane,
    ) -> RunOutcome {
        let override_key = request.override_credential.as_deref();
        let api_key = match credential::resolve(override_key, &self.defaults) {
            Ok(key) => key,
            Err(e) => {
                warn!("Run refused: {}", e);
                return abort(pane, 0, Diagnostic::missing_credential(&e));
            }
        };

        let provider = match self.gateway.connect(request.model, api_key) {
            Ok(provider) => provider,
            Err(e) => return abort(pane, 0, classify(&e)),
        };

        let count = request.count.get();
        let prompt = problem_prompt(&request.subject);
        info!(
            "Generating {} {} problem(s) with {} via {}",
            count,
            request.subject,
            request.model,
            provider.name()
        );

        for index in 1..=count {
            pane.emit(Emission::Generating(index));

            let request = LlmRequest::from_prompt(prompt.as_str());
            let response = match provider.complete(request).await {
                Ok(response) => response,
                Err(e) => return abort(pane, index - 1, classify(&e)),
            };

            if let Some(usage) = &response.usage {
                debug!(
                    "Problem {}: {} tokens in, {} out",
                    index, usage.input_tokens, usage.output_tokens
                );
            }

            pane.emit(Emission::Done(index));
            pane.emit(Emission::Content {
                index,
                text: response.content,
            });

            if index < count {
                debug!("Pacing for {:?}", self.pacing);
                tokio::time::sleep(self.pacing).await;
            }
        }

        RunOutcome::Completed { count }
    }
}

fn abort(pane: &mut impl OutputPane, completed: u32, diagnostic: Diagnostic) -> RunOutcome {
    warn!("Run aborted after {} problem(s): {}", completed, diagnostic.kind);
    let kind = diagnostic.kind;
    pane.emit(Emission::Failed(diagnostic));
    RunOutcome::Aborted { completed, kind }
}
