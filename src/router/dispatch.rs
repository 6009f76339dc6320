//! Classification → handler selection → handler invocation.
//!
//! One request walks `Start → Classifying → Dispatching → Handling → Done`.
//! Any error ends the walk: it is logged with the stage it came from and
//! returned. No retries, and exactly one handler runs.

use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, Span, debug, warn};

use crate::llm::{GenerationParams, ProviderError};

use super::classifier::Classifier;
use super::conversation::{Conversation, Message};
use super::handlers::{GenerationOverrides, HandlerError, ResponseHandler};
use super::intent::IntentKey;
use super::registry::{HandlerRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("backend error: {0}")]
    Backend(#[from] ProviderError),
    #[error("no handler registered for intent '{0}'")]
    UnknownIntent(IntentKey),
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl From<HandlerError> for RoutingError {
    fn from(e: HandlerError) -> Self {
        match e {
            HandlerError::Backend(e) => RoutingError::Backend(e),
        }
    }
}

/// The handler's reply plus the intent that selected it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReply {
    pub intent: IntentKey,
    pub message: Message,
    /// What the handler sent to the backend; `None` if it made no call.
    pub params: Option<GenerationParams>,
}

enum RouteStage<'r> {
    Start,
    Classifying,
    Dispatching(IntentKey),
    Handling(IntentKey, &'r Arc<dyn ResponseHandler>),
    Done(RoutedReply),
}

impl RouteStage<'_> {
    fn name(&self) -> &'static str {
        match self {
            RouteStage::Start => "start",
            RouteStage::Classifying => "classifying",
            RouteStage::Dispatching(_) => "dispatching",
            RouteStage::Handling(..) => "handling",
            RouteStage::Done(_) => "done",
        }
    }
}

#[derive(Debug)]
pub struct Router {
    classifier: Classifier,
    registry: Arc<HandlerRegistry>,
    span: Span,
}

impl Router {
    /// Fails when the classifier's fallback intent has no handler. Other
    /// classifier intents without a handler are logged and surface as
    /// [`RoutingError::UnknownIntent`] if ever produced.
    pub fn new(classifier: Classifier, registry: Arc<HandlerRegistry>, span: Span) -> Result<Self, RegistryError> {
        if !registry.contains(classifier.fallback()) {
            return Err(RegistryError::MissingFallback(classifier.fallback().clone()));
        }
        for intent in classifier.possible_intents() {
            if !registry.contains(intent) {
                warn!(parent: &span, %intent, "classifier can produce an intent with no handler");
            }
        }
        Ok(Self { classifier, registry, span })
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Route with no per-request overrides and return only the reply.
    pub async fn route_and_respond(&self, conversation: &Conversation) -> Result<Message, RoutingError> {
        self.route(conversation).await.map(|r| r.message)
    }

    pub async fn route(&self, conversation: &Conversation) -> Result<RoutedReply, RoutingError> {
        self.route_with(conversation, &GenerationOverrides::default()).await
    }

    /// Run the full pipeline for one conversation.
    pub async fn route_with(
        &self,
        conversation: &Conversation,
        overrides: &GenerationOverrides,
    ) -> Result<RoutedReply, RoutingError> {
        let span = self.span.clone();
        async move {
            let mut stage = RouteStage::Start;
            loop {
                let current = stage.name();
                stage = match self.step(stage, conversation, overrides).await {
                    Ok(RouteStage::Done(reply)) => {
                        debug!(intent = %reply.intent, reply_len = reply.message.content().len(), "routed");
                        return Ok(reply);
                    }
                    Ok(next) => next,
                    Err(e) => {
                        warn!(stage = current, error = %e, "routing failed");
                        return Err(e);
                    }
                };
            }
        }
        .instrument(span)
        .await
    }

    async fn step<'r>(
        &'r self,
        stage: RouteStage<'r>,
        conversation: &Conversation,
        overrides: &GenerationOverrides,
    ) -> Result<RouteStage<'r>, RoutingError> {
        match stage {
            RouteStage::Start => {
                if conversation.is_empty() {
                    return Err(RoutingError::MalformedInput("empty conversation".into()));
                }
                if conversation.latest_user().is_none() {
                    return Err(RoutingError::MalformedInput("conversation has no user message".into()));
                }
                Ok(RouteStage::Classifying)
            }
            RouteStage::Classifying => {
                let intent = self.classifier.classify(conversation, overrides).await?;
                Ok(RouteStage::Dispatching(intent))
            }
            RouteStage::Dispatching(intent) => match self.registry.get(&intent) {
                Some(handler) => {
                    debug!(%intent, handler = handler.name(), "dispatching");
                    Ok(RouteStage::Handling(intent, handler))
                }
                None => Err(RoutingError::UnknownIntent(intent)),
            },
            RouteStage::Handling(intent, handler) => {
                let message = handler.generate(conversation, overrides).await?;
                let params = handler.generation_params(overrides);
                Ok(RouteStage::Done(RoutedReply { intent, message, params }))
            }
            done @ RouteStage::Done(_) => Ok(done),
        }
    }
}
