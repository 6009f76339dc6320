//! General-purpose handler: the whole conversation goes to the backend.

use tracing::{Instrument, Span, debug};

use super::{GenerationOverrides, HandlerError, HandlerFuture, HandlerSettings, ResponseHandler};
use crate::llm::GenerationParams;
use crate::router::backend::Backend;
use crate::router::conversation::{Conversation, Message};

#[derive(Debug, Clone)]
pub struct ModelHandler {
    backend: Backend,
    settings: HandlerSettings,
    span: Span,
}

impl ModelHandler {
    pub fn new(backend: Backend, settings: HandlerSettings, span: Span) -> Self {
        Self { backend, settings, span }
    }
}

impl ResponseHandler for ModelHandler {
    fn name(&self) -> &str {
        "model"
    }

    fn generate<'a>(
        &'a self,
        conversation: &'a Conversation,
        overrides: &'a GenerationOverrides,
    ) -> HandlerFuture<'a> {
        let fut = async move {
            let params = self.settings.resolve(overrides);
            debug!(turns = conversation.len(), model = ?params.backend_id, "forwarding conversation");
            let reply = self.backend.complete(conversation.messages(), &params).await?;
            Ok::<_, HandlerError>(Message::assistant(reply.into_content()))
        };
        Box::pin(fut.instrument(self.span.clone()))
    }

    fn generation_params(&self, overrides: &GenerationOverrides) -> Option<GenerationParams> {
        Some(self.settings.resolve(overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::llm::LlmProvider;
    use crate::llm::providers::scripted::ScriptedProvider;

    #[tokio::test]
    async fn forwards_conversation_verbatim() {
        let scripted = ScriptedProvider::with_replies(["Paris."]);
        let backend = Backend::new(LlmProvider::Scripted(scripted.clone()), Duration::from_secs(60));
        let h = ModelHandler::new(backend, HandlerSettings::default(), Span::none());
        let conv = Conversation::from(vec![
            Message::user("I'm planning a trip."),
            Message::assistant("Where to?"),
            Message::user("What is the capital of France?"),
        ]);

        let reply = h.generate(&conv, &GenerationOverrides::model("gpt-4")).await.unwrap();
        assert_eq!(reply, Message::assistant("Paris."));

        let calls = scripted.calls();
        assert_eq!(calls[0].messages, conv.messages());
        assert_eq!(calls[0].params.backend_id.as_deref(), Some("gpt-4"));
    }
}
