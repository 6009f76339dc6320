//! Translate-to-English handler.

use tracing::{Instrument, Span, debug};

use super::{GenerationOverrides, HandlerError, HandlerFuture, HandlerSettings, ResponseHandler};
use crate::llm::GenerationParams;
use crate::router::backend::Backend;
use crate::router::conversation::{Conversation, Message};

const SEPARATORS: [char; 2] = ['：', ':'];

/// Sends only the extracted payload, wrapped in a translation instruction,
/// as the single backend input. Prior turns are not forwarded.
#[derive(Debug, Clone)]
pub struct TranslationHandler {
    backend: Backend,
    settings: HandlerSettings,
    span: Span,
}

impl TranslationHandler {
    pub fn new(backend: Backend, settings: HandlerSettings, span: Span) -> Self {
        Self { backend, settings, span }
    }
}

/// Text after the first instruction separator (full-width or ASCII colon),
/// trimmed. Without a separator the whole content is the payload.
pub fn extract_payload(content: &str) -> &str {
    match content.find(SEPARATORS) {
        Some(idx) => {
            let sep_len = content[idx..].chars().next().map_or(0, char::len_utf8);
            content[idx + sep_len..].trim()
        }
        None => content,
    }
}

pub fn translation_prompt(payload: &str) -> String {
    format!("請將以下文本翻譯成英文（只需要返回翻譯結果，不需要解釋）：\n\n{payload}")
}

impl ResponseHandler for TranslationHandler {
    fn name(&self) -> &str {
        "translation"
    }

    fn generate<'a>(
        &'a self,
        conversation: &'a Conversation,
        overrides: &'a GenerationOverrides,
    ) -> HandlerFuture<'a> {
        let fut = async move {
            let payload = extract_payload(conversation.latest_user_content());
            debug!(payload_len = payload.len(), "translating");
            let prompt = [Message::user(translation_prompt(payload))];
            let params = self.settings.resolve(overrides);
            let reply = self.backend.complete(&prompt, &params).await?;
            Ok::<_, HandlerError>(Message::assistant(reply.into_content()))
        };
        Box::pin(fut.instrument(self.span.clone()))
    }

    fn generation_params(&self, overrides: &GenerationOverrides) -> Option<GenerationParams> {
        Some(self.settings.resolve(overrides))
    }
}
