//! Generation backend abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities, clone them freely.
//! The contract is a single round-trip: a sequence of role-tagged messages in,
//! one assistant [`Message`] out. Timeouts are applied by the caller.

pub mod providers;

use thiserror::Error;

use crate::router::conversation::Message;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider timed out after {0:?}")]
    Timeout(std::time::Duration),
}

// ── Request options ───────────────────────────────────────────────────────────

/// Per-call generation knobs. `None` falls back to the provider's configured
/// default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub backend_id: Option<String>,
    pub temperature: Option<f32>,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Scripted(providers::scripted::ScriptedProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send `messages` to the backend and return its reply as an assistant
    /// message.
    pub async fn complete(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<Message, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(messages, params).await,
            LlmProvider::Scripted(p) => p.complete(messages, params).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(messages, params).await,
        }
    }

    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::Scripted(_) => "scripted",
            LlmProvider::OpenAiCompatible(_) => "openai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_error_display() {
        let e = ProviderError::Timeout(std::time::Duration::from_secs(60));
        assert_eq!(e.to_string(), "provider timed out after 60s");
    }

    #[tokio::test]
    async fn enum_dispatches_to_dummy() {
        let p = LlmProvider::Dummy(providers::dummy::DummyProvider);
        assert_eq!(p.kind(), "dummy");
        let reply = p
            .complete(&[Message::user("ping")], &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(reply.content(), "[echo] ping");
    }
}
