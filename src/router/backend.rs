//! Time-bounded access to the generation backend.

use std::time::Duration;

use tracing::warn;

use crate::llm::{GenerationParams, LlmProvider, ProviderError};

use super::conversation::Message;

/// A provider plus the upper bound applied to every round-trip.
///
/// Cloning shares the underlying provider. No retries: a timeout or failure
/// is reported to the caller as-is.
#[derive(Debug, Clone)]
pub struct Backend {
    provider: LlmProvider,
    timeout: Duration,
}

impl Backend {
    pub fn new(provider: LlmProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn complete(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<Message, ProviderError> {
        match tokio::time::timeout(self.timeout, self.provider.complete(messages, params)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(provider = self.provider.kind(), timeout = ?self.timeout, "backend call timed out");
                Err(ProviderError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::scripted::ScriptedProvider;

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let scripted = ScriptedProvider::with_replies(["too late"]).with_delay(Duration::from_secs(61));
        let backend = Backend::new(LlmProvider::Scripted(scripted), Duration::from_secs(60));
        let err = backend
            .complete(&[Message::user("hi")], &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn reply_within_bound_passes_through() {
        let scripted = ScriptedProvider::with_replies(["ok"]).with_delay(Duration::from_secs(1));
        let backend = Backend::new(LlmProvider::Scripted(scripted), Duration::from_secs(60));
        let reply = backend
            .complete(&[Message::user("hi")], &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(reply, Message::assistant("ok"));
    }
}
