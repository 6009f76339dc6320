//! Dummy LLM provider: echoes the last message back prefixed with `[echo]`.
//! Lets the console and HTTP channels run end-to-end without an API key.

use crate::llm::{GenerationParams, ProviderError};
use crate::router::conversation::Message;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(
        &self,
        messages: &[Message],
        _params: &GenerationParams,
    ) -> Result<Message, ProviderError> {
        let last = messages.last().map(Message::content).unwrap_or("");
        Ok(Message::assistant(format!("[echo] {last}")))
    }
}
