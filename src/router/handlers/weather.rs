//! Fixed-answer weather handler.

use super::{GenerationOverrides, HandlerFuture, ResponseHandler};
use crate::router::conversation::{Conversation, Message};

/// Returns the configured canned reply regardless of input.
#[derive(Debug, Clone)]
pub struct WeatherHandler {
    reply: String,
}

impl WeatherHandler {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

impl ResponseHandler for WeatherHandler {
    fn name(&self) -> &str {
        "weather"
    }

    fn generate<'a>(
        &'a self,
        _conversation: &'a Conversation,
        _overrides: &'a GenerationOverrides,
    ) -> HandlerFuture<'a> {
        Box::pin(async move { Ok(Message::assistant(self.reply.clone())) })
    }
}
