//! Scripted provider: replays a queue of canned outcomes.
//!
//! Every call pops the next outcome and records the messages and params it
//! was given. An optional delay runs before each reply so timeouts can be
//! exercised under a paused tokio clock. Clones share the same queue and
//! call log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::llm::{GenerationParams, ProviderError};
use crate::router::conversation::Message;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedCall {
    pub messages: Vec<Message>,
    pub params: GenerationParams,
}

#[derive(Debug)]
enum Outcome {
    Reply(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct Inner {
    queue: Mutex<VecDeque<Outcome>>,
    calls: Mutex<Vec<ScriptedCall>>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<Inner>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider preloaded with successful replies, in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let p = Self::new();
        for r in replies {
            p.push_reply(r);
        }
        p
    }

    /// Sleep this long before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.lock_queue().push_back(Outcome::Reply(text.into()));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.lock_queue().push_back(Outcome::Fail(reason.into()));
    }

    /// Snapshot of every call made so far.
    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    pub async fn complete(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<Message, ProviderError> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ScriptedCall { messages: messages.to_vec(), params: params.clone() });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.lock_queue().pop_front() {
            Some(Outcome::Reply(text)) => Ok(Message::assistant(text)),
            Some(Outcome::Fail(reason)) => Err(ProviderError::Request(reason)),
            None => Err(ProviderError::Request("scripted provider has no replies left".into())),
        }
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Outcome>> {
        self.inner.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
