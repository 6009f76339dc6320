//! Shared state for the comms subsystem, the capability boundary for channels.
//!
//! Channels receive an `Arc<CommsState>` and are restricted to the typed
//! methods below. The chat service is private; channels cannot reach the
//! router or session store except through these calls.

use std::sync::Arc;

use tracing::debug;

use crate::subsystems::chat::{ChatError, ChatReply, ChatRequest, ChatService, ConversationRecord};

/// Shared state passed as `Arc<CommsState>` to every channel task.
pub struct CommsState {
    chat: Arc<ChatService>,
}

impl CommsState {
    pub fn new(chat: Arc<ChatService>) -> Self {
        Self { chat }
    }

    /// Route one user message for `channel_id` and await the reply.
    pub async fn send_message(&self, channel_id: &str, request: ChatRequest) -> Result<ChatReply, ChatError> {
        debug!(%channel_id, len = request.message.len(), "comms message");
        self.chat.chat(request).await
    }

    pub fn models(&self) -> &[String] {
        self.chat.models()
    }

    pub fn default_model(&self) -> &str {
        self.chat.default_model()
    }

    /// Stored exchanges for `session_id`, or `None` for an unknown session.
    pub fn conversation(&self, session_id: &str) -> Option<Vec<ConversationRecord>> {
        self.chat.sessions().records(session_id)
    }
}
