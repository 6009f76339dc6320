//! Chat service: the application layer between channels and the router.
//!
//! Validates per-request options, threads session history into the
//! conversation, routes it, and logs the exchange. Channels hold an
//! `Arc<ChatService>` and never touch the router directly.

pub mod session;

use std::time::Instant;

use thiserror::Error;
use tracing::{Span, debug, info, info_span};
use uuid::Uuid;

use crate::config::Config;
use crate::router::{GenerationOverrides, IntentKey, Message, Router, RoutingError, assemble};

pub use session::{ConversationRecord, SessionStore};

const MIN_TEMPERATURE: f32 = 0.0;
const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("model '{0}' is not supported")]
    InvalidModel(String),
    #[error("temperature {0} is outside 0.0..=2.0")]
    InvalidTemperature(f32),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

impl ChatError {
    /// Rejected before any routing work started.
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::InvalidModel(_) | ChatError::InvalidTemperature(_))
    }
}

/// Per-request options. `None` picks the service default.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Result of a single routed query.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: Message,
    pub intent: IntentKey,
    pub model_used: String,
    pub temperature: f32,
    /// Wall-clock seconds spent routing.
    pub processing_time: f64,
    /// Local time the reply was produced, ISO 8601.
    pub timestamp: String,
}

/// Session-scoped chat request as received from a channel.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub message: String,
    pub options: QueryOptions,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

/// [`ChatOutcome`] plus the session bookkeeping.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub outcome: ChatOutcome,
    pub session_id: String,
    pub user_id: String,
    pub message_count: usize,
}

pub struct ChatService {
    router: Router,
    sessions: SessionStore,
    models: Vec<String>,
    default_model: String,
    default_temperature: f32,
    span: Span,
}

impl ChatService {
    pub fn new(router: Router, config: &Config) -> Self {
        Self {
            router,
            sessions: SessionStore::new(config.sessions.max_records, config.sessions.history_window),
            models: config.llm.models.clone(),
            default_model: config.llm.default_model.clone(),
            default_temperature: config.llm.openai.temperature,
            span: info_span!("chat"),
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Validate `options` into per-request overrides. Fields the caller left
    /// unset stay `None` so handler-local settings apply.
    fn overrides(&self, options: &QueryOptions) -> Result<GenerationOverrides, ChatError> {
        if let Some(model) = &options.model {
            if !self.models.contains(model) {
                return Err(ChatError::InvalidModel(model.clone()));
            }
        }
        if let Some(t) = options.temperature {
            if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&t) {
                return Err(ChatError::InvalidTemperature(t));
            }
        }
        Ok(GenerationOverrides { model: options.model.clone(), temperature: options.temperature })
    }

    /// Route `query` after `history`. The history slice is not modified.
    pub async fn process_query(
        &self,
        query: &str,
        history: &[Message],
        options: &QueryOptions,
    ) -> Result<ChatOutcome, ChatError> {
        let overrides = self.overrides(options)?;

        let started = Instant::now();
        let conversation = assemble(history, query);
        debug!(parent: &self.span, turns = conversation.len(), model = ?overrides.model, "processing query");

        let routed = self.router.route_with(&conversation, &overrides).await?;

        // Report what the handler sent; handlers without a backend call fall
        // back to the service defaults.
        let params = routed.params.unwrap_or_default();
        Ok(ChatOutcome {
            reply: routed.message,
            intent: routed.intent,
            model_used: params.backend_id.unwrap_or_else(|| self.default_model.clone()),
            temperature: params.temperature.unwrap_or(self.default_temperature),
            processing_time: started.elapsed().as_secs_f64(),
            timestamp: chrono::Local::now().to_rfc3339(),
        })
    }

    /// Handle a session-scoped request: resolve ids, replay the session's
    /// recent history, route, and log the exchange on success.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let session_id = request
            .session_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let user_id = request
            .user_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(anonymous_user_id);

        info!(parent: &self.span, %user_id, %session_id, "chat request");

        let history = self.sessions.history(&session_id);
        let outcome = self.process_query(&request.message, &history, &request.options).await?;

        let message_count = self.sessions.append(
            &session_id,
            ConversationRecord {
                user_id: user_id.clone(),
                timestamp: chrono::Local::now().to_rfc3339(),
                request: request.message,
                response: outcome.reply.content().to_string(),
            },
        );

        info!(
            parent: &self.span,
            %user_id,
            %session_id,
            intent = %outcome.intent,
            processing_time = outcome.processing_time,
            "chat reply"
        );

        Ok(ChatReply { outcome, session_id, user_id, message_count })
    }
}

fn anonymous_user_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("anonymous_{}", &id[..8])
}
