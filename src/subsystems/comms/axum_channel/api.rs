//! Axum handlers for the chat API.
//!
//! Each handler receives [`AxumState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Request validation failures map to 422;
//! routing failures map to 500 with a generic message, the detail stays in
//! the log.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::AxumState;
use crate::subsystems::chat::{ChatReply, ChatRequest as ServiceRequest, QueryOptions};

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    message: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    metadata: RequestMetadata,
}

/// Caller-supplied ids. Other metadata keys are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
struct RequestMetadata {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    message: String,
    #[serde(rename = "type")]
    kind: String,
    model_used: String,
    processing_time: f64,
    timestamp: String,
    conversation_id: String,
    metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
struct ResponseMetadata {
    user_id: String,
    session_id: String,
    temperature: f32,
    message_count: usize,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        let outcome = reply.outcome;
        Self {
            message: outcome.reply.into_content(),
            kind: outcome.intent.to_string(),
            model_used: outcome.model_used,
            processing_time: outcome.processing_time,
            timestamp: outcome.timestamp,
            conversation_id: reply.session_id.clone(),
            metadata: ResponseMetadata {
                user_id: reply.user_id,
                session_id: reply.session_id,
                temperature: outcome.temperature,
                message_count: reply.message_count,
            },
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// POST /chat
///
/// Bodies the JSON extractor rejects keep axum's status (400, 415 or 422)
/// but use the same error envelope as other validation failures.
pub(super) async fn chat(
    State(state): State<AxumState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(channel_id = %state.channel_id, "malformed chat body: {}", rejection.body_text());
            return (rejection.status(), json_error("invalid_request", rejection.body_text())).into_response();
        }
    };

    let request = ServiceRequest {
        message: req.message,
        options: QueryOptions { model: req.model, temperature: req.temperature },
        session_id: req.metadata.session_id,
        user_id: req.metadata.user_id,
    };

    match state.comms.send_message(&state.channel_id, request).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::from(reply))).into_response(),
        Err(e) if e.is_validation() => {
            warn!(channel_id = %state.channel_id, "rejected chat request: {e}");
            (StatusCode::UNPROCESSABLE_ENTITY, json_error("invalid_request", e)).into_response()
        }
        Err(e) => {
            error!(channel_id = %state.channel_id, "chat request failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json_error("internal", "failed to process the request"),
            )
                .into_response()
        }
    }
}

/// GET /conversations/{session_id}
pub(super) async fn conversation(
    State(state): State<AxumState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.comms.conversation(&session_id) {
        Some(records) => {
            let body = json!({
                "session_id": session_id,
                "message_count": records.len(),
                "messages": records,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            json_error("not_found", format!("session not found: {session_id}")),
        )
            .into_response(),
    }
}

/// GET /models
pub(super) async fn models(State(state): State<AxumState>) -> Response {
    let body = json!({
        "models": state.comms.models(),
        "default_model": state.comms.default_model(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /health
pub(super) async fn health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "healthy" }))).into_response()
}
