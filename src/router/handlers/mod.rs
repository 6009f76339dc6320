//! Response handlers: one capability per intent.
//!
//! Every handler turns a [`Conversation`] into exactly one assistant
//! [`Message`]. Handlers are stateless after construction and shared across
//! concurrent requests; per-request knobs arrive as [`GenerationOverrides`]
//! instead of mutating handler state.

pub mod model;
pub mod translation;
pub mod weather;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::config::ModelSettingsConfig;
use crate::llm::{GenerationParams, ProviderError};

use super::conversation::{Conversation, Message};

pub use model::ModelHandler;
pub use translation::TranslationHandler;
pub use weather::WeatherHandler;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("backend error: {0}")]
    Backend(#[from] ProviderError),
}

/// Boxed future returned by [`ResponseHandler::generate`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Message, HandlerError>> + Send + 'a>>;

/// A capability that answers one intent.
pub trait ResponseHandler: Send + Sync {
    /// Stable identifier used in log fields.
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        conversation: &'a Conversation,
        overrides: &'a GenerationOverrides,
    ) -> HandlerFuture<'a>;

    /// Backend parameters `generate` sends for these overrides. `None` for
    /// handlers that never call the backend.
    fn generation_params(&self, _overrides: &GenerationOverrides) -> Option<GenerationParams> {
        None
    }
}

/// Per-request generation overrides. These win over handler settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl GenerationOverrides {
    pub fn model(model: impl Into<String>) -> Self {
        Self { model: Some(model.into()), temperature: None }
    }
}

/// Handler-local backend selection, fixed at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerSettings {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl HandlerSettings {
    /// Handler-local settings with `default_model` filling an unset model.
    pub fn with_default_model(cfg: &ModelSettingsConfig, default_model: &str) -> Self {
        Self {
            model: Some(cfg.model.clone().unwrap_or_else(|| default_model.to_string())),
            temperature: cfg.temperature,
        }
    }

    /// Merge request overrides over these settings. Fields left `None` fall
    /// through to the provider defaults.
    pub fn resolve(&self, overrides: &GenerationOverrides) -> GenerationParams {
        GenerationParams {
            backend_id: overrides.model.clone().or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
        }
    }
}
