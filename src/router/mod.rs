//! Routing-and-dispatch engine.
//!
//! # Module layout
//!
//! - **conversation** — `Message`, `Conversation`, and the `assemble` step.
//! - **intent** — `IntentKey` tags.
//! - **backend** — timeout-bounded wrapper over the LLM provider.
//! - **classifier** — lexical pre-filter, then backend label classification.
//! - **handlers** — `ResponseHandler` and the weather/translation/model handlers.
//! - **registry** — immutable intent → handler table.
//! - **dispatch** — the `Router` state machine and `RoutingError`.

pub mod backend;
pub mod classifier;
pub mod conversation;
pub mod dispatch;
pub mod handlers;
pub mod intent;
pub mod registry;

use std::sync::Arc;
use std::time::Duration;

use tracing::info_span;

use crate::config::{Config, ModelSettingsConfig};
use crate::llm::LlmProvider;

pub use backend::Backend;
pub use classifier::Classifier;
pub use conversation::{Conversation, Message, Role, assemble};
pub use dispatch::{RoutedReply, Router, RoutingError};
pub use handlers::{GenerationOverrides, HandlerSettings, ResponseHandler};
pub use intent::IntentKey;
pub use registry::{HandlerRegistry, RegistryBuilder, RegistryError};

/// Router with the built-in weather, translation and model handlers, wired
/// from `config` and sharing one backend.
pub fn build_default(config: &Config, provider: LlmProvider) -> Result<Router, RegistryError> {
    let backend = Backend::new(provider, Duration::from_secs(config.router.backend_timeout_seconds));
    let handlers = &config.handlers;
    let settings = |cfg: &ModelSettingsConfig| HandlerSettings::with_default_model(cfg, &config.llm.default_model);

    let mut builder = RegistryBuilder::new();
    builder
        .register(IntentKey::WEATHER, handlers::WeatherHandler::new(handlers.weather_reply.clone()))?
        .register(
            IntentKey::TRANSLATION,
            handlers::TranslationHandler::new(
                backend.clone(),
                settings(&handlers.translation),
                info_span!("handler", intent = "translation"),
            ),
        )?
        .register(
            IntentKey::MODEL,
            handlers::ModelHandler::new(
                backend.clone(),
                settings(&handlers.model),
                info_span!("handler", intent = "model"),
            ),
        )?;

    let classifier = Classifier::from_config(
        &config.router,
        backend,
        settings(&handlers.classifier),
        info_span!("classifier"),
    );

    Router::new(classifier, Arc::new(builder.build()), info_span!("router"))
}
