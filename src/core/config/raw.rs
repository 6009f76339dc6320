//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults, so an
//! empty document is a valid configuration. The `load` module converts them
//! into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub app: RawApp,
    #[serde(default)]
    pub comms: RawComms,
    #[serde(default)]
    pub router: RawRouter,
    #[serde(default)]
    pub handlers: RawHandlers,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub sessions: RawSessions,
}

#[derive(Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for RawApp {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

// ── Comms ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawComms {
    #[serde(default)]
    pub pty: RawPty,
    #[serde(default)]
    pub http: RawHttp,
}

#[derive(Deserialize)]
pub(super) struct RawPty {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RawPty {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_false")]
    pub enabled: bool,
    #[serde(default = "default_http_bind")]
    pub bind: String,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: default_http_bind(),
        }
    }
}

// ── Router ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawRouter {
    #[serde(default = "default_lexical_rules")]
    pub lexical: Vec<RawLexicalRule>,
    #[serde(default = "default_fallback_intent")]
    pub fallback_intent: String,
    #[serde(default = "default_backend_timeout_seconds")]
    pub backend_timeout_seconds: u64,
}

impl Default for RawRouter {
    fn default() -> Self {
        Self {
            lexical: default_lexical_rules(),
            fallback_intent: default_fallback_intent(),
            backend_timeout_seconds: default_backend_timeout_seconds(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub(super) struct RawLexicalRule {
    pub intent: String,
    #[serde(default)]
    pub triggers: Vec<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawHandlers {
    #[serde(default = "default_weather_reply")]
    pub weather_reply: String,
    #[serde(default = "default_classifier_settings")]
    pub classifier: RawModelSettings,
    #[serde(default)]
    pub translation: RawModelSettings,
    #[serde(default)]
    pub model: RawModelSettings,
}

impl Default for RawHandlers {
    fn default() -> Self {
        Self {
            weather_reply: default_weather_reply(),
            classifier: default_classifier_settings(),
            translation: RawModelSettings::default(),
            model: RawModelSettings::default(),
        }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawModelSettings {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAi,
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default)]
    pub default_model: Option<String>,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            openai: RawOpenAi::default(),
            models: default_models(),
            default_model: None,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAi {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

// ── Sessions ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawSessions {
    #[serde(default = "default_session_max_records")]
    pub max_records: usize,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for RawSessions {
    fn default() -> Self {
        Self {
            max_records: default_session_max_records(),
            history_window: default_history_window(),
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_app_name() -> String {
    "routebot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_http_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_lexical_rules() -> Vec<RawLexicalRule> {
    vec![RawLexicalRule {
        intent: "translation".to_string(),
        triggers: vec!["翻譯".to_string(), "translate".to_string()],
    }]
}

fn default_fallback_intent() -> String {
    "model".to_string()
}

fn default_backend_timeout_seconds() -> u64 {
    60
}

pub(super) fn default_weather_reply() -> String {
    "今天晴天，氣溫25度。".to_string()
}

// Classification wants a deterministic label.
fn default_classifier_settings() -> RawModelSettings {
    RawModelSettings {
        model: None,
        temperature: Some(0.0),
    }
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "gpt-4o-mini".to_string(),
        "gpt-4".to_string(),
        "gpt-3.5-turbo".to_string(),
    ]
}

fn default_openai_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_temperature() -> f32 {
    0.7
}

fn default_openai_timeout_seconds() -> u64 {
    60
}

fn default_session_max_records() -> usize {
    100
}

fn default_history_window() -> usize {
    10
}
