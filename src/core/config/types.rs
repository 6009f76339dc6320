//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the router, the chat service
//! and the channels consume. Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── Comms ───────────────────────────────────────────────────────────────────

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Whether the PTY channel is explicitly enabled.
    pub enabled: bool,
}

/// Axum HTTP channel configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whether the HTTP API is explicitly enabled.
    pub enabled: bool,
    /// Socket address to bind the listener to.
    pub bind: String,
}

/// Comms configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub http: HttpConfig,
}

// ── Router ───────────────────────────────────────────────────────────────────

/// One lexical pre-filter rule: any trigger found in the latest user
/// message selects `intent` without consulting the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalRuleConfig {
    pub intent: String,
    pub triggers: Vec<String>,
}

/// Routing engine configuration. Populated from `[router]`.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Lexical rules, evaluated in order. An empty list disables tier 1.
    pub lexical: Vec<LexicalRuleConfig>,
    /// Intent chosen when the classifier's reply names no known label.
    pub fallback_intent: String,
    /// Upper bound on every backend round-trip, in seconds.
    pub backend_timeout_seconds: u64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// Backend identifier and temperature for one backend-calling component.
/// `None` falls through to the provider defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSettingsConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Per-handler configuration. Populated from `[handlers]`.
#[derive(Debug, Clone)]
pub struct HandlersConfig {
    /// Canned reply returned by the weather handler.
    pub weather_reply: String,
    pub classifier: ModelSettingsConfig,
    pub translation: ModelSettingsConfig,
    pub model: ModelSettingsConfig,
}

// ── LLM ──────────────────────────────────────────────────────────────────────

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name used when neither the handler nor the request names one.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active provider: `"dummy"` or `"openai"`.
    pub provider: String,
    pub openai: OpenAiConfig,
    /// Model names a chat request may select.
    pub models: Vec<String>,
    /// Model used when a chat request names none.
    pub default_model: String,
}

// ── Sessions ─────────────────────────────────────────────────────────────────

/// In-memory conversation log configuration. Populated from `[sessions]`.
#[derive(Debug, Clone)]
pub struct SessionsConfig {
    /// Records kept per session; the oldest are dropped beyond this.
    pub max_records: usize,
    /// Most recent records replayed to the model as prior turns.
    pub history_window: usize,
}

// ── Top-level ────────────────────────────────────────────────────────────────

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    /// Append-mode log file; `None` logs to stderr.
    pub log_file: Option<PathBuf>,
    pub comms: CommsConfig,
    pub router: RouterConfig,
    pub handlers: HandlersConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` (or `OPENAI_API_KEY`); never from TOML.
    pub llm_api_key: Option<String>,
    pub sessions: SessionsConfig,
}

impl Config {
    /// The PTY console loads only when enabled in config.
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    pub fn comms_http_should_load(&self) -> bool {
        self.comms.http.enabled
    }
}
