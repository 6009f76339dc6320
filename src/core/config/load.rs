//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `ROUTEBOT_LOG_LEVEL` and `ROUTEBOT_HTTP_BIND` env overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::raw::{RawConfig, RawModelSettings};
use super::types::*;

/// Env-var overrides applied on top of the file. Tests pass these directly
/// instead of mutating the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub http_bind: Option<String>,
    pub api_key: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment. `LLM_API_KEY` wins over
    /// `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("ROUTEBOT_LOG_LEVEL").ok(),
            http_bind: env::var("ROUTEBOT_HTTP_BIND").ok(),
            api_key: env::var("LLM_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Deep-merge two TOML values.
/// Tables merge recursively; any other overlay value replaces the base value.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// merged `toml::Value`. `visited` holds canonicalized paths already seen so
/// circular references are caught.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base_ref = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
        .map(str::to_string);

    match base_ref {
        Some(base_str) => {
            let base_path = if Path::new(&base_str).is_absolute() {
                PathBuf::from(base_str)
            } else {
                path.parent().unwrap_or(Path::new(".")).join(base_str)
            };
            let base_val = load_raw_merged(&base_path, visited)?;
            Ok(merge_toml(base_val, overlay_val))
        }
        None => Ok(overlay_val),
    }
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. Without an explicit path and without the default file,
/// the built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        resolve(RawConfig::default(), &overrides)
    }
}

/// Load a specific file (following its base chain) and resolve it.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    resolve(parsed, overrides)
}

/// Parse a TOML document held in memory. No base chain is followed.
pub fn load_str(content: &str, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let parsed: RawConfig =
        toml::from_str(content).map_err(|e| AppError::Config(format!("config error: {e}")))?;
    resolve(parsed, overrides)
}

fn model_settings(raw: RawModelSettings) -> ModelSettingsConfig {
    ModelSettingsConfig {
        model: raw.model.filter(|m| !m.trim().is_empty()),
        temperature: raw.temperature,
    }
}

fn resolve(parsed: RawConfig, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let app = parsed.app;
    let log_level = overrides.log_level.clone().unwrap_or(app.log_level);
    let log_file = app.log_file.as_deref().map(expand_home);

    if parsed.llm.models.is_empty() {
        return Err(AppError::Config("[llm] models must list at least one model".into()));
    }
    let default_model = parsed
        .llm
        .default_model
        .unwrap_or_else(|| parsed.llm.models[0].clone());
    if !parsed.llm.models.contains(&default_model) {
        return Err(AppError::Config(format!(
            "[llm] default_model '{default_model}' is not listed in models"
        )));
    }

    if parsed.router.backend_timeout_seconds == 0 {
        return Err(AppError::Config("[router] backend_timeout_seconds must be > 0".into()));
    }

    let fallback_intent = parsed.router.fallback_intent.trim().to_string();
    if fallback_intent.is_empty() {
        return Err(AppError::Config("[router] fallback_intent must not be empty".into()));
    }

    let lexical = parsed
        .router
        .lexical
        .into_iter()
        .map(|rule| LexicalRuleConfig {
            intent: rule.intent,
            triggers: rule
                .triggers
                .into_iter()
                .filter(|t| !t.trim().is_empty())
                .collect(),
        })
        .collect();

    Ok(Config {
        app_name: app.name,
        log_level,
        log_file,
        comms: CommsConfig {
            pty: PtyConfig {
                enabled: parsed.comms.pty.enabled,
            },
            http: HttpConfig {
                enabled: parsed.comms.http.enabled,
                bind: overrides.http_bind.clone().unwrap_or(parsed.comms.http.bind),
            },
        },
        router: RouterConfig {
            lexical,
            fallback_intent,
            backend_timeout_seconds: parsed.router.backend_timeout_seconds,
        },
        handlers: HandlersConfig {
            weather_reply: parsed.handlers.weather_reply,
            classifier: model_settings(parsed.handlers.classifier),
            translation: model_settings(parsed.handlers.translation),
            model: model_settings(parsed.handlers.model),
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
            models: parsed.llm.models,
            default_model,
        },
        llm_api_key: overrides.api_key.clone(),
        sessions: SessionsConfig {
            max_records: parsed.sessions.max_records.max(1),
            history_window: parsed.sessions.history_window,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
