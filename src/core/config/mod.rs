//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `ROUTEBOT_*` env overrides. The LLM API key is read from
//! `LLM_API_KEY` (or `OPENAI_API_KEY`) and never from TOML.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs (`Config`, `RouterConfig`,
//!   `HandlersConfig`, `LlmConfig`, …).
//! - **raw** — Raw TOML deserialization types. These mirror the file shape
//!   and use serde defaults; kept private.
//! - **load** — Loading logic: base-chain merging, env overrides, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{EnvOverrides, expand_home, load, load_from, load_str};
pub use types::*;

impl Config {
    /// Safe `Config` for tests — dummy LLM, no API key, no external calls.
    pub fn test_default() -> Result<Self, crate::error::AppError> {
        let mut cfg = load_str("", &EnvOverrides::default())?;
        cfg.llm.provider = "dummy".into();
        cfg.router.backend_timeout_seconds = 1;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[app]
name = "test-bot"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.app_name, "test-bot");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn empty_document_uses_builtin_defaults() {
        let cfg = load_str("", &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.app_name, "routebot");
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.default_model, "gpt-4o-mini");
        assert_eq!(cfg.llm.models.len(), 3);
        assert_eq!(cfg.handlers.weather_reply, "今天晴天，氣溫25度。");
        assert_eq!(cfg.handlers.classifier.temperature, Some(0.0));
        assert_eq!(cfg.router.backend_timeout_seconds, 60);
        assert_eq!(cfg.sessions.max_records, 100);
        assert_eq!(cfg.sessions.history_window, 10);
        assert!(cfg.comms.pty.enabled);
        assert!(!cfg.comms.http.enabled);
    }

    #[test]
    fn default_translation_triggers() {
        let cfg = load_str("", &EnvOverrides::default()).unwrap();
        assert_eq!(
            cfg.router.lexical,
            vec![LexicalRuleConfig {
                intent: "translation".into(),
                triggers: vec!["翻譯".into(), "translate".into()],
            }]
        );
    }

    #[test]
    fn fallback_intent_defaults_to_model() {
        let cfg = load_str("", &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.router.fallback_intent, "model");
        let err = load_str("[router]\nfallback_intent = \" \"\n", &EnvOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("fallback_intent"));
    }

    #[test]
    fn lexical_rules_can_be_disabled() {
        let cfg = load_str("[router]\nlexical = []\n", &EnvOverrides::default()).unwrap();
        assert!(cfg.router.lexical.is_empty());
    }

    #[test]
    fn parse_handler_settings() {
        let toml = r#"
[handlers]
weather_reply = "sunny"

[handlers.translation]
model = "gpt-4"
temperature = 0.1

[handlers.model]
model = "  "
"#;
        let cfg = load_str(toml, &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.handlers.weather_reply, "sunny");
        assert_eq!(cfg.handlers.translation.model.as_deref(), Some("gpt-4"));
        assert_eq!(cfg.handlers.translation.temperature, Some(0.1));
        assert_eq!(cfg.handlers.model.model, None);
        // Classifier keeps its deterministic default when the section is absent.
        assert_eq!(cfg.handlers.classifier.temperature, Some(0.0));
    }

    #[test]
    fn default_model_must_be_listed() {
        let toml = r#"
[llm]
models = ["gpt-4"]
default_model = "gpt-4o-mini"
"#;
        let err = load_str(toml, &EnvOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("default_model"));
    }

    #[test]
    fn empty_model_list_rejected() {
        let err = load_str("[llm]\nmodels = []\n", &EnvOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("at least one model"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = load_str("[router]\nbackend_timeout_seconds = 0\n", &EnvOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("backend_timeout_seconds"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.routebot/logs/app.log");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("app.log"));
    }

    #[test]
    fn absolute_path_unchanged() {
        let p = expand_home("/absolute/path");
        assert_eq!(p, std::path::PathBuf::from("/absolute/path"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(
            std::path::Path::new("/nonexistent/config.toml"),
            &EnvOverrides::default(),
        );
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn env_overrides_apply() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            log_level: Some("debug".into()),
            http_bind: Some("0.0.0.0:9000".into()),
            api_key: Some("sk-test".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.comms.http.bind, "0.0.0.0:9000");
        assert_eq!(cfg.llm_api_key.as_deref(), Some("sk-test"));
    }

    const BASE_TOML: &str = r#"
[app]
name = "base-bot"
log_level = "info"

[llm]
provider = "dummy"

[llm.openai]
model = "gpt-base"
temperature = 0.1
timeout_seconds = 30
"#;

    fn write_named(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        std::fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn overlay_keeps_base_fields() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[app]
log_level = "debug"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.app_name, "base-bot");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.llm.provider, "dummy");
    }

    #[test]
    fn overlay_wins_scalar() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[llm.openai]
model = "gpt-overlay"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.llm.openai.model, "gpt-overlay");
        assert_eq!(cfg.llm.openai.temperature, 0.1);
    }

    #[test]
    fn missing_base_errors() {
        let dir = TempDir::new().unwrap();
        let overlay = r#"
[meta]
base = "nonexistent.toml"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let msg = load_from(&overlay_path, &EnvOverrides::default())
            .unwrap_err()
            .to_string();
        assert!(msg.contains("cannot read"));
    }

    #[test]
    fn cycle_detection() {
        let dir = TempDir::new().unwrap();
        let self_path = dir.path().join("self.toml");
        let content = format!("[meta]\nbase = \"{}\"\n\n{BASE_TOML}", self_path.display());
        std::fs::write(&self_path, content).unwrap();
        let msg = load_from(&self_path, &EnvOverrides::default())
            .unwrap_err()
            .to_string();
        assert!(msg.contains("circular"));
    }

    #[test]
    fn test_default_is_offline() {
        let cfg = Config::test_default().unwrap();
        assert_eq!(cfg.llm.provider, "dummy");
        assert!(cfg.llm_api_key.is_none());
    }
}
