//! Two-tier intent classification.
//!
//! Tier 1 scans the latest user message for configured trigger substrings
//! and answers without touching the backend. Tier 2 asks the backend for a
//! single label and maps the normalised reply onto a known intent; anything
//! unrecognised falls back to the catch-all intent.

use tracing::{Instrument, Span, debug};

use crate::config::{LexicalRuleConfig, RouterConfig};
use crate::llm::{GenerationParams, ProviderError};

use super::backend::Backend;
use super::conversation::{Conversation, Message};
use super::handlers::{GenerationOverrides, HandlerSettings};
use super::intent::IntentKey;

/// Triggers for one intent. Matching is a case-insensitive substring test.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalRule {
    intent: IntentKey,
    triggers: Vec<String>,
}

impl LexicalRule {
    pub fn new<I, S>(intent: IntentKey, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            intent,
            triggers: triggers.into_iter().map(|t| t.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn intent(&self) -> &IntentKey {
        &self.intent
    }

    fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t.as_str()))
    }
}

impl From<&LexicalRuleConfig> for LexicalRule {
    fn from(cfg: &LexicalRuleConfig) -> Self {
        Self::new(IntentKey::new(cfg.intent.clone()), &cfg.triggers)
    }
}

/// A label the backend may answer with, and how it is described in the
/// classification prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub intent: IntentKey,
    pub description: String,
}

impl LabelSpec {
    pub fn new(intent: IntentKey, description: impl Into<String>) -> Self {
        Self { intent, description: description.into() }
    }
}

/// Labels offered by default, in containment-test priority order. The
/// catch-all is listed in the prompt but never tested for.
pub fn default_labels() -> Vec<LabelSpec> {
    vec![
        LabelSpec::new(IntentKey::WEATHER, "天氣相關問題"),
        LabelSpec::new(IntentKey::TRANSLATION, "翻譯相關問題"),
    ]
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<LexicalRule>,
    labels: Vec<LabelSpec>,
    fallback: LabelSpec,
    backend: Backend,
    settings: HandlerSettings,
    span: Span,
}

impl Classifier {
    pub fn new(
        rules: Vec<LexicalRule>,
        labels: Vec<LabelSpec>,
        fallback: IntentKey,
        backend: Backend,
        settings: HandlerSettings,
        span: Span,
    ) -> Self {
        Self {
            rules,
            labels,
            fallback: LabelSpec::new(fallback, "其他一般問題"),
            backend,
            settings,
            span,
        }
    }

    /// Classifier wired from `[router]`: configured lexical rules, default
    /// labels, configured fallback intent.
    pub fn from_config(router: &RouterConfig, backend: Backend, settings: HandlerSettings, span: Span) -> Self {
        Self::new(
            router.lexical.iter().map(LexicalRule::from).collect(),
            default_labels(),
            IntentKey::new(router.fallback_intent.clone()),
            backend,
            settings,
            span,
        )
    }

    pub fn fallback(&self) -> &IntentKey {
        &self.fallback.intent
    }

    /// Every intent this classifier can return.
    pub fn possible_intents(&self) -> impl Iterator<Item = &IntentKey> {
        self.rules
            .iter()
            .map(LexicalRule::intent)
            .chain(self.labels.iter().map(|l| &l.intent))
            .chain(std::iter::once(&self.fallback.intent))
    }

    /// Tier 1 only. Pure and synchronous.
    pub fn lexical_match(&self, content: &str) -> Option<&IntentKey> {
        let lowered = content.to_lowercase();
        self.rules.iter().find(|r| r.matches(&lowered)).map(LexicalRule::intent)
    }

    /// Resolve the intent for `conversation`, making at most one backend
    /// call. Request overrides may pick the backend model; temperature stays
    /// the classifier's own.
    pub async fn classify(
        &self,
        conversation: &Conversation,
        overrides: &GenerationOverrides,
    ) -> Result<IntentKey, ProviderError> {
        let content = conversation.latest_user_content();

        if let Some(intent) = self.lexical_match(content) {
            debug!(parent: &self.span, %intent, "lexical trigger matched");
            return Ok(intent.clone());
        }

        let fut = async {
            let prompt = [Message::user(self.prompt(content))];
            let params = GenerationParams {
                backend_id: overrides.model.clone().or_else(|| self.settings.model.clone()),
                temperature: self.settings.temperature,
            };
            let reply = self.backend.complete(&prompt, &params).await?;
            let intent = self.parse_label(reply.content());
            debug!(label = reply.content(), %intent, "backend classification");
            Ok::<_, ProviderError>(intent)
        };
        fut.instrument(self.span.clone()).await
    }

    fn prompt(&self, content: &str) -> String {
        let mut prompt = String::from("請判斷以下問題類型，回覆對應的標籤：\n");
        for label in self.labels.iter().chain(std::iter::once(&self.fallback)) {
            prompt.push_str(&format!(
                "- 如果是{}，回覆 '{}'\n",
                label.description, label.intent
            ));
        }
        prompt.push_str(&format!("\n問題：{content}"));
        prompt
    }

    /// First label (in priority order) contained in the normalised reply,
    /// else the fallback.
    fn parse_label(&self, reply: &str) -> IntentKey {
        let normalised = reply.trim().to_lowercase();
        self.labels
            .iter()
            .find(|l| normalised.contains(l.intent.as_str()))
            .map(|l| l.intent.clone())
            .unwrap_or_else(|| self.fallback.intent.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::llm::LlmProvider;
    use crate::llm::providers::scripted::ScriptedProvider;

    fn classifier(scripted: &ScriptedProvider) -> Classifier {
        let backend = Backend::new(LlmProvider::Scripted(scripted.clone()), Duration::from_secs(60));
        Classifier::new(
            vec![LexicalRule::new(IntentKey::TRANSLATION, ["翻譯", "translate"])],
            default_labels(),
            IntentKey::MODEL,
            backend,
            HandlerSettings { model: None, temperature: Some(0.0) },
            Span::none(),
        )
    }

    fn conv(text: &str) -> Conversation {
        Conversation::from(vec![Message::user(text)])
    }

    #[tokio::test]
    async fn trigger_skips_backend() {
        let scripted = ScriptedProvider::new();
        let c = classifier(&scripted);
        for text in ["請幫我翻譯：Hello", "Please TRANSLATE this", "translate: bonjour"] {
            let intent = c.classify(&conv(text), &GenerationOverrides::default()).await.unwrap();
            assert_eq!(intent, IntentKey::TRANSLATION, "{text}");
        }
        assert_eq!(scripted.call_count(), 0);
    }

    #[tokio::test]
    async fn backend_label_is_normalised() {
        let scripted = ScriptedProvider::with_replies(["  Weather \n"]);
        let c = classifier(&scripted);
        let intent = c
            .classify(&conv("What's the weather?"), &GenerationOverrides::default())
            .await
            .unwrap();
        assert_eq!(intent, IntentKey::WEATHER);
        assert_eq!(scripted.call_count(), 1);
    }

    #[tokio::test]
    async fn weather_checked_before_translation() {
        let scripted = ScriptedProvider::with_replies(["translation or weather"]);
        let c = classifier(&scripted);
        let intent = c.classify(&conv("hmm"), &GenerationOverrides::default()).await.unwrap();
        assert_eq!(intent, IntentKey::WEATHER);
    }

    #[tokio::test]
    async fn unknown_label_falls_back() {
        let scripted = ScriptedProvider::with_replies(["I think this is about cooking"]);
        let c = classifier(&scripted);
        let intent = c.classify(&conv("recipe?"), &GenerationOverrides::default()).await.unwrap();
        assert_eq!(intent, IntentKey::MODEL);
    }

    #[tokio::test]
    async fn prompt_lists_labels_and_question() {
        let scripted = ScriptedProvider::with_replies(["model"]);
        let c = classifier(&scripted);
        let overrides = GenerationOverrides { model: Some("gpt-4".into()), temperature: Some(1.8) };
        c.classify(&conv("Tell me a joke"), &overrides).await.unwrap();

        let call = &scripted.calls()[0];
        let prompt = call.messages[0].content();
        assert!(prompt.starts_with("請判斷以下問題類型"));
        assert!(prompt.contains("- 如果是天氣相關問題，回覆 'weather'\n"));
        assert!(prompt.contains("- 如果是翻譯相關問題，回覆 'translation'\n"));
        assert!(prompt.contains("- 如果是其他一般問題，回覆 'model'\n"));
        assert!(prompt.ends_with("\n\n問題：Tell me a joke"));
        assert_eq!(call.params.backend_id.as_deref(), Some("gpt-4"));
        assert_eq!(call.params.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn empty_rule_list_always_asks_backend() {
        let scripted = ScriptedProvider::with_replies(["translation"]);
        let backend = Backend::new(LlmProvider::Scripted(scripted.clone()), Duration::from_secs(60));
        let c = Classifier::new(
            Vec::new(),
            default_labels(),
            IntentKey::MODEL,
            backend,
            HandlerSettings::default(),
            Span::none(),
        );
        let intent = c.classify(&conv("翻譯：你好"), &GenerationOverrides::default()).await.unwrap();
        assert_eq!(intent, IntentKey::TRANSLATION);
        assert_eq!(scripted.call_count(), 1);
    }

    #[test]
    fn possible_intents_cover_rules_labels_and_fallback() {
        let c = classifier(&ScriptedProvider::new());
        let all: Vec<_> = c.possible_intents().cloned().collect();
        assert!(all.contains(&IntentKey::TRANSLATION));
        assert!(all.contains(&IntentKey::WEATHER));
        assert!(all.contains(&IntentKey::MODEL));
    }
}
