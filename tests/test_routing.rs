//! End-to-end routing through the public library surface with a scripted
//! backend.

use std::time::Duration;

use routebot::config::{Config, EnvOverrides, load_str};
use routebot::llm::providers::scripted::ScriptedProvider;
use routebot::llm::{LlmProvider, ProviderError};
use routebot::router::{self, IntentKey, Message, Role, RoutingError, assemble};
use routebot::subsystems::chat::{ChatError, ChatService, QueryOptions};

fn router_for(config: &Config, scripted: &ScriptedProvider) -> router::Router {
    router::build_default(config, LlmProvider::Scripted(scripted.clone())).unwrap()
}

#[tokio::test]
async fn weather_reply_is_canned_and_stable() {
    let config = Config::test_default().unwrap();
    let scripted = ScriptedProvider::with_replies(["weather", "WEATHER."]);
    let r = router_for(&config, &scripted);

    let conv = assemble(&[], "What's the weather?");
    let first = r.route_and_respond(&conv).await.unwrap();
    let second = r.route_and_respond(&conv).await.unwrap();

    assert_eq!(first.role(), Role::Assistant);
    assert_eq!(first.content(), "今天晴天，氣溫25度。");
    assert_eq!(first, second);
}

#[tokio::test]
async fn translation_request_sends_payload_only() {
    let config = Config::test_default().unwrap();
    let scripted = ScriptedProvider::with_replies(["Hello"]);
    let r = router_for(&config, &scripted);

    let prior = vec![Message::user("hi"), Message::assistant("hey")];
    let conv = assemble(&prior, "請幫我翻譯：你好");
    let routed = r.route(&conv).await.unwrap();

    assert_eq!(routed.intent, IntentKey::TRANSLATION);
    assert_eq!(routed.message.content(), "Hello");
    let calls = scripted.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].messages.len(), 1);
    assert!(calls[0].messages[0].content().ends_with("\n\n你好"));
}

#[tokio::test]
async fn disabled_lexical_rules_defer_to_backend() {
    let config = load_str("[llm]\nprovider = \"dummy\"\n\n[router]\nlexical = []\n", &EnvOverrides::default()).unwrap();
    let scripted = ScriptedProvider::with_replies(["model", "I can help with that."]);
    let r = router_for(&config, &scripted);

    let routed = r.route(&assemble(&[], "translate this please")).await.unwrap();
    assert_eq!(routed.intent, IntentKey::MODEL);
    assert_eq!(scripted.call_count(), 2);
}

#[tokio::test]
async fn custom_trigger_from_config() {
    let toml = r#"
[[router.lexical]]
intent = "weather"
triggers = ["天氣", "Forecast"]
"#;
    let config = load_str(toml, &EnvOverrides::default()).unwrap();
    let scripted = ScriptedProvider::new();
    let r = router_for(&config, &scripted);

    let routed = r.route(&assemble(&[], "tomorrow's forecast?")).await.unwrap();
    assert_eq!(routed.intent, IntentKey::WEATHER);
    assert_eq!(scripted.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn handler_timeout_surfaces_as_backend_error() {
    let mut config = Config::test_default().unwrap();
    config.router.backend_timeout_seconds = 60;
    let scripted = ScriptedProvider::with_replies(["translated"]).with_delay(Duration::from_secs(90));
    let r = router_for(&config, &scripted);

    let conv = assemble(&[], "翻譯：slow");
    let err = r.route(&conv).await.unwrap_err();
    assert!(matches!(err, RoutingError::Backend(ProviderError::Timeout(_))));
}

#[tokio::test]
async fn resolved_intent_is_always_registered() {
    let config = Config::test_default().unwrap();
    let replies = ["weather", "translation", "model", "nonsense", ""];
    let scripted = ScriptedProvider::new();
    let r = router_for(&config, &scripted);

    for label in replies {
        scripted.push_reply(label);
        // The weather handler answers without the backend.
        if label != "weather" {
            scripted.push_reply("ok");
        }
        let routed = r.route(&assemble(&[], "some question")).await.unwrap();
        assert!(r.registry().contains(&routed.intent), "label {label:?} gave {}", routed.intent);
    }
    assert_eq!(scripted.call_count(), 9);
}

#[tokio::test]
async fn service_rejects_out_of_range_temperature() {
    let config = Config::test_default().unwrap();
    let scripted = ScriptedProvider::new();
    let svc = ChatService::new(router_for(&config, &scripted), &config);

    let options = QueryOptions { model: None, temperature: Some(3.0) };
    let err = svc.process_query("hello", &[], &options).await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidTemperature(t) if t == 3.0));
}
