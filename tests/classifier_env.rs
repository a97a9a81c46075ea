// tests/classifier_env.rs
// Mutates process env, so every test is #[serial].

use std::env;
use std::sync::Arc;

use rfp_monitor::classify::{MockBackend, SemanticFilter};
use rfp_monitor::config::{LlmConfig, LlmSettings, ProcessEnv};
use rfp_monitor::Candidate;
use serial_test::serial;

/// Small RAII helper to snapshot & restore env vars in each test.
struct EnvSnapshot {
    saved: Vec<(String, Option<String>)>,
}
impl EnvSnapshot {
    /// Provide a list of (KEY, Some(VALUE)) to set, or (KEY, None) to remove.
    fn set(pairs: &[(&str, Option<&str>)]) -> Self {
        let mut saved = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            let key = k.to_string();
            let prev = env::var(k).ok();
            saved.push((key.clone(), prev));
            match v {
                Some(val) => env::set_var(&key, val),
                None => env::remove_var(&key),
            }
        }
        Self { saved }
    }
}
impl Drop for EnvSnapshot {
    fn drop(&mut self) {
        for (k, maybe_v) in self.saved.drain(..) {
            match maybe_v {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

fn items() -> Vec<Candidate> {
    vec![
        Candidate::new("Learning Management System RFP", "https://a.example/1"),
        Candidate::new("Snow Plow Contract", "https://a.example/2"),
    ]
}

const DROP_ALL: &str = r#"{"results":[{"index":0,"keep":false},{"index":1,"keep":false}]}"#;

#[tokio::test]
#[serial]
async fn disabled_in_config_passes_through() {
    let _env = EnvSnapshot::set(&[
        ("LLM_ENABLED", None),
        ("OPENAI_API_KEY", Some("sk-test")),
    ]);
    let cfg = LlmConfig::default();
    let mock = Arc::new(MockBackend::replying(DROP_ALL));
    let f = SemanticFilter::new(LlmSettings::resolve(&cfg, &ProcessEnv), mock.clone());

    assert_eq!(f.filter(items()).await, items());
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
#[serial]
async fn env_override_off_beats_enabled_config() {
    let _env = EnvSnapshot::set(&[
        ("LLM_ENABLED", Some("Off")),
        ("OPENAI_API_KEY", Some("sk-test")),
    ]);
    let cfg = LlmConfig {
        enabled: true,
        ..Default::default()
    };
    let mock = Arc::new(MockBackend::replying(DROP_ALL));
    let f = SemanticFilter::new(LlmSettings::resolve(&cfg, &ProcessEnv), mock.clone());

    assert!(!f.settings().enabled);
    assert_eq!(f.filter(items()).await, items());
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
#[serial]
async fn unrecognized_override_falls_back_to_config() {
    let _env = EnvSnapshot::set(&[
        ("LLM_ENABLED", Some("perhaps")),
        ("OPENAI_API_KEY", Some("sk-test")),
    ]);
    let cfg = LlmConfig {
        enabled: true,
        ..Default::default()
    };
    let mock = Arc::new(MockBackend::replying(DROP_ALL));
    let f = SemanticFilter::new(LlmSettings::resolve(&cfg, &ProcessEnv), mock.clone());

    assert!(f.filter(items()).await.is_empty());
    assert_eq!(mock.calls(), 1);
}

#[test]
#[serial]
fn model_override_wins_over_config() {
    let _env = EnvSnapshot::set(&[("LLM_MODEL", Some("gpt-4o-mini"))]);
    let cfg = LlmConfig {
        model: Some("gpt-5-nano".into()),
        ..Default::default()
    };
    assert_eq!(LlmSettings::resolve(&cfg, &ProcessEnv).model, "gpt-4o-mini");
}

#[test]
#[serial]
fn custom_override_var_names() {
    let _env = EnvSnapshot::set(&[
        ("RFP_LLM", Some("yes")),
        ("RFP_LLM_MODEL", Some("custom-model")),
        ("LLM_ENABLED", Some("no")),
    ]);
    let cfg = LlmConfig {
        enabled: false,
        enabled_env: "RFP_LLM".into(),
        model_env: "RFP_LLM_MODEL".into(),
        ..Default::default()
    };
    let s = LlmSettings::resolve(&cfg, &ProcessEnv);
    assert!(s.enabled);
    assert_eq!(s.model, "custom-model");
}

#[tokio::test]
#[serial]
async fn missing_key_passes_through() {
    let _env = EnvSnapshot::set(&[("LLM_ENABLED", Some("1")), ("OPENAI_API_KEY", None)]);
    let mock = Arc::new(MockBackend::replying(DROP_ALL));
    let f = SemanticFilter::new(
        LlmSettings::resolve(&LlmConfig::default(), &ProcessEnv),
        mock.clone(),
    );
    assert_eq!(f.filter(items()).await, items());
    assert_eq!(mock.calls(), 0);
}
