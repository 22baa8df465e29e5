//! Tests for the dotenv/environment key source

use std::fs;

use shared::ProviderId;

use crate::services::api_keys::{collect_keys, EnvApiKeySource};
use crate::traits::ApiKeySource;

fn pairs(vars: &[(&str, &str)]) -> Vec<(String, String)> {
    vars.iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_collect_keys_maps_known_variables() {
    let keys = collect_keys(pairs(&[
        ("OPENAI_API_KEY", "sk-openai"),
        ("ANTHROPIC_API_KEY", "sk-anthropic"),
        ("UNRELATED", "ignored"),
    ]));

    assert_eq!(keys.len(), 2);
    assert_eq!(keys[&ProviderId::OpenAI], "sk-openai");
    assert_eq!(keys[&ProviderId::Anthropic], "sk-anthropic");
}

#[test]
fn test_google_key_preferred_over_gemini_alias() {
    let keys = collect_keys(pairs(&[
        ("GEMINI_API_KEY", "gemini-alias"),
        ("GOOGLE_API_KEY", "google-primary"),
    ]));
    assert_eq!(keys[&ProviderId::Gemini], "google-primary");

    let keys = collect_keys(pairs(&[("GEMINI_API_KEY", "gemini-alias")]));
    assert_eq!(keys[&ProviderId::Gemini], "gemini-alias");
}

#[test]
fn test_blank_values_and_later_overrides() {
    let keys = collect_keys(pairs(&[
        ("OPENAI_API_KEY", "from-file"),
        ("OPENAI_API_KEY", "from-env"),
        ("ANTHROPIC_API_KEY", "   "),
    ]));

    assert_eq!(keys[&ProviderId::OpenAI], "from-env");
    assert!(!keys.contains_key(&ProviderId::Anthropic));
}

#[tokio::test]
async fn test_missing_env_file_is_not_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = EnvApiKeySource::with_env_file(temp_dir.path().join("absent.env"));

    // Whatever the environment holds is fine; the call must simply succeed
    let keys = source.get_api_keys().await;
    assert!(keys.len() <= 3);
}

#[tokio::test]
async fn test_env_file_entries_are_read() {
    let temp_dir = tempfile::tempdir().unwrap();
    let env_path = temp_dir.path().join(".env");
    fs::write(&env_path, "ANTHROPIC_API_KEY=test-anthropic-from-file\n").unwrap();

    // An exported variable takes precedence over the file
    let expected = match std::env::var("ANTHROPIC_API_KEY") {
        Ok(value) => Some(value.trim().to_string()).filter(|value| !value.is_empty()),
        Err(_) => Some("test-anthropic-from-file".to_string()),
    };

    let source = EnvApiKeySource::with_env_file(&env_path);
    let keys = source.get_api_keys().await;
    assert_eq!(keys.get(&ProviderId::Anthropic).cloned(), expected);
}
