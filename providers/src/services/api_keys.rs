//! Environment-backed API key source
//!
//! A `.env` file (if present) is loaded into the process environment without
//! overriding variables that are already set, then keys are read from it. No key is required:
//! providers without one register anyway and report `Unavailable` when used.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use shared::ProviderId;

use crate::traits::ApiKeySource;

/// Environment variable names per provider, first match wins
const KEY_VARS: &[(ProviderId, &str)] = &[
    (ProviderId::OpenAI, "OPENAI_API_KEY"),
    (ProviderId::Anthropic, "ANTHROPIC_API_KEY"),
    (ProviderId::Gemini, "GOOGLE_API_KEY"),
    (ProviderId::Gemini, "GEMINI_API_KEY"),
];

/// Real API key source using a dotenv file plus environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvApiKeySource {
    env_file: Option<PathBuf>,
}

impl EnvApiKeySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this file instead of searching for `.env`
    pub fn with_env_file(path: impl Into<PathBuf>) -> Self {
        Self {
            env_file: Some(path.into()),
        }
    }

    /// Load the env file into the process environment
    ///
    /// Variables already set are left alone, so exported values win.
    fn load_env_file(&self) {
        let loaded = match &self.env_file {
            Some(path) => dotenv::from_path(path).map(|()| path.clone()),
            None => dotenv::dotenv(),
        };
        match loaded {
            Ok(path) => tracing::debug!("Loaded env file {}", path.display()),
            Err(e) => tracing::debug!("No env file loaded: {}", e),
        }
    }
}

/// Pick provider keys out of `(name, value)` pairs; later pairs override earlier ones
pub fn collect_keys<I>(vars: I) -> HashMap<ProviderId, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();

    let mut keys = HashMap::new();
    for (provider, name) in KEY_VARS {
        if keys.contains_key(provider) {
            continue;
        }
        if let Some(value) = vars.get(*name) {
            keys.insert(*provider, value.trim().to_string());
        }
    }
    keys
}

#[async_trait]
impl ApiKeySource for EnvApiKeySource {
    async fn get_api_keys(&self) -> HashMap<ProviderId, String> {
        self.load_env_file();
        let keys = collect_keys(std::env::vars());

        let mut available: Vec<&str> = keys.keys().map(ProviderId::as_str).collect();
        available.sort_unstable();
        tracing::info!("API keys available for: [{}]", available.join(", "));

        keys
    }
}
