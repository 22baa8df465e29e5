//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::errors::SharedError;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identity used when the crates run inside a host that never initialised one
static EMBEDDED: ProcessId = ProcessId::Embedded;

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// The `orchestrator` CLI binary
    Orchestrator,
    /// The HTTP front end
    WebServer,
    /// Linked into another program (tests, embedding)
    Embedded,
}

impl ProcessId {
    /// Initialize the global process ID for the CLI
    pub fn init_orchestrator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Orchestrator)
    }

    /// Initialize the global process ID for the webserver
    pub fn init_webserver() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::WebServer)
    }

    /// Get the global process ID, falling back to `Embedded`
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&EMBEDDED)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Orchestrator => write!(f, "orchestrator"),
            ProcessId::WebServer => write!(f, "webserver"),
            ProcessId::Embedded => write!(f, "embedded"),
        }
    }
}

/// LLM providers available in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAI,
    Anthropic,
    Gemini,
    Random,
}

/// Token and sampling ceilings a provider accepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProviderLimits {
    pub max_output_tokens: u32,
    pub min_temperature: f32,
    pub max_temperature: f32,
}

impl ProviderLimits {
    /// Clamp requested sampling parameters into the accepted range
    pub fn clamp(&self, max_tokens: u32, temperature: f32) -> (u32, f32) {
        let max_tokens = max_tokens.clamp(1, self.max_output_tokens);
        let temperature = if temperature.is_nan() {
            self.min_temperature
        } else {
            temperature.clamp(self.min_temperature, self.max_temperature)
        };
        (max_tokens, temperature)
    }
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::OpenAI,
        ProviderId::Anthropic,
        ProviderId::Gemini,
        ProviderId::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
            ProviderId::Random => "random",
        }
    }

    /// Models accepted for this provider
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            ProviderId::OpenAI => &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"],
            ProviderId::Anthropic => &[
                "claude-3-5-sonnet-latest",
                "claude-3-5-haiku-latest",
                "claude-3-opus-latest",
            ],
            ProviderId::Gemini => &["gemini-1.5-pro", "gemini-1.5-flash", "gemini-2.0-flash"],
            ProviderId::Random => &["random"],
        }
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.models().contains(&model)
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "gpt-4o-mini",
            ProviderId::Anthropic => "claude-3-5-haiku-latest",
            ProviderId::Gemini => "gemini-1.5-flash",
            ProviderId::Random => "random",
        }
    }

    pub fn limits(&self) -> ProviderLimits {
        match self {
            ProviderId::OpenAI => ProviderLimits {
                max_output_tokens: 4096,
                min_temperature: 0.0,
                max_temperature: 2.0,
            },
            ProviderId::Anthropic => ProviderLimits {
                max_output_tokens: 4096,
                min_temperature: 0.0,
                max_temperature: 1.0,
            },
            ProviderId::Gemini => ProviderLimits {
                max_output_tokens: 8192,
                min_temperature: 0.0,
                max_temperature: 2.0,
            },
            ProviderId::Random => ProviderLimits {
                max_output_tokens: 1000,
                min_temperature: 0.0,
                max_temperature: 2.0,
            },
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAI),
            "anthropic" => Ok(ProviderId::Anthropic),
            "gemini" | "google" => Ok(ProviderId::Gemini),
            "random" => Ok(ProviderId::Random),
            _ => Err(SharedError::UnknownVariant {
                kind: "provider",
                value: s.to_string(),
            }),
        }
    }
}

/// Shape the model's answer is expected to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Text,
    Code,
    Json,
    List,
    Essay,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Text => "text",
            OutputType::Code => "code",
            OutputType::Json => "json",
            OutputType::List => "list",
            OutputType::Essay => "essay",
        }
    }

    /// Instruction that the response must be rendered in this output type.
    /// Plain text carries no directive.
    pub fn directive(&self) -> Option<&'static str> {
        match self {
            OutputType::Text => None,
            OutputType::Code => Some(
                "The response must be rendered as code, with the complete implementation in a single fenced code block.",
            ),
            OutputType::Json => Some(
                "The response must be rendered as valid JSON only, with no prose before or after the JSON document.",
            ),
            OutputType::List => Some(
                "The response must be rendered as a list, with one item per line and no extra commentary.",
            ),
            OutputType::Essay => Some(
                "The response must be rendered as an essay with an introduction, body paragraphs and a conclusion.",
            ),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputType::Text),
            "code" => Ok(OutputType::Code),
            "json" => Ok(OutputType::Json),
            "list" => Ok(OutputType::List),
            "essay" => Ok(OutputType::Essay),
            _ => Err(SharedError::UnknownVariant {
                kind: "output type",
                value: s.to_string(),
            }),
        }
    }
}

/// Which generation path a request takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMode {
    /// Heuristic-only rewrites, no provider calls
    Speed,
    /// Live rewrite and test calls against a provider
    #[default]
    Deep,
}

impl OptimizationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationMode::Speed => "speed",
            OptimizationMode::Deep => "deep",
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OptimizationMode {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "speed" => Ok(OptimizationMode::Speed),
            "deep" => Ok(OptimizationMode::Deep),
            _ => Err(SharedError::UnknownVariant {
                kind: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// API failure reasons for provider invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    /// Backend unreachable, misconfigured, or returned an unusable answer
    Unavailable(String),
    /// Model not offered by the provider
    InvalidModel(String),
    /// Provider asked us to slow down
    RateLimited,
    /// No answer within the call deadline
    Timeout,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::Unavailable(reason) => write!(f, "provider unavailable: {reason}"),
            ApiFailure::InvalidModel(model) => write!(f, "invalid model: {model}"),
            ApiFailure::RateLimited => write!(f, "provider rate limited"),
            ApiFailure::Timeout => write!(f, "provider timeout"),
        }
    }
}

impl std::error::Error for ApiFailure {}
