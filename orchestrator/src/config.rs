//! Optimizer runtime configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shared::{process_warn, ProcessId};

pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_PATTERNS: usize = 8;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_MAX_UNSYNCED: usize = 256;

/// Tunables for generation, retries, insights and storage
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Upper bound on concurrent deep-mode strategy tasks
    pub max_workers: usize,
    /// Deadline applied to every single provider call
    pub call_timeout: Duration,
    /// Retry a failed provider call once before skipping the strategy
    pub retry_failed_calls: bool,
    /// Insight phrases kept per user and strategy
    pub max_patterns_per_strategy: usize,
    /// Failed writes held in memory for retry; the oldest is dropped past this
    pub max_unsynced: usize,
    pub data_dir: PathBuf,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            retry_failed_calls: true,
            max_patterns_per_strategy: DEFAULT_MAX_PATTERNS,
            max_unsynced: DEFAULT_MAX_UNSYNCED,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl OptimizerConfig {
    /// Read overrides from the process environment (after `.env` loading)
    ///
    /// Environment variables:
    /// - `OPTIMIZER_MAX_WORKERS`
    /// - `OPTIMIZER_CALL_TIMEOUT_SECS`
    /// - `OPTIMIZER_RETRY_FAILED_CALLS` (true/false/1/0)
    /// - `OPTIMIZER_MAX_PATTERNS`
    /// - `OPTIMIZER_MAX_UNSYNCED`
    /// - `OPTIMIZER_DATA_DIR`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injectable variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workers) = parse_var::<usize, _>(&lookup, "OPTIMIZER_MAX_WORKERS") {
            config.max_workers = workers.max(1);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "OPTIMIZER_CALL_TIMEOUT_SECS") {
            config.call_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(raw) = lookup("OPTIMIZER_RETRY_FAILED_CALLS") {
            match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.retry_failed_calls = true,
                "0" | "false" | "no" | "off" => config.retry_failed_calls = false,
                other => {
                    process_warn!(
                        ProcessId::current(),
                        "Ignoring OPTIMIZER_RETRY_FAILED_CALLS={}, expected true or false",
                        other
                    );
                }
            }
        }
        if let Some(cap) = parse_var::<usize, _>(&lookup, "OPTIMIZER_MAX_PATTERNS") {
            config.max_patterns_per_strategy = cap;
        }
        if let Some(cap) = parse_var::<usize, _>(&lookup, "OPTIMIZER_MAX_UNSYNCED") {
            config.max_unsynced = cap.max(1);
        }
        if let Some(dir) = lookup("OPTIMIZER_DATA_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }

        config
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_retry(mut self, retry_failed_calls: bool) -> Self {
        self.retry_failed_calls = retry_failed_calls;
        self
    }

    pub fn with_max_unsynced(mut self, max_unsynced: usize) -> Self {
        self.max_unsynced = max_unsynced.max(1);
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            process_warn!(ProcessId::current(), "Ignoring {}={}, not a valid number", name, raw);
            None
        }
    }
}
