//! Prompt optimization engine
//!
//! Takes a user prompt, produces rewritten candidates through named
//! strategies (live provider calls in deep mode, deterministic transforms in
//! speed mode), scores them with fixed heuristics and keeps the best one.

pub mod config;
pub mod core;
pub mod error;
pub mod optimization;
pub mod orchestrator;
pub mod records;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::OptimizerConfig;
pub use core::{FeedbackEffect, InsightCache, OptimizationPhase, RunTracker};
pub use error::{OrchestratorError, OrchestratorResult};
pub use optimization::{catalog, Strategy};
pub use orchestrator::Orchestrator;
pub use records::{HistoryRecord, PersistedOptimization, PromptRecord, SpeedOptimizationRecord};
pub use services::{JsonlStore, MemoryStore};
pub use traits::PromptStore;
