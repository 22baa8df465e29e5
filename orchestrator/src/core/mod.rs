//! Core run state and per-user insights
//!
//! Pure in-memory logic with no I/O.

pub mod insights;
pub mod state;

pub use insights::{FeedbackEffect, InsightCache};
pub use state::{OptimizationPhase, PhaseEntry, RunTracker};
