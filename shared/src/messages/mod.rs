//! Message types crossing the caller boundary
//!
//! Requests arrive as JSON from the UI layer, results go back the same way,
//! and ratings close the feedback loop for speed-mode runs.

pub mod feedback;
pub mod request;
pub mod result;

pub use feedback::{RatingOutcome, RatingRequest, RatingResponse, MAX_STARS, MIN_STARS};
pub use request::{OptimizationRequest, MAX_INFLUENCE_WEIGHT, MAX_VARIANTS, MIN_VARIANTS};
pub use result::{
    ErrorResponse, OptimizationResponse, OptimizationResult, OptimizationSummary, ScoreBreakdown, SyncStatus,
    Variant, VariantMetrics, BASELINE_SCORE, SPEED_MODE_PLACEHOLDER,
};
