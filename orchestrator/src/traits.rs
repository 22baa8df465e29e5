//! Trait definitions with mockall annotations for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::OrchestratorResult;
use crate::records::{PersistedOptimization, PromptRecord, SpeedOptimizationRecord};

/// Durable storage for completed optimizations and their ratings
///
/// Rows are written once. The only later change is the rating of a speed
/// record, which is set at most once.
#[mockall::automock]
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Write the prompt row, every history row and the speed row (if any)
    async fn save_optimization(&self, record: &PersistedOptimization) -> OrchestratorResult<()>;

    async fn find_speed_record(&self, record_id: Uuid) -> OrchestratorResult<Option<SpeedOptimizationRecord>>;

    /// Store a rating; `Ok(false)` when the record already carried one or is not stored
    async fn set_speed_rating(&self, record_id: Uuid, stars: u8, rated_at: DateTime<Utc>) -> OrchestratorResult<bool>;

    /// A user's prompts, newest first
    async fn recent_prompts(&self, user_id: &str, limit: usize) -> OrchestratorResult<Vec<PromptRecord>>;
}
