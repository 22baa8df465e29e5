//! In-process store for tests and embedding

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::OrchestratorResult;
use crate::records::{HistoryRecord, PersistedOptimization, PromptRecord, SpeedOptimizationRecord};
use crate::traits::PromptStore;

#[derive(Debug, Default)]
struct Tables {
    prompts: Vec<PromptRecord>,
    history: Vec<HistoryRecord>,
    speed: Vec<SpeedOptimizationRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// History rows written for one request, in rank order
    pub fn history_for(&self, prompt_id: Uuid) -> Vec<HistoryRecord> {
        let mut rows: Vec<HistoryRecord> = self
            .lock()
            .history
            .iter()
            .filter(|row| row.prompt_id == prompt_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.rank);
        rows
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PromptStore for MemoryStore {
    async fn save_optimization(&self, record: &PersistedOptimization) -> OrchestratorResult<()> {
        let mut tables = self.lock();
        tables.prompts.push(record.prompt.clone());
        tables.history.extend(record.history.iter().cloned());
        if let Some(speed) = &record.speed {
            tables.speed.push(speed.clone());
        }
        Ok(())
    }

    async fn find_speed_record(&self, record_id: Uuid) -> OrchestratorResult<Option<SpeedOptimizationRecord>> {
        Ok(self.lock().speed.iter().find(|row| row.id == record_id).cloned())
    }

    async fn set_speed_rating(&self, record_id: Uuid, stars: u8, rated_at: DateTime<Utc>) -> OrchestratorResult<bool> {
        let mut tables = self.lock();
        match tables.speed.iter_mut().find(|row| row.id == record_id) {
            Some(row) if row.rating.is_none() => {
                row.rating = Some(stars);
                row.rated_at = Some(rated_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn recent_prompts(&self, user_id: &str, limit: usize) -> OrchestratorResult<Vec<PromptRecord>> {
        let mut prompts: Vec<PromptRecord> = self
            .lock()
            .prompts
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        prompts.truncate(limit);
        Ok(prompts)
    }
}
