//! Append-only JSONL store
//!
//! Layout under the data directory:
//! - `prompts.jsonl`: one line per request
//! - `optimization_history.jsonl`: one line per variant
//! - `speed_optimizations.jsonl`: one line per speed-mode run
//! - `speed_ratings.jsonl`: rating events, folded into speed rows on read
//!
//! Rows are never rewritten. Malformed lines are skipped with a warning.
//! A run counts as stored once its prompt row exists; history and speed rows
//! without one are ignored on read and filled in on replay.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::{process_debug, process_warn, ProcessId};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::OrchestratorResult;
use crate::records::{HistoryRecord, PersistedOptimization, PromptRecord, SpeedOptimizationRecord};
use crate::traits::PromptStore;

pub const PROMPTS_FILE: &str = "prompts.jsonl";
pub const HISTORY_FILE: &str = "optimization_history.jsonl";
pub const SPEED_FILE: &str = "speed_optimizations.jsonl";
pub const RATINGS_FILE: &str = "speed_ratings.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RatingEvent {
    record_id: Uuid,
    stars: u8,
    rated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct JsonlStore {
    base_dir: PathBuf,
    /// Serialises writers so rating check-and-append is atomic
    write_lock: Mutex<()>,
}

impl JsonlStore {
    /// Open (creating if needed) a store rooted at `base_dir`
    pub async fn open(base_dir: impl Into<PathBuf>) -> OrchestratorResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).await?;
        process_debug!(ProcessId::current(), "📁 JSONL store at {}", base_dir.display());

        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn table_path(&self, file: &str) -> PathBuf {
        self.base_dir.join(file)
    }

    async fn append_lines(&self, file: &str, lines: &[String]) -> OrchestratorResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut handle = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.table_path(file))
            .await?;

        let mut buffer = lines.join("\n");
        buffer.push('\n');
        handle.write_all(buffer.as_bytes()).await?;
        handle.flush().await?;
        Ok(())
    }

    async fn read_rows<T: DeserializeOwned>(&self, file: &str) -> OrchestratorResult<Vec<T>> {
        let path = self.table_path(file);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    process_warn!(
                        ProcessId::current(),
                        "Skipping malformed line {} in {}: {}",
                        number + 1,
                        path.display(),
                        e
                    );
                }
            }
        }
        Ok(rows)
    }

    async fn committed_prompt_ids(&self) -> OrchestratorResult<HashSet<Uuid>> {
        let prompts: Vec<PromptRecord> = self.read_rows(PROMPTS_FILE).await?;
        Ok(prompts.into_iter().map(|row| row.id).collect())
    }

    /// Variants stored for one optimization, in rank order
    ///
    /// Empty until the run's prompt row is written.
    pub async fn history_for(&self, prompt_id: Uuid) -> OrchestratorResult<Vec<HistoryRecord>> {
        if !self.committed_prompt_ids().await?.contains(&prompt_id) {
            return Ok(Vec::new());
        }
        let mut seen = HashSet::new();
        let mut rows: Vec<HistoryRecord> = self
            .read_rows::<HistoryRecord>(HISTORY_FILE)
            .await?
            .into_iter()
            .filter(|row| row.prompt_id == prompt_id && seen.insert(row.id))
            .collect();
        rows.sort_by_key(|row| row.rank);
        Ok(rows)
    }

    /// First rating event per record wins
    async fn rating_for(&self, record_id: Uuid) -> OrchestratorResult<Option<RatingEvent>> {
        let events: Vec<RatingEvent> = self.read_rows(RATINGS_FILE).await?;
        Ok(events.into_iter().find(|event| event.record_id == record_id))
    }
}

fn to_lines<T: Serialize>(rows: &[T]) -> OrchestratorResult<Vec<String>> {
    rows.iter()
        .map(|row| serde_json::to_string(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl PromptStore for JsonlStore {
    async fn save_optimization(&self, record: &PersistedOptimization) -> OrchestratorResult<()> {
        let prompt_lines = to_lines(std::slice::from_ref(&record.prompt))?;

        let _guard = self.write_lock.lock().await;
        if self.committed_prompt_ids().await?.contains(&record.prompt.id) {
            process_debug!(ProcessId::current(), "Optimization {} already stored", record.prompt.id);
            return Ok(());
        }

        // A replay after a partial write only appends the rows that are missing
        let written_history: HashSet<Uuid> = self
            .read_rows::<HistoryRecord>(HISTORY_FILE)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect();
        let history: Vec<&HistoryRecord> = record
            .history
            .iter()
            .filter(|row| !written_history.contains(&row.id))
            .collect();

        let speed = match &record.speed {
            Some(speed) => {
                let rows: Vec<SpeedOptimizationRecord> = self.read_rows(SPEED_FILE).await?;
                if rows.iter().any(|row| row.id == speed.id) {
                    Vec::new()
                } else {
                    vec![speed]
                }
            }
            None => Vec::new(),
        };

        self.append_lines(HISTORY_FILE, &to_lines(&history)?).await?;
        self.append_lines(SPEED_FILE, &to_lines(&speed)?).await?;
        // Commit marker: rows for this prompt are invisible until this line lands
        self.append_lines(PROMPTS_FILE, &prompt_lines).await?;

        process_debug!(
            ProcessId::current(),
            "💾 Stored optimization {} ({} variants)",
            record.prompt.id,
            record.history.len()
        );
        Ok(())
    }

    async fn find_speed_record(&self, record_id: Uuid) -> OrchestratorResult<Option<SpeedOptimizationRecord>> {
        let rows: Vec<SpeedOptimizationRecord> = self.read_rows(SPEED_FILE).await?;
        let Some(mut row) = rows.into_iter().find(|row| row.id == record_id) else {
            return Ok(None);
        };
        if !self.committed_prompt_ids().await?.contains(&row.prompt_id) {
            return Ok(None);
        }

        if let Some(event) = self.rating_for(record_id).await? {
            row.rating = Some(event.stars);
            row.rated_at = Some(event.rated_at);
        }
        Ok(Some(row))
    }

    async fn set_speed_rating(&self, record_id: Uuid, stars: u8, rated_at: DateTime<Utc>) -> OrchestratorResult<bool> {
        let _guard = self.write_lock.lock().await;

        match self.find_speed_record(record_id).await? {
            Some(row) if row.rating.is_none() => {}
            _ => return Ok(false),
        }

        let event = RatingEvent {
            record_id,
            stars,
            rated_at,
        };
        self.append_lines(RATINGS_FILE, &to_lines(&[event])?).await?;
        Ok(true)
    }

    async fn recent_prompts(&self, user_id: &str, limit: usize) -> OrchestratorResult<Vec<PromptRecord>> {
        let mut prompts: Vec<PromptRecord> = self
            .read_rows::<PromptRecord>(PROMPTS_FILE)
            .await?
            .into_iter()
            .filter(|row| row.user_id == user_id)
            .collect();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        prompts.truncate(limit);
        Ok(prompts)
    }
}
