//! Run state machine for a single optimization

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{process_debug, ProcessId};
use uuid::Uuid;

use crate::error::{OrchestratorError, OrchestratorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationPhase {
    Received,
    GeneratingVariants,
    Scoring,
    Selecting,
    Persisting,
    Completed,
    Failed,
}

impl OptimizationPhase {
    /// Legal successors; `Failed` is only reachable while generating
    pub fn can_transition_to(self, next: OptimizationPhase) -> bool {
        use OptimizationPhase::*;
        matches!(
            (self, next),
            (Received, GeneratingVariants)
                | (GeneratingVariants, Scoring)
                | (GeneratingVariants, Failed)
                | (Scoring, Selecting)
                | (Selecting, Persisting)
                | (Persisting, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OptimizationPhase::Completed | OptimizationPhase::Failed)
    }
}

impl fmt::Display for OptimizationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizationPhase::Received => "received",
            OptimizationPhase::GeneratingVariants => "generating_variants",
            OptimizationPhase::Scoring => "scoring",
            OptimizationPhase::Selecting => "selecting",
            OptimizationPhase::Persisting => "persisting",
            OptimizationPhase::Completed => "completed",
            OptimizationPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseEntry {
    pub phase: OptimizationPhase,
    pub entered_at: DateTime<Utc>,
}

/// Tracks one run through its phases
#[derive(Debug)]
pub struct RunTracker {
    request_id: Uuid,
    current: OptimizationPhase,
    log: Vec<PhaseEntry>,
    started: Instant,
}

impl RunTracker {
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            current: OptimizationPhase::Received,
            log: vec![PhaseEntry {
                phase: OptimizationPhase::Received,
                entered_at: Utc::now(),
            }],
            started: Instant::now(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn phase(&self) -> OptimizationPhase {
        self.current
    }

    pub fn history(&self) -> &[PhaseEntry] {
        &self.log
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn advance(&mut self, next: OptimizationPhase) -> OrchestratorResult<()> {
        if !self.current.can_transition_to(next) {
            return Err(OrchestratorError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }

        process_debug!(
            ProcessId::current(),
            "🔄 Run {}: {} -> {}",
            self.request_id,
            self.current,
            next
        );
        self.current = next;
        self.log.push(PhaseEntry {
            phase: next,
            entered_at: Utc::now(),
        });
        Ok(())
    }
}
