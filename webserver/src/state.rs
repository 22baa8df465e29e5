//! Shared handler state

use std::sync::Arc;
use std::time::Instant;

use orchestrator::{Orchestrator, PromptStore};

/// State handed to every handler; cheap to clone
pub struct AppState<S>
where
    S: PromptStore + 'static,
{
    pub orchestrator: Arc<Orchestrator<S>>,
    pub started_at: Instant,
}

impl<S> AppState<S>
where
    S: PromptStore + 'static,
{
    pub fn new(orchestrator: Arc<Orchestrator<S>>) -> Self {
        Self {
            orchestrator,
            started_at: Instant::now(),
        }
    }
}

impl<S> Clone for AppState<S>
where
    S: PromptStore + 'static,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            started_at: self.started_at,
        }
    }
}
