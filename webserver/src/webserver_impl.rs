//! Main webserver implementation
//!
//! Serves the API router and replays unsynced writes in the background until
//! the shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use orchestrator::{Orchestrator, PromptStore};
use shared::{process_info, process_warn, ProcessId};

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;
use crate::web;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

pub struct WebServer<S>
where
    S: PromptStore + 'static,
{
    orchestrator: Arc<Orchestrator<S>>,
    retry_interval: Duration,
}

impl<S> WebServer<S>
where
    S: PromptStore + 'static,
{
    pub fn new(orchestrator: Arc<Orchestrator<S>>) -> Self {
        Self {
            orchestrator,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    /// How often queued writes are replayed
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn router(&self) -> axum::Router {
        web::router(AppState::new(Arc::clone(&self.orchestrator)))
    }

    /// Bind `address` and serve until `shutdown` resolves
    pub async fn run<F>(&self, address: SocketAddr, shutdown: F) -> WebServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|source| WebServerError::BindFailed {
                address: address.to_string(),
                source,
            })?;
        process_info!(ProcessId::current(), "🌐 Listening on http://{}", address);

        let retry_task = tokio::spawn(retry_loop(Arc::clone(&self.orchestrator), self.retry_interval));

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        retry_task.abort();
        let pending = self.orchestrator.unsynced_count().await;
        if pending > 0 {
            process_warn!(
                ProcessId::current(),
                "Shutting down with {} unsynced optimization(s) not persisted",
                pending
            );
        }

        served.map_err(WebServerError::ServeFailed)
    }
}

async fn retry_loop<S>(orchestrator: Arc<Orchestrator<S>>, interval: Duration)
where
    S: PromptStore + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    // First tick fires immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if orchestrator.unsynced_count().await == 0 {
            continue;
        }
        let synced = orchestrator.retry_unsynced().await;
        if synced > 0 {
            process_info!(ProcessId::current(), "💾 Replayed {} unsynced optimization(s)", synced);
        }
    }
}
