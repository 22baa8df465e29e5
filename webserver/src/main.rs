//! WebServer entry point
//!
//! Wires credentials, configuration and the JSONL store into one shared
//! orchestrator and serves it over HTTP until Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use orchestrator::{JsonlStore, Orchestrator, OptimizerConfig};
use providers::{ApiKeySource, EnvApiKeySource, ProviderRegistry};
use shared::{logging, process_debug, process_info, ProcessId};
use tokio::signal;

use webserver::WebServer;

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "HTTP API for the prompt optimizer")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Data directory for the JSONL store (overrides OPTIMIZER_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Explicit env file with provider API keys
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Seconds between replays of unsynced writes
    #[arg(long, default_value = "60")]
    retry_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    ProcessId::init_webserver();
    logging::init_tracing(Some(&args.log_level));
    logging::log_startup(ProcessId::current(), "prompt optimizer webserver");

    let _ = dotenv::dotenv();

    let mut config = OptimizerConfig::from_env();
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    process_debug!(ProcessId::current(), "Configuration: {:?}", config);

    let key_source = match &args.env_file {
        Some(path) => EnvApiKeySource::with_env_file(path),
        None => EnvApiKeySource::new(),
    };
    let api_keys = key_source.get_api_keys().await;
    let registry = ProviderRegistry::from_api_keys(&api_keys, config.call_timeout);

    let store = JsonlStore::open(&config.data_dir)
        .await
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let orchestrator = Arc::new(Orchestrator::new(registry, store, config));

    let server = WebServer::new(orchestrator)
        .with_retry_interval(Duration::from_secs(args.retry_interval_secs.max(1)));

    server
        .run(args.bind, async {
            if let Err(e) = signal::ctrl_c().await {
                logging::log_error(ProcessId::current(), "Signal handling", &e);
                std::future::pending::<()>().await;
            }
            process_info!(ProcessId::current(), "🛑 Ctrl+C received, shutting down");
        })
        .await?;

    process_info!(ProcessId::current(), "Webserver stopped");
    Ok(())
}
