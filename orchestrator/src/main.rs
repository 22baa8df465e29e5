//! Command line front end for the optimization engine
//!
//! Runs single optimizations, submits ratings and lists history against the
//! JSONL store under the configured data directory.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tokio::signal;

use orchestrator::{catalog, JsonlStore, Orchestrator, OptimizerConfig};
use providers::{ApiKeySource, EnvApiKeySource, ProviderRegistry};
use shared::{
    logging, process_debug, process_info, OptimizationMode, OptimizationRequest, OptimizationResponse, OutputType,
    ProcessId, ProviderId, RatingRequest,
};

/// Prompt optimizer: rewrite, score and select better prompts
#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Generates, scores and selects optimized prompt variants")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Data directory for the JSONL store (overrides OPTIMIZER_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// User the run is recorded under
    #[arg(long, default_value = "local", global = true)]
    pub user: String,

    /// Explicit env file with provider API keys
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Optimize one prompt
    Optimize(OptimizeArgs),
    /// Rate a speed-mode result (1-5 stars)
    Rate {
        #[arg(long)]
        record_id: uuid::Uuid,
        #[arg(long)]
        stars: u8,
    },
    /// List recent optimizations for the user
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// List the strategy catalog
    Strategies,
}

#[derive(Args)]
pub struct OptimizeArgs {
    /// Prompt text
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the prompt from a file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Provider (openai, anthropic, gemini, random)
    #[arg(long, default_value = "random")]
    pub provider: ProviderId,

    /// Model; defaults to the provider's default model
    #[arg(long)]
    pub model: Option<String>,

    /// Expected output (text, code, json, list, essay)
    #[arg(long, default_value = "text")]
    pub output_type: OutputType,

    /// Number of variants to generate (1-10)
    #[arg(long, default_value = "3")]
    pub variants: u8,

    /// speed (heuristic, no provider calls) or deep (live provider calls)
    #[arg(long, default_value = "deep")]
    pub mode: OptimizationMode,

    /// What the prompt will be used for
    #[arg(long)]
    pub task: Option<String>,

    /// Style text to steer the rewrite
    #[arg(long)]
    pub influence_text: Option<String>,

    /// Influence strength, 0-100
    #[arg(long, default_value = "0")]
    pub influence_weight: u8,

    #[arg(long, default_value = "1000")]
    pub max_tokens: u32,

    #[arg(long, default_value = "0.7")]
    pub temperature: f32,

    /// Concurrent deep-mode workers (overrides OPTIMIZER_MAX_WORKERS)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-call deadline in seconds (overrides OPTIMIZER_CALL_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Skip a strategy on its first failed call
    #[arg(long)]
    pub no_retry: bool,

    /// Print the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl OptimizeArgs {
    async fn prompt_text(&self) -> anyhow::Result<String> {
        match (&self.prompt, &self.prompt_file) {
            (Some(prompt), _) => Ok(prompt.clone()),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading prompt file {}", path.display())),
            (None, None) => bail!("either --prompt or --prompt-file is required"),
        }
    }

    async fn to_request(&self) -> anyhow::Result<OptimizationRequest> {
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string());

        let mut request = OptimizationRequest::new(self.prompt_text().await?, self.provider, model, self.output_type)
            .with_mode(self.mode)
            .with_variant_count(self.variants)
            .with_sampling(self.max_tokens, self.temperature);
        if let Some(task) = &self.task {
            request = request.with_task_description(task.clone());
        }
        if let Some(text) = &self.influence_text {
            request = request.with_influence(text.clone(), self.influence_weight);
        }
        Ok(request)
    }

    fn apply_overrides(&self, mut config: OptimizerConfig) -> OptimizerConfig {
        if let Some(workers) = self.workers {
            config = config.with_max_workers(workers.max(1));
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_call_timeout(Duration::from_secs(secs.max(1)));
        }
        if self.no_retry {
            config = config.with_retry(false);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    ProcessId::init_orchestrator();
    logging::init_tracing(Some(&cli.log_level));
    logging::log_startup(ProcessId::current(), "prompt optimizer");

    // Settings may live in .env alongside the API keys
    let _ = dotenv::dotenv();

    let mut config = OptimizerConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    if let Command::Optimize(args) = &cli.command {
        config = args.apply_overrides(config);
    }
    process_debug!(ProcessId::current(), "Configuration: {:?}", config);

    match cli.command {
        Command::Strategies => {
            for strategy in catalog() {
                println!(
                    "{:<12} {:>4.0}%  {}",
                    strategy.name,
                    strategy.weight * 100.0,
                    strategy.description
                );
            }
            Ok(())
        }
        command => {
            let key_source = match &cli.env_file {
                Some(path) => EnvApiKeySource::with_env_file(path),
                None => EnvApiKeySource::new(),
            };
            let api_keys = key_source.get_api_keys().await;
            let registry = ProviderRegistry::from_api_keys(&api_keys, config.call_timeout);
            let store = JsonlStore::open(&config.data_dir)
                .await
                .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
            let orchestrator = Orchestrator::new(registry, store, config);

            run_command(&orchestrator, &cli.user, command).await
        }
    }
}

async fn run_command(orchestrator: &Orchestrator<JsonlStore>, user: &str, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Optimize(args) => {
            let request = args.to_request().await?;
            let cancel = async {
                if signal::ctrl_c().await.is_ok() {
                    process_info!(ProcessId::current(), "🛑 Ctrl+C received, cancelling");
                } else {
                    std::future::pending::<()>().await;
                }
            };

            let result = orchestrator.optimize_until(user, request, cancel).await?;
            let response = OptimizationResponse::from(&result);

            if args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_summary(&response);
            }
            Ok(())
        }
        Command::Rate { record_id, stars } => {
            let outcome = orchestrator
                .submit_rating(user, RatingRequest { record_id, stars })
                .await?;
            println!("{record_id}: {}", serde_json::to_string(&outcome)?.trim_matches('"'));
            Ok(())
        }
        Command::History { limit } => {
            for record in orchestrator.history(user, limit).await? {
                println!(
                    "{}  {}  {:<5} {:.3} {:<12} {}",
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    record.id,
                    record.mode,
                    record.best_score,
                    record.best_strategy,
                    first_line(&record.original_prompt)
                );
            }
            Ok(())
        }
        Command::Strategies => Ok(()),
    }
}

fn print_summary(response: &OptimizationResponse) {
    let summary = &response.summary;
    println!(
        "Best strategy: {} (score {:.3}, improvement {:+.3})",
        summary.best_strategy_name, response.best_variant.score, summary.improvement_score
    );
    println!("Variants: {} in {}ms", summary.variant_count, summary.processing_time_ms);
    if !summary.skipped_strategies.is_empty() {
        println!("Skipped: {}", summary.skipped_strategies.join(", "));
    }
    if let Some(record_id) = response.speed_record_id {
        println!("Rate with: orchestrator rate --record-id {record_id} --stars <1-5>");
    }
    println!("\n{}", response.best_optimized_prompt);
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
