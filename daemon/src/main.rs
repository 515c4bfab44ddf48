//! Dareboard daemon: loads configuration, opens the store and serves the
//! claim API until shutdown.

mod config;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dareboard_chain::RpcFactSource;
use dareboard_rpc::{ApiMetrics, AppState, RpcServer};
use dareboard_store_lmdb::LmdbEnvironment;
use dareboard_types::SystemClock;
use dareboard_utils::{init_logging, LogFormat};
use dareboard_verification::{ModerationGate, SubjectLocks, VerificationEngine};

use crate::config::DaemonConfig;
use crate::shutdown::ShutdownController;

#[derive(Parser)]
#[command(name = "dareboard-daemon", about = "Dareboard claim verification daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "DAREBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the LMDB environment.
    #[arg(long, env = "DAREBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP API port.
    #[arg(long, env = "DAREBOARD_RPC_PORT")]
    rpc_port: Option<u16>,

    /// JSON-RPC endpoint serving chain facts.
    #[arg(long, env = "DAREBOARD_CHAIN_RPC_URL")]
    chain_rpc_url: Option<String>,

    /// Deadline for one fact fetch, in milliseconds.
    #[arg(long, env = "DAREBOARD_FACT_TIMEOUT_MS")]
    fact_timeout_ms: Option<u64>,

    /// Minimum votes for a tally leader to count as the winner.
    #[arg(long, env = "DAREBOARD_MIN_WINNING_VOTES")]
    min_winning_votes: Option<u64>,

    /// Allow or forbid admins re-deciding terminal records.
    #[arg(long, env = "DAREBOARD_ALLOW_TERMINAL_OVERRIDE")]
    allow_terminal_override: Option<bool>,

    /// Moderator allowlist (comma-separated).
    #[arg(long, env = "DAREBOARD_ADMINS", value_delimiter = ',')]
    admins: Vec<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DAREBOARD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DAREBOARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Serve Prometheus metrics at /metrics.
    #[arg(long, env = "DAREBOARD_ENABLE_METRICS")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, clap::Subcommand)]
enum Command {
    /// Run the daemon.
    Run,
    /// Print the effective configuration as TOML and exit.
    Config,
}

impl Cli {
    /// Layer flags over the file configuration.
    fn apply(self, base: DaemonConfig) -> DaemonConfig {
        DaemonConfig {
            data_dir: self.data_dir.unwrap_or(base.data_dir),
            rpc_port: self.rpc_port.unwrap_or(base.rpc_port),
            chain_rpc_url: self.chain_rpc_url.unwrap_or(base.chain_rpc_url),
            fact_timeout_ms: self.fact_timeout_ms.unwrap_or(base.fact_timeout_ms),
            min_winning_votes: self.min_winning_votes.unwrap_or(base.min_winning_votes),
            allow_terminal_override: self
                .allow_terminal_override
                .unwrap_or(base.allow_terminal_override),
            admins: if self.admins.is_empty() {
                base.admins
            } else {
                self.admins
            },
            log_format: self.log_format.unwrap_or(base.log_format),
            log_level: self.log_level.unwrap_or(base.log_level),
            enable_metrics: self.metrics || base.enable_metrics,
            lmdb_map_size: base.lmdb_map_size,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command;

    let base = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    let config = cli.apply(base);

    match command {
        Command::Run => run(config).await,
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    init_logging(config.log_format, &config.log_level)?;
    let params = config.verification_params()?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        rpc_port = config.rpc_port,
        chain = %config.chain_rpc_url,
        terminal_override = params.allow_terminal_override,
        admins = params.admins.len(),
        "starting Dareboard daemon"
    );

    let env = LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
    let facts = Arc::new(RpcFactSource::new(&config.chain_rpc_url, params.fact_timeout)?);
    let clock = Arc::new(SystemClock);
    let locks = Arc::new(SubjectLocks::new());

    let engine = Arc::new(VerificationEngine::new(
        env.stores(),
        facts,
        clock.clone(),
        locks.clone(),
        params.clone(),
    ));
    let gate = Arc::new(ModerationGate::new(env.stores(), clock.clone(), locks, params));
    let metrics = if config.enable_metrics {
        Some(Arc::new(ApiMetrics::new()?))
    } else {
        None
    };

    let state = AppState {
        engine,
        gate,
        clock,
        metrics,
    };

    let shutdown = Arc::new(ShutdownController::new());
    let server = RpcServer::new(config.rpc_port, state);
    let server_task = tokio::spawn(server.start(shutdown.subscribe()));

    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if let Err(e) = shutdown.wait_for_signal().await {
                tracing::error!(error = %e, "signal handler failed, shutting down");
                shutdown.shutdown();
            }
        });
    }

    server_task.await??;
    tracing::info!("Dareboard daemon exited cleanly");
    Ok(())
}
