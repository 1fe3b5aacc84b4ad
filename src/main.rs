use anyhow::Context;
use clap::Parser;
use fasta_combine::app::config::parse_duration;
use fasta_combine::app::{init_logging, AppConfig, CliOverrides};
use fasta_combine::fetch::HttpFetcher;
use fasta_combine::server::{self, AppState};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Join sequence and metadata JSON documents into FASTA over HTTP
#[derive(Parser)]
#[command(name = "fasta-combine", version)]
#[command(about = "Serve FASTA exports built from sequence and metadata JSON", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Address to bind (default: 0.0.0.0)
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Port to listen on (default: 3000)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Timeout for each upstream fetch, e.g. "30s" (default: 30s)
    #[arg(long, value_parser = parse_timeout)]
    request_timeout: Option<Duration>,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(
        cli.config.as_deref(),
        CliOverrides {
            verbose: cli.verbose,
            bind: cli.bind,
            port: cli.port,
            request_timeout: cli.request_timeout,
        },
    )?;
    init_logging(&config);

    let fetcher = HttpFetcher::new(config.request_timeout)
        .context("Failed to create HTTP client")?;
    let state = AppState::new(Arc::new(fetcher), config.export.clone());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    server::serve(listener, state).await?;
    Ok(())
}
