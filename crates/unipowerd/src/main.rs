use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unipower_config::Config;
use unipowerd::{router, AppState};

/// Header-addressed JSON-RPC power-control gateway for UniFi switches.
#[derive(Debug, Parser)]
#[command(name = "unipowerd", version)]
struct Cli {
    /// Configuration file.
    #[arg(short = 'c', long, default_value = "unipower.toml")]
    config: PathBuf,

    /// Address to listen on (overrides the config file).
    #[arg(short = 'a', long)]
    address: Option<String>,

    /// Port to listen on (overrides the config file).
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    if let Some(address) = cli.address {
        config.listen.address = address;
    }
    if let Some(port) = cli.port {
        config.listen.port = port;
    }

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let addr = format!("{}:{}", config.listen.address, config.listen.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(backend = config.mode.as_str(), "listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Graceful shutdown on ctrl-c; in-flight backend calls finish first.
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {err}");
    }
}
