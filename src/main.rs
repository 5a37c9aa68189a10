use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use logsieve_http::LogServer;
use logsieve_source::{ContainerLogSource, DockerCli};

mod config;
mod logging;

use config::{CliOverrides, DEFAULT_CONFIG_PATH, ResolvedConfig, load_config_file};

/// Logsieve - query HTTP access logs pulled from a short-lived log container
#[derive(Parser, Debug)]
#[command(name = "logsieve")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file (ignored if missing)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Address to serve the query API on
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Image reference of the log-producing container
    #[arg(long)]
    image: Option<String>,

    /// Container CLI used to start and stop the log source
    #[arg(long)]
    runtime: Option<String>,

    /// File diagnostics are appended to
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind: self.bind,
            image: self.image.clone(),
            runtime: self.runtime.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let file = load_config_file(&args.config).context("Failed to load configuration")?;
    let config = ResolvedConfig::resolve(file, args.overrides());

    logging::init(&config.log_file).context("Failed to initialize logging")?;

    info!(
        bind = %config.bind,
        image = %config.source.image,
        runtime = %config.runtime,
        "starting logsieve"
    );

    let runtime = Arc::new(DockerCli::new(config.runtime.clone()));
    let source = Arc::new(ContainerLogSource::new(runtime, config.source.clone()));
    let server = LogServer::new(source);

    server
        .serve_with_shutdown(config.bind, shutdown_signal())
        .await
        .context("Log query server failed")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl-C, shutting down");
    }
}
