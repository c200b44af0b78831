use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod api;
mod config;
mod events;

use config::ServerConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "vetta")]
#[command(about = "Input validation service: REST, SSE and MCP transports", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "VETTA_CONFIG", default_value = "vetta.toml")]
    config: PathBuf,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long, env = "VETTA_PORT")]
    port: Option<u16>,

    /// Host to bind to (overrides the configuration file)
    #[arg(long, env = "VETTA_HOST")]
    host: Option<String>,

    /// Log output format
    #[arg(long, env = "VETTA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vetta=info,tower_http=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_format);

    tracing::info!("Starting Vetta validation server");

    // Load configuration
    let mut config = ServerConfig::load(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    api::serve(config).await?;

    Ok(())
}
