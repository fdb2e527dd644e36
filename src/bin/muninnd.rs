//! muninnd: the Muninn daemon.
//!
//! Serves the fetch-through engine over HTTP: inbound paths are dispatched
//! to registered endpoints, cached responses are served while fresh, and
//! misses are fetched from the configured upstream.

use clap::Parser;

use muninn::server;
use muninn::server::config::Config;

/// Muninn caching XML API proxy daemon.
#[derive(Parser)]
#[command(name = "muninnd")]
#[command(version)]
#[command(about = "Muninn caching XML API proxy daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    server::serve(config).await?;

    Ok(())
}
