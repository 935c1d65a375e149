//! Titanic Survival - Main Entry Point
//!
//! Serves survival predictions by default; `evaluate` trains once and reports.

use clap::Parser;
use titanic_survival::cli::{cmd_evaluate, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "titanic_survival=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port, data }) => {
            cmd_serve(host, port, data).await?;
        }
        Some(Commands::Evaluate { data }) => {
            cmd_evaluate(data.as_deref())?;
        }
        None => {
            cmd_serve(None, None, None).await?;
        }
    }

    Ok(())
}
