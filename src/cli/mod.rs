//! Command-line interface for serving and evaluating the survival model.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use crate::features::FEATURES;
use crate::server::{run_server, ServerConfig};
use crate::training::{Trainer, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "titanic-survival")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Titanic survival scoring service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train on startup and serve POST /predict
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Training CSV (Kaggle Titanic train.csv schema)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Train once and print holdout metrics and coefficients
    Evaluate {
        /// Training CSV (Kaggle Titanic train.csv schema)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

/// Start the server; flags override the environment-derived defaults
pub async fn cmd_serve(host: Option<String>, port: Option<u16>, data: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data) = data {
        config.training_data = data;
    }

    println!();
    println!("  {}", "Titanic Survival".white().bold());
    println!("  {}", dim(&format!("v{}", env!("CARGO_PKG_VERSION"))));
    println!("  {}", kv("Predict", &format!("POST http://{}:{}/predict", config.host, config.port)));
    println!("  {}", kv("Health ", &format!("http://{}:{}/health", config.host, config.port)));
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    run_server(config).await
}

/// Train on `data` and print how the model did on the holdout rows
pub fn cmd_evaluate(data: Option<&Path>) -> anyhow::Result<()> {
    let path = data
        .map(Path::to_path_buf)
        .unwrap_or_else(ServerConfig::resolve_training_data);

    println!("  {} {}", accent("›"), format!("Training on {}", path.display()));
    let predictor = Trainer::new(TrainingConfig::default()).train_from_csv(&path)?;
    let description = predictor.describe();
    let training = &description.training;

    section("Holdout");
    println!("  {}", kv("rows      ", &format!("{} train / {} validation", training.n_train, training.n_validation)));
    println!("  {}", kv("train acc ", &format!("{:.4}", training.train_accuracy)));
    println!("  {}", kv("valid acc ", &format!("{:.4}", training.validation_accuracy)));
    let status = if training.converged { ok("converged") } else { "not converged".yellow() };
    println!("  {}", kv("iterations", &format!("{} ({})", training.n_iter, status)));

    section("Coefficients");
    for feature in FEATURES {
        let weight = description.coefficients.get(feature).copied().unwrap_or(0.0);
        println!("  {}", kv(&format!("{:<10}", feature), &format!("{:+.6}", weight)));
    }
    println!("  {}", kv(&format!("{:<10}", "intercept"), &format!("{:+.6}", description.intercept)));

    section("Encoders");
    for (column, classes) in &description.encoders {
        println!("  {}", kv(&format!("{:<10}", column), &classes.join(", ")));
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from(["titanic-survival", "serve", "--port", "9000", "--data", "x.csv"]).unwrap();
        match cli.command {
            Some(Commands::Serve { host, port, data }) => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
                assert_eq!(data, Some(PathBuf::from("x.csv")));
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["titanic-survival"]).unwrap();
        assert!(cli.command.is_none());
    }
}
