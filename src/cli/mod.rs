//! Command-line interface
//!
//! Training commands fit and save the artifacts; `serve` starts the
//! prediction server over them.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::server::{run_server, ServerConfig};
use crate::training::{train_price, train_revenue, TrainReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn print_report(report: &TrainReport) {
    let coefficients: Vec<String> = report
        .coefficients
        .iter()
        .map(|c| format!("{:.6}", c))
        .collect();

    println!();
    println!("  {}", report.name.white().bold());
    println!("  {:<16} {}", muted("Rows"), report.n_samples.to_string().white());
    println!("  {:<16} {}", muted("R²"), format!("{:.4}", report.r2).white().bold());
    println!("  {:<16} [{}]", muted("Coefficients"), coefficients.join(", "));
    println!("  {:<16} {:.6}", muted("Intercept"), report.intercept);
    println!("  {:<16} {}", muted("Saved to"), report.path.display());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "phone-forecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve revenue and price regression models")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the global and India revenue models
    TrainRevenue {
        /// Revenue history CSV
        #[arg(short, long, default_value = "revdata.csv")]
        data: PathBuf,

        /// Directory the model files are written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Fit the variant encoder and the price model
    TrainPrice {
        /// Price history CSV
        #[arg(short, long, default_value = "pricedata.csv")]
        data: PathBuf,

        /// Directory the model files are written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Start the prediction server
    Serve {
        /// Server port (default: API_PORT or 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host (default: API_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Directory holding the trained models (default: MODELS_DIR or .)
        #[arg(short, long)]
        models_dir: Option<String>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train_revenue(data: &Path, out: &Path) -> anyhow::Result<()> {
    section("Train revenue models");

    step_run(&format!("Fitting {}", data.display().to_string().cyan()));
    let start = Instant::now();
    let reports = train_revenue(data, out)?;
    step_done(&format!("{:?}", start.elapsed()));

    reports.iter().for_each(print_report);
    println!();
    Ok(())
}

pub fn cmd_train_price(data: &Path, out: &Path) -> anyhow::Result<()> {
    section("Train price model");

    step_run(&format!("Fitting {}", data.display().to_string().cyan()));
    let start = Instant::now();
    let reports = train_price(data, out)?;
    step_done(&format!("{:?}", start.elapsed()));

    reports.iter().for_each(print_report);
    println!();
    Ok(())
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    models_dir: Option<String>,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(models_dir) = models_dir {
        config.models_dir = models_dir;
    }

    section("Serve");
    println!("  {:<16} {}", muted("Address"), format!("http://{}:{}", config.host, config.port).white());
    println!("  {:<16} {}", muted("Models"), config.models_dir.white());
    println!();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_revenue_defaults() {
        let cli = Cli::try_parse_from(["phone-forecast", "train-revenue"]).unwrap();
        match cli.command {
            Commands::TrainRevenue { data, out } => {
                assert_eq!(data, PathBuf::from("revdata.csv"));
                assert_eq!(out, PathBuf::from("."));
            }
            _ => panic!("expected train-revenue"),
        }
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["phone-forecast", "serve", "--port", "8081", "--models-dir", "/srv/models"])
            .unwrap();
        match cli.command {
            Commands::Serve { port, host, models_dir } => {
                assert_eq!(port, Some(8081));
                assert_eq!(host, None);
                assert_eq!(models_dir.as_deref(), Some("/srv/models"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["phone-forecast"]).is_err());
    }
}
