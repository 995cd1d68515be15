//! phone-forecast - main entry point
//!
//! Trains the revenue and price models or serves predictions from them.

use clap::Parser;
use phone_forecast::cli::{cmd_serve, cmd_train_price, cmd_train_revenue, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phone_forecast=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::TrainRevenue { data, out } => {
            cmd_train_revenue(&data, &out)?;
        }
        Commands::TrainPrice { data, out } => {
            cmd_train_price(&data, &out)?;
        }
        Commands::Serve { port, host, models_dir } => {
            cmd_serve(host, port, models_dir).await?;
        }
    }

    Ok(())
}
