mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::WorkerConfig;

#[derive(Parser, Debug)]
#[command(name = "artgrid-worker", version, about = "Generate and publish artist × prompt image grids", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every artist × prompt combination into a new batch.
    Generate(commands::generate::GenerateArgs),
    /// Upload batch images to object storage and write their remap table.
    Upload(commands::upload::UploadArgs),
    /// Copy new batches from the generation tree into the presentation tree.
    Sync,
    /// List batches, newest first.
    Batches {
        /// List the generation tree instead of the presentation tree.
        #[arg(long)]
        generated: bool,
    },
    /// List the available artist and prompt input files.
    Inputs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artgrid_worker=debug,artgrid_pipeline=debug,artgrid_cloud=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env().context("Failed to load worker configuration")?;
    tracing::debug!(?config, "Loaded worker configuration");

    match cli.cmd {
        Commands::Generate(args) => commands::generate::handle(&config, args).await,
        Commands::Upload(args) => commands::upload::handle(&config, args).await,
        Commands::Sync => commands::batches::sync(&config).await,
        Commands::Batches { generated } => commands::batches::list(&config, generated).await,
        Commands::Inputs => commands::batches::inputs(&config),
    }
}
