//! # Epic Events CRM API Main Entry Point
//!
//! Binary entry point: `serve` runs the HTTP API, `migrate` applies the
//! database migrations and exits.

use clap::{Parser, Subcommand};
use migration::MigratorTrait;

use epicevents::{config::ConfigLoader, db, seeds, server::run_server, telemetry};

#[derive(Parser)]
#[command(name = "epicevents", about = "Epic Events CRM API", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(configuration = %redacted_json, "Effective configuration");
    }

    let db = db::init_pool(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            seeds::seed_superuser(&db, &config).await?;
            run_server(config, db).await
        }
        Command::Migrate => {
            migration::Migrator::up(&db, None).await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
    }
}
