use clap::{Parser, Subcommand};
use configuration::{Environment, Settings};
use database::{GradebookStore, InMemoryStore};
use std::sync::Arc;

/// The main entry point for the gradebook service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a local .env file, outside production.
    let dotenv_path = configuration::load_dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_settings()?;
    let _log_guard = configuration::init_tracing(&settings.logging)?;
    if let Some(path) = &dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded environment from .env file.");
    }

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, &mut settings).await,
        Commands::Migrate => handle_migrate(&settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A REST service for students, subjects and their grades.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate,
}

#[derive(Parser)]
struct ServeArgs {
    /// Interface to bind, overriding `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding `server.port`.
    #[arg(long)]
    port: Option<u16>,

    /// Reported deployment stage, overriding `environment`.
    #[arg(long, value_enum)]
    environment: Option<Environment>,

    /// Keep all data in process memory instead of PostgreSQL.
    #[arg(long)]
    in_memory: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, settings: &mut Settings) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(environment) = args.environment {
        settings.environment = environment;
    }

    let store: Arc<dyn GradebookStore> = if args.in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit.");
        Arc::new(InMemoryStore::new())
    } else {
        web_server::connect_store(settings).await?
    };

    web_server::run_server(settings, store).await
}

async fn handle_migrate(settings: &Settings) -> anyhow::Result<()> {
    let pool = database::connect(&settings.database).await?;
    database::run_migrations(&pool).await?;
    tracing::info!("Migrations applied.");
    Ok(())
}
