use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rebelle_dao::{Config, DataSourceProvider, Directory};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::{Args, Command};

/// Initialize tracing to stderr so command output on stdout stays clean.
fn initialize_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,rebelle_admin=debug,rebelle_dao=debug,sqlx::query=warn".into());

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    initialize_tracing()?;

    let config = Config::load()?;
    let directory = Arc::new(Directory::new());
    config.bind_all(&directory)?;

    let provider: DataSourceProvider<PgPool> = DataSourceProvider::new(Arc::clone(&directory));

    match args.command {
        Command::Check { name, concurrency } => {
            commands::check::run(&provider, name, concurrency).await
        }
        Command::Bindings { show_secrets } => {
            commands::bindings::run(&directory, &config, show_secrets)
        }
    }
}
