use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{info, debug, trace};

use crate::config::AppConfig;

/// Connect to the configured database and apply every pending migration.
pub async fn init_database(config: &AppConfig) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");
    debug!("Database URL: {}", config.database_url);

    let db: DatabaseConnection = Database::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", config.database_url))?;
    info!("Successfully connected to database");

    info!("Running database migrations");
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;

    info!("Database initialization completed successfully!");
    Ok(())
}
