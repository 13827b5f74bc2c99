use anyhow::{Context, Result};
use compute::holidays::{CachedHolidayCalendar, HolidayCalendar, HttpHolidayCalendar, NoHolidays};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use sea_orm::Database;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Holiday source settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HolidaysConfig {
    /// Base URL queried as `<url>?year=<year>`. No lookups when unset.
    pub url: Option<String>,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

/// Application configuration.
///
/// Layered from built-in defaults, an optional `rollbook.toml` in the working
/// directory and `ROLLBOOK__*` environment variables (`ROLLBOOK__HOLIDAYS__URL`
/// sets `holidays.url`). Command line flags override the result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub request_timeout_secs: u64,
    pub store_timeout_secs: u64,
    pub holidays: HolidaysConfig,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("database_url", "sqlite://rollbook.db?mode=rwc")?
        .set_default("bind_address", "0.0.0.0:3000")?
        .set_default("request_timeout_secs", 30)?
        .set_default("store_timeout_secs", 10)?
        .set_default("holidays.timeout_secs", 5)?
        .set_default("holidays.cache_ttl_secs", 86_400)?)
}

impl AppConfig {
    /// Load configuration from defaults, `rollbook.toml` and the environment.
    pub fn load() -> Result<Self> {
        let settings = defaults()?
            .add_source(File::with_name("rollbook").required(false))
            .add_source(Environment::with_prefix("ROLLBOOK").separator("__"))
            .build()
            .context("Failed to read configuration")?;
        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    #[cfg(test)]
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings = defaults()?
            .add_source(File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Apply command line overrides.
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

/// Build the holiday calendar described by the configuration.
pub fn build_holiday_calendar(config: &HolidaysConfig) -> Result<Arc<dyn HolidayCalendar>> {
    match config.url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => {
            info!("Using holiday source at {}", url);
            let http = HttpHolidayCalendar::new(url, Duration::from_secs(config.timeout_secs))?;
            Ok(Arc::new(CachedHolidayCalendar::new(
                Arc::new(http),
                Duration::from_secs(config.cache_ttl_secs),
            )))
        }
        None => {
            debug!("No holiday source configured");
            Ok(Arc::new(NoHolidays))
        }
    }
}

/// Initialize application state from the configuration
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", config.database_url))?;

    let holidays = build_holiday_calendar(&config.holidays)?;

    Ok(AppState {
        db,
        holidays,
        store_timeout: config.store_timeout(),
    })
}
