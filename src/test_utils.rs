#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use async_trait::async_trait;
    use axum::Router;
    use chrono::NaiveDate;
    use compute::{ComputeError, HolidayCalendar, NoHolidays};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Holiday source that is always down
    #[derive(Debug)]
    pub struct UnreachableHolidays;

    #[async_trait]
    impl HolidayCalendar for UnreachableHolidays {
        async fn holidays_for_year(&self, year: i32) -> compute::Result<BTreeSet<NaiveDate>> {
            Err(ComputeError::HolidayLookup(format!(
                "holiday source unreachable for {}",
                year
            )))
        }
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        db.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing with the given holiday calendar
    pub async fn setup_test_app_state_with(holidays: Arc<dyn HolidayCalendar>) -> AppState {
        let db = setup_test_db().await;
        AppState {
            db,
            holidays,
            store_timeout: Duration::from_secs(5),
        }
    }

    /// Create AppState for testing without a holiday source
    pub async fn setup_test_app_state() -> AppState {
        setup_test_app_state_with(Arc::new(NoHolidays)).await
    }

    /// Install the global tracing subscriber for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG and defaults to WARN. Only the
    /// first call installs it; later calls are no-ops.
    fn init_test_tracing() {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        // Fails when an earlier test already installed it
        let _ = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Create axum app for testing with the given holiday calendar
    pub async fn setup_test_app_with(holidays: Arc<dyn HolidayCalendar>) -> Router {
        init_test_tracing();

        let state = setup_test_app_state_with(holidays).await;
        create_router(state, Duration::from_secs(30))
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        setup_test_app_with(Arc::new(NoHolidays)).await
    }

    #[tokio::test]
    async fn test_app_setup_installs_global_tracing() {
        let _app = setup_test_app().await;
        assert!(tracing::dispatcher::has_been_set());

        // A second setup keeps the installed subscriber
        let _app = setup_test_app().await;
        assert!(tracing::dispatcher::has_been_set());
    }
}
