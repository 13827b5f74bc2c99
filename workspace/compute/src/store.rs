use std::future::Future;
use std::time::Duration;

use common::Status;
use model::entities::attendance_line::AttendanceStatus;
use sea_orm::ActiveEnum;
use tracing::warn;

use crate::error::{ComputeError, Result};

/// Default deadline applied to every store call made by the core components.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs a store call with a deadline. A timeout is terminal and never retried.
pub async fn with_timeout<T, E, F>(limit: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<ComputeError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            warn!(operation, ?limit, "Store call timed out");
            Err(ComputeError::Timeout(limit))
        }
    }
}

/// Validates a raw status string read from the store.
pub(crate) fn decode_status(raw: &str, nis: &str) -> Result<Status> {
    AttendanceStatus::try_from_value(&raw.to_string())
        .map(Status::from)
        .map_err(|_| {
            ComputeError::CorruptRow(format!(
                "attendance line for nis '{}' has unknown status '{}'",
                nis, raw
            ))
        })
}
