//! Sequential subject codes (`MPL01`, `MPL02`, ...).

use std::time::Duration;

use model::entities::subject::{self, code_number, format_code};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QuerySelect, Set};
use tracing::{debug, info, instrument, warn};

use crate::error::{ComputeError, Result};
use crate::store::with_timeout;

/// Attempts made when a concurrent writer takes the generated code first.
pub const CODE_ATTEMPTS: usize = 3;

/// Code the next created subject would get: the highest numeric suffix plus one.
pub async fn next_subject_code<C: ConnectionTrait>(db: &C, timeout: Duration) -> Result<String> {
    let codes: Vec<String> = with_timeout(
        timeout,
        "subject_code.codes",
        subject::Entity::find()
            .select_only()
            .column(subject::Column::Code)
            .into_tuple::<String>()
            .all(db),
    )
    .await?;

    let max = codes.iter().map(|c| code_number(c)).max().unwrap_or(0);
    Ok(format_code(max + 1))
}

/// Creates a subject with a generated code, retrying when the code was taken concurrently.
#[instrument(skip(db))]
pub async fn create_subject<C: ConnectionTrait>(
    db: &C,
    name: &str,
    timeout: Duration,
) -> Result<subject::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ComputeError::validation("subject name must not be empty"));
    }

    for attempt in 1..=CODE_ATTEMPTS {
        let code = next_subject_code(db, timeout).await?;
        debug!(attempt, %code, "Inserting subject");

        let result = with_timeout(
            timeout,
            "subject_code.insert",
            subject::ActiveModel {
                code: Set(code.clone()),
                name: Set(name.to_string()),
                ..Default::default()
            }
            .insert(db),
        )
        .await;

        match result {
            Ok(model) => {
                info!(id = model.id, code = %model.code, "Created subject");
                return Ok(model);
            }
            Err(err) if err.is_unique_violation() => {
                warn!(attempt, %code, "Subject code already taken");
            }
            Err(err) => return Err(err),
        }
    }

    Err(ComputeError::Conflict(format!(
        "could not allocate a subject code after {} attempts",
        CODE_ATTEMPTS
    )))
}
