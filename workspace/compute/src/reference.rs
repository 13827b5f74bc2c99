//! Referential checks guarding edits of reference data.

use model::entities::{attendance_header, attendance_line, student};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::time::Duration;
use tracing::debug;

use crate::error::Result;
use crate::store::with_timeout;

/// Anything that may point at a class, track or subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Referenced {
    Class(i32),
    Track(i32),
    Subject(i32),
}

/// Number of students and attendance headers still pointing at `target`.
/// Each count runs under `timeout`.
pub async fn reference_count<C: ConnectionTrait>(
    db: &C,
    target: Referenced,
    timeout: Duration,
) -> Result<u64> {
    let (students, headers) = match target {
        Referenced::Class(id) => (
            with_timeout(
                timeout,
                "count class students",
                student::Entity::find()
                    .filter(student::Column::ClassId.eq(id))
                    .count(db),
            )
            .await?,
            with_timeout(
                timeout,
                "count class headers",
                attendance_header::Entity::find()
                    .filter(attendance_header::Column::ClassId.eq(id))
                    .count(db),
            )
            .await?,
        ),
        Referenced::Track(id) => (
            with_timeout(
                timeout,
                "count track students",
                student::Entity::find()
                    .filter(student::Column::TrackId.eq(id))
                    .count(db),
            )
            .await?,
            with_timeout(
                timeout,
                "count track headers",
                attendance_header::Entity::find()
                    .filter(attendance_header::Column::TrackId.eq(id))
                    .count(db),
            )
            .await?,
        ),
        Referenced::Subject(id) => (
            0,
            with_timeout(
                timeout,
                "count subject headers",
                attendance_header::Entity::find()
                    .filter(attendance_header::Column::SubjectId.eq(id))
                    .count(db),
            )
            .await?,
        ),
    };
    debug!(?target, students, headers, "Counted references");
    Ok(students + headers)
}

/// True when attendance lines were recorded for `nis`.
pub async fn has_attendance<C: ConnectionTrait>(
    db: &C,
    nis: &str,
    timeout: Duration,
) -> Result<bool> {
    let lines = with_timeout(
        timeout,
        "count student attendance",
        attendance_line::Entity::find()
            .filter(attendance_line::Column::Nis.eq(nis))
            .count(db),
    )
    .await?;
    Ok(lines > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComputeError;
    use crate::recorder::AttendanceRecorder;
    use crate::testing::{add_student, date, entry, seed_reference, setup_db, setup_single_connection_db};
    use common::Status;
    use sea_orm::TransactionTrait;

    const LIMIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_reference_counts() {
        let db = setup_db().await.unwrap();
        let refs = seed_reference(&db).await.unwrap();
        assert_eq!(reference_count(&db, Referenced::Class(refs.class_id), LIMIT).await.unwrap(), 0);

        add_student(&db, &refs, "001", "Ani").await.unwrap();
        assert_eq!(reference_count(&db, Referenced::Class(refs.class_id), LIMIT).await.unwrap(), 1);
        assert_eq!(reference_count(&db, Referenced::Subject(refs.subject_id), LIMIT).await.unwrap(), 0);

        AttendanceRecorder::new(db.clone(), Duration::from_secs(5))
            .record_session(refs.key(date(2024, 5, 10)), &[entry("001", Status::Present)])
            .await
            .unwrap();
        assert_eq!(reference_count(&db, Referenced::Track(refs.track_id), LIMIT).await.unwrap(), 2);
        assert_eq!(reference_count(&db, Referenced::Subject(refs.subject_id), LIMIT).await.unwrap(), 1);
        assert!(has_attendance(&db, "001", LIMIT).await.unwrap());
        assert!(!has_attendance(&db, "002", LIMIT).await.unwrap());
    }

    #[tokio::test]
    async fn test_checks_time_out_when_store_is_busy() {
        let db = setup_single_connection_db().await.unwrap();
        let refs = seed_reference(&db).await.unwrap();

        // The open transaction holds the only pooled connection
        let txn = db.begin().await.unwrap();
        let limit = Duration::from_millis(50);

        let err = reference_count(&db, Referenced::Class(refs.class_id), limit)
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::Timeout(d) if d == limit));

        let err = has_attendance(&db, "001", limit).await.unwrap_err();
        assert!(matches!(err, ComputeError::Timeout(_)));

        txn.rollback().await.unwrap();
        assert_eq!(reference_count(&db, Referenced::Class(refs.class_id), LIMIT).await.unwrap(), 0);
    }
}
