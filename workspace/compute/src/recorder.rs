//! Recording and querying attendance sessions.
//!
//! A session is identified by its natural key (class, track, subject, date).
//! Recording a session replaces all of its lines inside one transaction, so the
//! operation is idempotent and a failure leaves the previous state untouched.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use common::{Session, SessionEntry, SessionRecord};
use model::entities::{attendance_header, attendance_line};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{ComputeError, Result, is_foreign_key_violation};
use crate::store::with_timeout;

/// Number of attempts made when a concurrent writer creates the same header.
const RECORD_ATTEMPTS: usize = 2;

/// Natural key of an attendance session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub class_id: i32,
    pub track_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
}

/// Optional filters of [`AttendanceRecorder::query_sessions`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct AttendanceRecorder {
    db: DatabaseConnection,
    timeout: Duration,
}

impl AttendanceRecorder {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Upserts the header for `key` and replaces its lines with `entries`.
    ///
    /// An empty `entries` list clears the session. Duplicate NIS values or blank
    /// NIS values are rejected before anything is written.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn record_session(
        &self,
        key: SessionKey,
        entries: &[SessionEntry],
    ) -> Result<SessionRecord> {
        let entries = normalize_entries(entries)?;
        self.record_with_retry(key, entries.len(), || self.try_record(key, &entries))
            .await
    }

    /// Runs `attempt_record` until it succeeds, retrying once when another writer
    /// created the same header between lookup and insert.
    async fn record_with_retry<F, Fut>(
        &self,
        key: SessionKey,
        lines: usize,
        mut attempt_record: F,
    ) -> Result<SessionRecord>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<i32>>,
    {
        let mut attempt = 1;
        loop {
            trace!(attempt, "Recording attendance session");
            let result = with_timeout(self.timeout, "record_session", attempt_record()).await;

            match result {
                Ok(header_id) => {
                    info!(header_id, lines, "Recorded attendance session");
                    return Ok(SessionRecord {
                        id: header_id,
                        class_id: key.class_id,
                        track_id: key.track_id,
                        subject_id: key.subject_id,
                        date: key.date,
                    });
                }
                Err(err) if err.is_unique_violation() && attempt < RECORD_ATTEMPTS => {
                    warn!(attempt, "Header created concurrently, retrying");
                    attempt += 1;
                }
                Err(ComputeError::Database(err)) if is_foreign_key_violation(&err) => {
                    return Err(ComputeError::validation(
                        "class_id, track_id or subject_id does not exist",
                    ));
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_record(&self, key: SessionKey, entries: &[SessionEntry]) -> Result<i32> {
        let txn = self.db.begin().await?;

        let existing = attendance_header::Entity::find()
            .filter(attendance_header::Column::ClassId.eq(key.class_id))
            .filter(attendance_header::Column::TrackId.eq(key.track_id))
            .filter(attendance_header::Column::SubjectId.eq(key.subject_id))
            .filter(attendance_header::Column::Date.eq(key.date))
            .one(&txn)
            .await?;

        let header_id = match existing {
            Some(header) => {
                let deleted = attendance_line::Entity::delete_many()
                    .filter(attendance_line::Column::HeaderId.eq(header.id))
                    .exec(&txn)
                    .await?;
                debug!(
                    header_id = header.id,
                    deleted = deleted.rows_affected,
                    "Replacing lines of existing header"
                );
                header.id
            }
            None => {
                let header = attendance_header::ActiveModel {
                    class_id: Set(key.class_id),
                    track_id: Set(key.track_id),
                    subject_id: Set(key.subject_id),
                    date: Set(key.date),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                debug!(header_id = header.id, "Created attendance header");
                header.id
            }
        };

        if !entries.is_empty() {
            let lines = entries.iter().map(|entry| attendance_line::ActiveModel {
                header_id: Set(header_id),
                nis: Set(entry.nis.clone()),
                status: Set(entry.status.into()),
                ..Default::default()
            });
            attendance_line::Entity::insert_many(lines).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(header_id)
    }

    /// Lists sessions matching `filter`, newest first, each with its entries ordered by NIS.
    #[instrument(skip(self))]
    pub async fn query_sessions(&self, filter: SessionFilter) -> Result<Vec<Session>> {
        let mut query = attendance_header::Entity::find();
        if let Some(class_id) = filter.class_id {
            query = query.filter(attendance_header::Column::ClassId.eq(class_id));
        }
        if let Some(track_id) = filter.track_id {
            query = query.filter(attendance_header::Column::TrackId.eq(track_id));
        }
        if let Some(subject_id) = filter.subject_id {
            query = query.filter(attendance_header::Column::SubjectId.eq(subject_id));
        }
        if let Some(date) = filter.date {
            query = query.filter(attendance_header::Column::Date.eq(date));
        }

        let headers = with_timeout(
            self.timeout,
            "query_sessions.headers",
            query
                .order_by_desc(attendance_header::Column::Date)
                .order_by_desc(attendance_header::Column::Id)
                .all(&self.db),
        )
        .await?;
        debug!(headers = headers.len(), "Fetched attendance headers");

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
        let lines = with_timeout(
            self.timeout,
            "query_sessions.lines",
            attendance_line::Entity::find()
                .filter(attendance_line::Column::HeaderId.is_in(ids))
                .order_by_asc(attendance_line::Column::Nis)
                .all(&self.db),
        )
        .await?;
        trace!(lines = lines.len(), "Fetched attendance lines");

        let mut by_header: HashMap<i32, Vec<SessionEntry>> = HashMap::new();
        for line in lines {
            by_header.entry(line.header_id).or_default().push(SessionEntry {
                nis: line.nis,
                status: line.status.into(),
            });
        }

        Ok(headers
            .into_iter()
            .map(|header| Session {
                entries: by_header.remove(&header.id).unwrap_or_default(),
                id: header.id,
                class_id: header.class_id,
                track_id: header.track_id,
                subject_id: header.subject_id,
                date: header.date,
            })
            .collect())
    }
}

/// Trims NIS values and rejects blank or duplicated ones.
fn normalize_entries(entries: &[SessionEntry]) -> Result<Vec<SessionEntry>> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut normalized = Vec::with_capacity(entries.len());
    for entry in entries {
        let nis = entry.nis.trim();
        if nis.is_empty() {
            return Err(ComputeError::validation("entry nis must not be empty"));
        }
        if !seen.insert(nis.to_string()) {
            return Err(ComputeError::validation(format!(
                "duplicate nis '{}' in entries",
                nis
            )));
        }
        normalized.push(SessionEntry {
            nis: nis.to_string(),
            status: entry.status,
        });
    }
    Ok(normalized)
}
