//! Multi-month attendance history of one student.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use common::{HistoryMonth, StudentHistory};
use model::entities::{attendance_header, attendance_line};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, instrument};

use crate::calendar::{YearMonth, month_range};
use crate::error::{ComputeError, Result};
use crate::store::{decode_status, with_timeout};

#[derive(Debug, Clone, FromQueryResult)]
struct HistoryRow {
    date: NaiveDate,
    status: String,
}

#[derive(Debug, Clone)]
pub struct StudentHistoryAggregator {
    db: DatabaseConnection,
    timeout: Duration,
}

impl StudentHistoryAggregator {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Builds one `day -> status` map per month of the inclusive range, across
    /// every class, track and subject. When several sessions fall on the same
    /// day the header created last wins.
    #[instrument(skip(self))]
    pub async fn build_student_history(
        &self,
        nis: &str,
        start: YearMonth,
        end: YearMonth,
    ) -> Result<StudentHistory> {
        let nis = nis.trim();
        if nis.is_empty() {
            return Err(ComputeError::validation("nis must not be empty"));
        }
        let months = month_range(start, end)?;

        let mut history = Vec::with_capacity(months.len());
        for period in months {
            history.push(self.month(nis, period).await?);
        }

        Ok(StudentHistory {
            nis: nis.to_string(),
            months: history,
        })
    }

    async fn month(&self, nis: &str, period: YearMonth) -> Result<HistoryMonth> {
        let rows: Vec<HistoryRow> = with_timeout(
            self.timeout,
            "student_history.lines",
            attendance_line::Entity::find()
                .select_only()
                .column_as(attendance_header::Column::Date, "date")
                .column_as(attendance_line::Column::Status, "status")
                .inner_join(attendance_header::Entity)
                .filter(attendance_line::Column::Nis.eq(nis))
                .filter(
                    attendance_header::Column::Date.between(period.first_day(), period.last_day()),
                )
                .order_by_asc(attendance_header::Column::Id)
                .into_model::<HistoryRow>()
                .all(&self.db),
        )
        .await?;
        debug!(%period, lines = rows.len(), "Fetched student lines");

        let mut day_map = BTreeMap::new();
        for row in rows {
            let status = decode_status(&row.status, nis)?;
            day_map.insert(row.date.day(), status);
        }

        Ok(HistoryMonth {
            year: period.year(),
            month: period.month(),
            days_in_month: period.days(),
            day_map,
        })
    }
}
