//! Dense per-student, per-day status grid of one class/track/subject month.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::NaiveDate;
use common::{GridRow, MonthGrid};
use model::entities::{attendance_header, attendance_line, student};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, instrument, trace};

use crate::calendar::{YearMonth, date_key};
use crate::error::Result;
use crate::store::{decode_status, with_timeout};

/// Parameters of a month grid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthQuery {
    pub class_id: i32,
    pub track_id: i32,
    pub subject_id: i32,
    pub year: i32,
    pub month: u32,
}

/// One attendance line joined with the date of its header.
#[derive(Debug, Clone, FromQueryResult)]
struct LineRow {
    date: NaiveDate,
    nis: String,
    status: String,
}

#[derive(Debug, Clone)]
pub struct MonthlyAggregator {
    db: DatabaseConnection,
    timeout: Duration,
}

impl MonthlyAggregator {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Builds the grid: every rostered student of the class and track, in name
    /// order, followed by rows for NIS values that have lines but no roster entry.
    #[instrument(skip(self))]
    pub async fn build_month_grid(&self, query: MonthQuery) -> Result<MonthGrid> {
        let period = YearMonth::new(query.year, query.month)?;
        let (first, last) = (period.first_day(), period.last_day());

        let roster = with_timeout(
            self.timeout,
            "month_grid.roster",
            student::Entity::find()
                .filter(student::Column::ClassId.eq(query.class_id))
                .filter(student::Column::TrackId.eq(query.track_id))
                .order_by_asc(student::Column::Name)
                .order_by_asc(student::Column::Nis)
                .all(&self.db),
        )
        .await?;
        debug!(students = roster.len(), "Fetched roster");

        let lines: Vec<LineRow> = with_timeout(
            self.timeout,
            "month_grid.lines",
            attendance_line::Entity::find()
                .select_only()
                .column_as(attendance_header::Column::Date, "date")
                .column_as(attendance_line::Column::Nis, "nis")
                .column_as(attendance_line::Column::Status, "status")
                .inner_join(attendance_header::Entity)
                .filter(attendance_header::Column::ClassId.eq(query.class_id))
                .filter(attendance_header::Column::TrackId.eq(query.track_id))
                .filter(attendance_header::Column::SubjectId.eq(query.subject_id))
                .filter(attendance_header::Column::Date.between(first, last))
                .order_by_asc(attendance_header::Column::Date)
                .order_by_asc(attendance_header::Column::Id)
                .into_model::<LineRow>()
                .all(&self.db),
        )
        .await?;
        debug!(lines = lines.len(), "Fetched attendance lines");

        let mut rows: Vec<GridRow> = roster
            .into_iter()
            .map(|s| GridRow {
                nis: s.nis,
                name: Some(s.name),
                in_roster: true,
                status_by_date: BTreeMap::new(),
            })
            .collect();
        let mut index: HashMap<String, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.nis.clone(), i))
            .collect();

        for line in lines {
            let status = decode_status(&line.status, &line.nis)?;
            let position = match index.get(&line.nis) {
                Some(position) => *position,
                None => {
                    trace!(nis = %line.nis, "Line without roster entry");
                    rows.push(GridRow {
                        nis: line.nis.clone(),
                        name: None,
                        in_roster: false,
                        status_by_date: BTreeMap::new(),
                    });
                    index.insert(line.nis.clone(), rows.len() - 1);
                    rows.len() - 1
                }
            };
            rows[position]
                .status_by_date
                .insert(date_key(line.date), status);
        }

        Ok(MonthGrid {
            year: period.year(),
            month: period.month(),
            days_in_month: period.days(),
            students: rows,
        })
    }
}
