use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::attendance::{Status, StatusTally};

/// Dense month view of one class/track/subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthGrid {
    pub year: i32,
    /// Month number (1-12)
    pub month: u32,
    pub days_in_month: u32,
    /// Roster students first (ordered by name), then rows synthesized for
    /// attendance recorded against NIS values outside the roster.
    pub students: Vec<GridRow>,
}

/// One student row of a month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GridRow {
    pub nis: String,
    /// Student name, `None` when the NIS is not in the roster
    pub name: Option<String>,
    /// False when the row exists only because attendance was recorded for this NIS
    pub in_roster: bool,
    /// Status keyed by `YYYY-MM-DD`; dates without a record are absent from the map
    #[serde(rename = "statusByDate")]
    pub status_by_date: BTreeMap<String, Status>,
}

/// Attendance of one student across a range of months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentHistory {
    pub nis: String,
    pub months: Vec<HistoryMonth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistoryMonth {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// Status keyed by day of month
    #[serde(rename = "dayMap")]
    pub day_map: BTreeMap<u32, Status>,
}

/// Month grid rendered for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthReport {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// False when the holiday source could not be consulted
    pub holidays_available: bool,
    pub days: Vec<ReportDay>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportDay {
    pub day: u32,
    pub date: NaiveDate,
    pub is_sunday: bool,
    pub is_holiday: bool,
    pub non_instructional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportRow {
    /// 1-based position in the report
    pub number: usize,
    pub nis: String,
    pub name: String,
    pub in_roster: bool,
    /// One symbol per day of month; empty string when nothing was recorded
    pub symbols: Vec<String>,
    pub tally: StatusTally,
}
