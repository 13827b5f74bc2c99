//! Turns a month grid into a printable report: day flags, symbols, tallies and
//! the CSV spreadsheet export.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use common::{MonthGrid, MonthReport, ReportDay, ReportRow, Status, StatusTally};
use tracing::{debug, instrument, warn};

use crate::calendar::{date_key, is_sunday};
use crate::error::{ComputeError, Result};
use crate::holidays::HolidayCalendar;

/// Single-letter symbol printed in report cells.
pub fn status_symbol(status: Status) -> &'static str {
    match status {
        Status::Present => "P",
        Status::Excused => "E",
        Status::Sick => "S",
        Status::Absent => "A",
    }
}

/// Counts every status of a row. All four counters are present even when zero.
pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a Status>) -> StatusTally {
    let mut tally = StatusTally::default();
    for status in statuses {
        tally.add(*status);
    }
    tally
}

/// Looks up the holidays of `year`. A failing source yields `None` instead of an error.
pub async fn load_holidays(
    calendar: &dyn HolidayCalendar,
    year: i32,
) -> Option<BTreeSet<NaiveDate>> {
    match calendar.holidays_for_year(year).await {
        Ok(dates) => Some(dates),
        Err(e) => {
            warn!(year, error = %e, "Holiday calendar unavailable, rendering without holidays");
            None
        }
    }
}

/// Renders the report of a grid. `holidays` is `None` when the calendar could not be read.
#[instrument(skip(grid, holidays), fields(year = grid.year, month = grid.month))]
pub fn render_month_report(
    grid: &MonthGrid,
    holidays: Option<&BTreeSet<NaiveDate>>,
) -> Result<MonthReport> {
    let mut days = Vec::with_capacity(grid.days_in_month as usize);
    for day in 1..=grid.days_in_month {
        let date = NaiveDate::from_ymd_opt(grid.year, grid.month, day).ok_or_else(|| {
            ComputeError::validation(format!(
                "{}-{:02} has no day {}",
                grid.year, grid.month, day
            ))
        })?;
        let is_sunday = is_sunday(date);
        let is_holiday = holidays.is_some_and(|h| h.contains(&date));
        days.push(ReportDay {
            day,
            date,
            is_sunday,
            is_holiday,
            non_instructional: is_sunday || is_holiday,
        });
    }

    let rows: Vec<ReportRow> = grid
        .students
        .iter()
        .enumerate()
        .map(|(i, student)| {
            let symbols = days
                .iter()
                .map(|d| {
                    student
                        .status_by_date
                        .get(&date_key(d.date))
                        .map(|s| status_symbol(*s).to_string())
                        .unwrap_or_default()
                })
                .collect();
            ReportRow {
                number: i + 1,
                nis: student.nis.clone(),
                name: student.name.clone().unwrap_or_else(|| student.nis.clone()),
                in_roster: student.in_roster,
                symbols,
                tally: tally(student.status_by_date.values()),
            }
        })
        .collect();
    debug!(rows = rows.len(), "Rendered month report");

    Ok(MonthReport {
        year: grid.year,
        month: grid.month,
        days_in_month: grid.days_in_month,
        holidays_available: holidays.is_some(),
        days,
        rows,
    })
}

/// Attachment file name of the spreadsheet export.
pub fn csv_file_name(year: i32, month: u32) -> String {
    format!("attendance-{}-{:02}.csv", year, month)
}

/// Writes the report as CSV: `No, NIS, Name, 1..days, P, E, S, A`.
pub fn write_csv(report: &MonthReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["No".to_string(), "NIS".to_string(), "Name".to_string()];
    header.extend(report.days.iter().map(|d| d.day.to_string()));
    header.extend(Status::ALL.iter().map(|s| status_symbol(*s).to_string()));
    writer.write_record(&header).map_err(export_error)?;

    for row in &report.rows {
        let mut record = vec![row.number.to_string(), row.nis.clone(), row.name.clone()];
        record.extend(row.symbols.iter().cloned());
        record.extend(Status::ALL.iter().map(|s| row.tally.get(*s).to_string()));
        writer.write_record(&record).map_err(export_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| ComputeError::Export(e.to_string()))
}

fn export_error(e: csv::Error) -> ComputeError {
    ComputeError::Export(e.to_string())
}
