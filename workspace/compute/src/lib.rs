//! Attendance recording and reporting.
//!
//! Every component takes the database connection it works on; there is no
//! global handle and nothing about rosters or attendance is cached between calls.

pub mod calendar;
pub mod error;
pub mod history;
pub mod holidays;
pub mod month_grid;
pub mod recorder;
pub mod reference;
pub mod report;
pub mod store;
pub mod subject_code;

#[cfg(test)]
pub(crate) mod testing;

pub use calendar::{YearMonth, month_range};
pub use error::{ComputeError, Result};
pub use history::StudentHistoryAggregator;
pub use holidays::{CachedHolidayCalendar, HolidayCalendar, HttpHolidayCalendar, NoHolidays, StaticHolidays};
pub use month_grid::{MonthQuery, MonthlyAggregator};
pub use recorder::{AttendanceRecorder, SessionFilter, SessionKey};
