//! Common transport-layer types shared between the compute crate and the HTTP layer.
//! These structs are what the handlers serialize, so the OpenAPI schema and the
//! report builders agree on one shape.

mod attendance;
mod reference;
mod reports;

pub use attendance::{Session, SessionEntry, SessionRecord, Status, StatusTally};
pub use reference::{ClassDto, Role, StudentDto, SubjectDto, TrackDto, UserDto};
pub use reports::{GridRow, HistoryMonth, MonthGrid, MonthReport, ReportDay, ReportRow, StudentHistory};
