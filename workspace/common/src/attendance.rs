use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Attendance status of one student in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Present,
    Excused,
    Sick,
    Absent,
}

impl Status {
    /// Every status, in report column order.
    pub const ALL: [Status; 4] = [Status::Present, Status::Excused, Status::Sick, Status::Absent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Present => "present",
            Status::Excused => "excused",
            Status::Sick => "sick",
            Status::Absent => "absent",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-student count of each status. All four counters are always serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusTally {
    pub present: u32,
    pub excused: u32,
    pub sick: u32,
    pub absent: u32,
}

impl StatusTally {
    pub fn add(&mut self, status: Status) {
        match status {
            Status::Present => self.present += 1,
            Status::Excused => self.excused += 1,
            Status::Sick => self.sick += 1,
            Status::Absent => self.absent += 1,
        }
    }

    pub fn get(&self, status: Status) -> u32 {
        match status {
            Status::Present => self.present,
            Status::Excused => self.excused,
            Status::Sick => self.sick,
            Status::Absent => self.absent,
        }
    }
}

/// One student's line inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionEntry {
    /// Student identification number (NIS)
    pub nis: String,
    pub status: Status,
}

/// Header of a recorded session, as returned by the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionRecord {
    pub id: i32,
    pub class_id: i32,
    pub track_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
}

/// A recorded session together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub id: i32,
    pub class_id: i32,
    pub track_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
    pub entries: Vec<SessionEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&Status::Excused).unwrap();
        assert_eq!(json, "\"excused\"");

        let parsed: Status = serde_json::from_str("\"sick\"").unwrap();
        assert_eq!(parsed, Status::Sick);

        assert!(serde_json::from_str::<Status>("\"late\"").is_err());
    }

    #[test]
    fn tally_serializes_all_counters() {
        let mut tally = StatusTally::default();
        tally.add(Status::Present);
        tally.add(Status::Present);
        tally.add(Status::Absent);

        let value = serde_json::to_value(tally).unwrap();
        assert_eq!(value["present"], 2);
        assert_eq!(value["excused"], 0);
        assert_eq!(value["sick"], 0);
        assert_eq!(value["absent"], 1);
        assert_eq!(tally.get(Status::Present), 2);
    }
}
