//! SeaORM entities of the attendance store.
//!
//! Reference data (classes, tracks, subjects, students, users) is managed through
//! plain CRUD. Attendance is stored as one header per session and one line per
//! student, keyed by NIS.

pub mod attendance_header;
pub mod attendance_line;
pub mod class_section;
pub mod student;
pub mod subject;
pub mod track;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::attendance_header::Entity as AttendanceHeader;
    pub use super::attendance_line::Entity as AttendanceLine;
    pub use super::class_section::Entity as ClassSection;
    pub use super::student::Entity as Student;
    pub use super::subject::Entity as Subject;
    pub use super::track::Entity as Track;
    pub use super::user::Entity as User;
}
