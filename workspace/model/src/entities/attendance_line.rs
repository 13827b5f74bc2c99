use common::Status;
use sea_orm::entity::prelude::*;

/// Stored attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "excused")]
    Excused,
    #[sea_orm(string_value = "sick")]
    Sick,
    #[sea_orm(string_value = "absent")]
    Absent,
}

impl From<AttendanceStatus> for Status {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => Status::Present,
            AttendanceStatus::Excused => Status::Excused,
            AttendanceStatus::Sick => Status::Sick,
            AttendanceStatus::Absent => Status::Absent,
        }
    }
}

impl From<Status> for AttendanceStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Present => AttendanceStatus::Present,
            Status::Excused => AttendanceStatus::Excused,
            Status::Sick => AttendanceStatus::Sick,
            Status::Absent => AttendanceStatus::Absent,
        }
    }
}

/// One student's status within a session. Lines reference students by NIS, not
/// by surrogate id, and are replaced wholesale whenever the session is re-recorded.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub header_id: i32,
    pub nis: String,
    pub status: AttendanceStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_header::Entity",
        from = "Column::HeaderId",
        to = "super::attendance_header::Column::Id",
        on_delete = "Cascade"
    )]
    AttendanceHeader,
}

impl Related<super::attendance_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceHeader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
