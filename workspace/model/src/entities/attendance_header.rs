use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// One attendance-taking session. The tuple (class, track, subject, date) is the
/// natural key and is unique in the database.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub class_id: i32,
    pub track_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_section::Entity",
        from = "Column::ClassId",
        to = "super::class_section::Column::Id"
    )]
    ClassSection,
    #[sea_orm(
        belongs_to = "super::track::Entity",
        from = "Column::TrackId",
        to = "super::track::Column::Id"
    )]
    Track,
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
    #[sea_orm(has_many = "super::attendance_line::Entity")]
    AttendanceLine,
}

impl Related<super::attendance_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceLine.def()
    }
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl Related<super::track::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Track.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
