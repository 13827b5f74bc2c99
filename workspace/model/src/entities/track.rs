use sea_orm::entity::prelude::*;

/// A track (major / vocational program) students are enrolled in.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tracks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Free-text short code, e.g. "TKJ". Not required to be unique.
    pub code: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student::Entity")]
    Student,
    #[sea_orm(has_many = "super::attendance_header::Entity")]
    AttendanceHeader,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::attendance_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceHeader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::TrackDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
        }
    }
}
