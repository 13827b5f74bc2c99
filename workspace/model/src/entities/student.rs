use sea_orm::entity::prelude::*;

/// A student. `nis` is the natural key used by attendance lines; the surrogate
/// `id` is only used by the CRUD endpoints.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nis: String,
    pub name: String,
    /// "L" (male) or "P" (female)
    pub sex: Option<String>,
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
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

impl ActiveModelBehavior for ActiveModel {}
