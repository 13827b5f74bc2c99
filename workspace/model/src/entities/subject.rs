use sea_orm::entity::prelude::*;

/// Prefix of generated subject codes.
pub const CODE_PREFIX: &str = "MPL";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Generated sequence code, e.g. "MPL04".
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_header::Entity")]
    AttendanceHeader,
}

impl Related<super::attendance_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceHeader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::SubjectDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
        }
    }
}

/// Extracts the digits of a subject code as a number ("MPL07" -> 7).
/// Codes without digits count as zero.
pub fn code_number(code: &str) -> u32 {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Formats a sequence number as a subject code, zero-padded to two digits.
pub fn format_code(number: u32) -> String {
    format!("{}{:02}", CODE_PREFIX, number)
}
