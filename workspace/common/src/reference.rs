use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Class section (e.g. "X-1").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassDto {
    pub id: i32,
    pub name: String,
}

/// Track (major) a student is enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrackDto {
    pub id: i32,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubjectDto {
    pub id: i32,
    /// Generated code, e.g. "MPL03"
    pub code: String,
    pub name: String,
}

/// Student joined with the names of its class and track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentDto {
    pub id: i32,
    pub nis: String,
    pub name: String,
    /// "L" or "P"
    pub sex: Option<String>,
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
    pub class_name: Option<String>,
    pub track_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    SuperUser,
    Admin,
    Teacher,
}

/// User account. The password digest is never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub role: Role,
}
