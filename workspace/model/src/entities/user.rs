use common::Role;
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UserRole {
    #[sea_orm(string_value = "SuperUser")]
    SuperUser,
    #[sea_orm(string_value = "Admin")]
    Admin,
    #[sea_orm(string_value = "Teacher")]
    Teacher,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::SuperUser => Role::SuperUser,
            UserRole::Admin => Role::Admin,
            UserRole::Teacher => Role::Teacher,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::SuperUser => UserRole::SuperUser,
            Role::Admin => UserRole::Admin,
            Role::Teacher => UserRole::Teacher,
        }
    }
}

/// A staff account of the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string; carries its own salt and parameters.
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::UserDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role.into(),
        }
    }
}
