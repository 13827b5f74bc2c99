use crate::helpers::errors::{ApiError, api_error, from_db, invalid_parameter, not_found};
use crate::helpers::password::{hash_password, verify_password};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::{Role, UserDto};
use model::entities::user;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new user
#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    /// Username (must be unique)
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Request body for updating a user
#[derive(Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Username (must be unique)
    pub username: Option<String>,
    /// New password; the stored digest is replaced
    pub password: Option<String>,
    pub role: Option<Role>,
}

// Passwords stay out of span fields and logs.
impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

fn required_username(username: &str) -> Result<String, ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(invalid_parameter("Username must not be empty"));
    }
    Ok(username.to_string())
}

fn required_password(password: &str) -> Result<&str, ApiError> {
    if password.is_empty() {
        return Err(invalid_parameter("Password must not be empty"));
    }
    Ok(password)
}

fn hashed(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "PASSWORD_HASH_ERROR",
            "Failed to hash password",
        )
    })
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    trace!("Entering create_user function");
    let username = required_username(&request.username)?;
    let password_hash = hashed(required_password(&request.password)?)?;
    debug!("Creating user with username: {}", username);

    let created = user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        role: Set(request.role.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| from_db(e, "creating user"))?;

    info!(
        "User created successfully with ID: {}, username: {}",
        created.id, created.username
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserDto::from(created), "User created successfully")),
    ))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    trace!("Entering get_users function");

    let users = user::Entity::find()
        .order_by_asc(user::Column::Username)
        .all(&state.db)
        .await
        .map_err(|e| from_db(e, "listing users"))?;

    debug!("Retrieved {} users from database", users.len());
    let data: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok(Json(ApiResponse::ok(data, "Users retrieved successfully")))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);

    match user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading user"))?
    {
        Some(found) => Ok(Json(ApiResponse::ok(
            UserDto::from(found),
            "User retrieved successfully",
        ))),
        None => {
            warn!("User with ID {} not found", user_id);
            Err(not_found("User", user_id))
        }
    }
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    trace!("Entering update_user function for user_id: {}", user_id);

    let existing = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading user"))?
        .ok_or_else(|| {
            warn!("User with ID {} not found for update", user_id);
            not_found("User", user_id)
        })?;

    let current_hash = existing.password_hash.clone();
    let mut active: user::ActiveModel = existing.into();
    if let Some(username) = &request.username {
        active.username = Set(required_username(username)?);
    }
    if let Some(password) = &request.password {
        let password = required_password(password)?;
        if verify_password(password, &current_hash) {
            debug!("Password for user {} unchanged", user_id);
        } else {
            active.password_hash = Set(hashed(password)?);
            debug!("Password replaced for user {}", user_id);
        }
    }
    if let Some(role) = request.role {
        active.role = Set(role.into());
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| from_db(e, "updating user"))?;

    info!("User with ID {} updated successfully", updated.id);
    Ok(Json(ApiResponse::ok(UserDto::from(updated), "User updated successfully")))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    let result = user::Entity::delete_by_id(user_id)
        .exec(&state.db)
        .await
        .map_err(|e| from_db(e, "deleting user"))?;

    if result.rows_affected == 0 {
        warn!("User with ID {} not found for deletion", user_id);
        return Err(not_found("User", user_id));
    }

    info!("User with ID {} deleted successfully", user_id);
    Ok(Json(ApiResponse::ok(
        format!("User {} deleted", user_id),
        "User deleted successfully",
    )))
}
