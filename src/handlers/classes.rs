use crate::helpers::errors::{ApiError, conflict, from_compute, from_db, invalid_parameter, not_found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::ClassDto;
use compute::reference::{Referenced, reference_count};
use model::entities::class_section;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating or renaming a class section
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ClassRequest {
    /// Display name, e.g. "X-1"
    pub name: String,
}

fn required_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid_parameter("Class name must not be empty"));
    }
    Ok(name.to_string())
}

/// Create a new class section
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    tag = "classes",
    request_body = ClassRequest,
    responses(
        (status = 201, description = "Class created successfully", body = ApiResponse<ClassDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_class(
    State(state): State<AppState>,
    Json(request): Json<ClassRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClassDto>>), ApiError> {
    trace!("Entering create_class function");
    let name = required_name(&request.name)?;

    let created = class_section::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| from_db(e, "creating class"))?;

    info!("Class created successfully with ID: {}, name: {}", created.id, created.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ClassDto::from(created), "Class created successfully")),
    ))
}

/// Get all class sections ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    tag = "classes",
    responses(
        (status = 200, description = "Classes retrieved successfully", body = ApiResponse<Vec<ClassDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_classes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ClassDto>>>, ApiError> {
    trace!("Entering get_classes function");

    let classes = class_section::Entity::find()
        .order_by_asc(class_section::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| from_db(e, "listing classes"))?;

    debug!("Retrieved {} classes from database", classes.len());
    let data: Vec<ClassDto> = classes.into_iter().map(ClassDto::from).collect();
    Ok(Json(ApiResponse::ok(data, "Classes retrieved successfully")))
}

/// Get a specific class section by ID
#[utoipa::path(
    get,
    path = "/api/v1/classes/{class_id}",
    tag = "classes",
    params(
        ("class_id" = i32, Path, description = "Class ID"),
    ),
    responses(
        (status = 200, description = "Class retrieved successfully", body = ApiResponse<ClassDto>),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_class(
    Path(class_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ClassDto>>, ApiError> {
    trace!("Entering get_class function for class_id: {}", class_id);

    match class_section::Entity::find_by_id(class_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading class"))?
    {
        Some(class) => Ok(Json(ApiResponse::ok(
            ClassDto::from(class),
            "Class retrieved successfully",
        ))),
        None => {
            warn!("Class with ID {} not found", class_id);
            Err(not_found("Class", class_id))
        }
    }
}

/// Rename a class section
#[utoipa::path(
    put,
    path = "/api/v1/classes/{class_id}",
    tag = "classes",
    params(
        ("class_id" = i32, Path, description = "Class ID"),
    ),
    request_body = ClassRequest,
    responses(
        (status = 200, description = "Class updated successfully", body = ApiResponse<ClassDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_class(
    Path(class_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<ClassRequest>,
) -> Result<Json<ApiResponse<ClassDto>>, ApiError> {
    trace!("Entering update_class function for class_id: {}", class_id);
    let name = required_name(&request.name)?;

    let existing = class_section::Entity::find_by_id(class_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading class"))?
        .ok_or_else(|| {
            warn!("Class with ID {} not found for update", class_id);
            not_found("Class", class_id)
        })?;

    let mut active: class_section::ActiveModel = existing.into();
    active.name = Set(name);
    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| from_db(e, "updating class"))?;

    info!("Class with ID {} renamed to {}", updated.id, updated.name);
    Ok(Json(ApiResponse::ok(ClassDto::from(updated), "Class updated successfully")))
}

/// Delete a class section that no student or session refers to
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{class_id}",
    tag = "classes",
    params(
        ("class_id" = i32, Path, description = "Class ID"),
    ),
    responses(
        (status = 200, description = "Class deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 409, description = "Class is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_class(
    Path(class_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_class function for class_id: {}", class_id);

    let references = reference_count(&state.db, Referenced::Class(class_id), state.store_timeout)
        .await
        .map_err(from_compute)?;
    if references > 0 {
        warn!("Class {} is referenced {} times, refusing delete", class_id, references);
        return Err(conflict(
            "CLASS_IN_USE",
            format!("Class {} is still used by {} students or sessions", class_id, references),
        ));
    }

    let result = class_section::Entity::delete_by_id(class_id)
        .exec(&state.db)
        .await
        .map_err(|e| from_db(e, "deleting class"))?;
    debug!("Delete operation completed. Rows affected: {}", result.rows_affected);

    if result.rows_affected == 0 {
        warn!("Class with ID {} not found for deletion", class_id);
        return Err(not_found("Class", class_id));
    }

    info!("Class with ID {} deleted successfully", class_id);
    Ok(Json(ApiResponse::ok(
        format!("Class {} deleted", class_id),
        "Class deleted successfully",
    )))
}
