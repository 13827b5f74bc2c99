use crate::helpers::errors::{ApiError, conflict, from_compute, from_db, invalid_parameter, not_found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::SubjectDto;
use compute::reference::{Referenced, reference_count};
use compute::subject_code;
use model::entities::subject;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating or renaming a subject. The code is always generated.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SubjectRequest {
    pub name: String,
}

/// Preview of the code the next subject will get
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NextCodeResponse {
    pub code: String,
}

/// Create a new subject with a generated code
#[utoipa::path(
    post,
    path = "/api/v1/subjects",
    tag = "subjects",
    request_body = SubjectRequest,
    responses(
        (status = 201, description = "Subject created successfully", body = ApiResponse<SubjectDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "No free code could be allocated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_subject(
    State(state): State<AppState>,
    Json(request): Json<SubjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SubjectDto>>), ApiError> {
    trace!("Entering create_subject function");

    let created = subject_code::create_subject(&state.db, &request.name, state.store_timeout)
        .await
        .map_err(from_compute)?;

    info!("Subject created with ID: {}, code: {}", created.id, created.code);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(SubjectDto::from(created), "Subject created successfully")),
    ))
}

/// Preview the next generated subject code
#[utoipa::path(
    get,
    path = "/api/v1/subjects/next-code",
    tag = "subjects",
    responses(
        (status = 200, description = "Next code", body = ApiResponse<NextCodeResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn next_code(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NextCodeResponse>>, ApiError> {
    trace!("Entering next_code function");
    let code = subject_code::next_subject_code(&state.db, state.store_timeout)
        .await
        .map_err(from_compute)?;
    debug!("Next subject code is {}", code);
    Ok(Json(ApiResponse::ok(NextCodeResponse { code }, "Next code computed")))
}

/// Get all subjects ordered by ID
#[utoipa::path(
    get,
    path = "/api/v1/subjects",
    tag = "subjects",
    responses(
        (status = 200, description = "Subjects retrieved successfully", body = ApiResponse<Vec<SubjectDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_subjects(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SubjectDto>>>, ApiError> {
    trace!("Entering get_subjects function");

    let subjects = subject::Entity::find()
        .order_by_asc(subject::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| from_db(e, "listing subjects"))?;

    debug!("Retrieved {} subjects from database", subjects.len());
    let data: Vec<SubjectDto> = subjects.into_iter().map(SubjectDto::from).collect();
    Ok(Json(ApiResponse::ok(data, "Subjects retrieved successfully")))
}

/// Get a specific subject by ID
#[utoipa::path(
    get,
    path = "/api/v1/subjects/{subject_id}",
    tag = "subjects",
    params(
        ("subject_id" = i32, Path, description = "Subject ID"),
    ),
    responses(
        (status = 200, description = "Subject retrieved successfully", body = ApiResponse<SubjectDto>),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_subject(
    Path(subject_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SubjectDto>>, ApiError> {
    trace!("Entering get_subject function for subject_id: {}", subject_id);

    let found = subject::Entity::find_by_id(subject_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading subject"))?
        .ok_or_else(|| {
            warn!("Subject with ID {} not found", subject_id);
            not_found("Subject", subject_id)
        })?;

    Ok(Json(ApiResponse::ok(SubjectDto::from(found), "Subject retrieved successfully")))
}

/// Rename a subject; its code never changes
#[utoipa::path(
    put,
    path = "/api/v1/subjects/{subject_id}",
    tag = "subjects",
    params(
        ("subject_id" = i32, Path, description = "Subject ID"),
    ),
    request_body = SubjectRequest,
    responses(
        (status = 200, description = "Subject updated successfully", body = ApiResponse<SubjectDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_subject(
    Path(subject_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<SubjectRequest>,
) -> Result<Json<ApiResponse<SubjectDto>>, ApiError> {
    trace!("Entering update_subject function for subject_id: {}", subject_id);

    let name = request.name.trim();
    if name.is_empty() {
        return Err(invalid_parameter("Subject name must not be empty"));
    }

    let existing = subject::Entity::find_by_id(subject_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading subject"))?
        .ok_or_else(|| not_found("Subject", subject_id))?;

    let mut active: subject::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| from_db(e, "updating subject"))?;

    info!("Subject with ID {} renamed to {}", updated.id, updated.name);
    Ok(Json(ApiResponse::ok(SubjectDto::from(updated), "Subject updated successfully")))
}

/// Delete a subject that no session refers to
#[utoipa::path(
    delete,
    path = "/api/v1/subjects/{subject_id}",
    tag = "subjects",
    params(
        ("subject_id" = i32, Path, description = "Subject ID"),
    ),
    responses(
        (status = 200, description = "Subject deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 409, description = "Subject is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_subject(
    Path(subject_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_subject function for subject_id: {}", subject_id);

    let references = reference_count(&state.db, Referenced::Subject(subject_id), state.store_timeout)
        .await
        .map_err(from_compute)?;
    if references > 0 {
        warn!("Subject {} is used by {} sessions, refusing delete", subject_id, references);
        return Err(conflict(
            "SUBJECT_IN_USE",
            format!("Subject {} is still used by {} sessions", subject_id, references),
        ));
    }

    let result = subject::Entity::delete_by_id(subject_id)
        .exec(&state.db)
        .await
        .map_err(|e| from_db(e, "deleting subject"))?;

    if result.rows_affected == 0 {
        warn!("Subject with ID {} not found for deletion", subject_id);
        return Err(not_found("Subject", subject_id));
    }

    info!("Subject with ID {} deleted successfully", subject_id);
    Ok(Json(ApiResponse::ok(
        format!("Subject {} deleted", subject_id),
        "Subject deleted successfully",
    )))
}
