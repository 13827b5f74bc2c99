use crate::helpers::errors::{ApiError, conflict, from_compute, from_db, invalid_parameter, not_found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::TrackDto;
use compute::reference::{Referenced, reference_count};
use model::entities::track;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating or updating a track
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TrackRequest {
    /// Short code, e.g. "TKJ"
    pub code: String,
    pub name: String,
}

impl TrackRequest {
    fn validated(&self) -> Result<(String, String), ApiError> {
        let code = self.code.trim();
        let name = self.name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(invalid_parameter("Track code and name are required"));
        }
        Ok((code.to_string(), name.to_string()))
    }
}

/// Create a new track
#[utoipa::path(
    post,
    path = "/api/v1/tracks",
    tag = "tracks",
    request_body = TrackRequest,
    responses(
        (status = 201, description = "Track created successfully", body = ApiResponse<TrackDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_track(
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TrackDto>>), ApiError> {
    trace!("Entering create_track function");
    let (code, name) = request.validated()?;

    let created = track::ActiveModel {
        code: Set(code),
        name: Set(name),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| from_db(e, "creating track"))?;

    info!("Track created successfully with ID: {}, code: {}", created.id, created.code);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(TrackDto::from(created), "Track created successfully")),
    ))
}

/// Get all tracks ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/tracks",
    tag = "tracks",
    responses(
        (status = 200, description = "Tracks retrieved successfully", body = ApiResponse<Vec<TrackDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_tracks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TrackDto>>>, ApiError> {
    trace!("Entering get_tracks function");

    let tracks = track::Entity::find()
        .order_by_asc(track::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| from_db(e, "listing tracks"))?;

    debug!("Retrieved {} tracks from database", tracks.len());
    let data: Vec<TrackDto> = tracks.into_iter().map(TrackDto::from).collect();
    Ok(Json(ApiResponse::ok(data, "Tracks retrieved successfully")))
}

/// Get a specific track by ID
#[utoipa::path(
    get,
    path = "/api/v1/tracks/{track_id}",
    tag = "tracks",
    params(
        ("track_id" = i32, Path, description = "Track ID"),
    ),
    responses(
        (status = 200, description = "Track retrieved successfully", body = ApiResponse<TrackDto>),
        (status = 404, description = "Track not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_track(
    Path(track_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TrackDto>>, ApiError> {
    trace!("Entering get_track function for track_id: {}", track_id);

    let found = track::Entity::find_by_id(track_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading track"))?
        .ok_or_else(|| {
            warn!("Track with ID {} not found", track_id);
            not_found("Track", track_id)
        })?;

    Ok(Json(ApiResponse::ok(TrackDto::from(found), "Track retrieved successfully")))
}

/// Update a track
#[utoipa::path(
    put,
    path = "/api/v1/tracks/{track_id}",
    tag = "tracks",
    params(
        ("track_id" = i32, Path, description = "Track ID"),
    ),
    request_body = TrackRequest,
    responses(
        (status = 200, description = "Track updated successfully", body = ApiResponse<TrackDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Track not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_track(
    Path(track_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>,
) -> Result<Json<ApiResponse<TrackDto>>, ApiError> {
    trace!("Entering update_track function for track_id: {}", track_id);
    let (code, name) = request.validated()?;

    let existing = track::Entity::find_by_id(track_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading track"))?
        .ok_or_else(|| not_found("Track", track_id))?;

    let mut active: track::ActiveModel = existing.into();
    active.code = Set(code);
    active.name = Set(name);
    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| from_db(e, "updating track"))?;

    info!("Track with ID {} updated successfully", updated.id);
    Ok(Json(ApiResponse::ok(TrackDto::from(updated), "Track updated successfully")))
}

/// Delete a track that no student or session refers to
#[utoipa::path(
    delete,
    path = "/api/v1/tracks/{track_id}",
    tag = "tracks",
    params(
        ("track_id" = i32, Path, description = "Track ID"),
    ),
    responses(
        (status = 200, description = "Track deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Track not found", body = ErrorResponse),
        (status = 409, description = "Track is still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_track(
    Path(track_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_track function for track_id: {}", track_id);

    let references = reference_count(&state.db, Referenced::Track(track_id), state.store_timeout)
        .await
        .map_err(from_compute)?;
    if references > 0 {
        warn!("Track {} is referenced {} times, refusing delete", track_id, references);
        return Err(conflict(
            "TRACK_IN_USE",
            format!("Track {} is still used by {} students or sessions", track_id, references),
        ));
    }

    let result = track::Entity::delete_by_id(track_id)
        .exec(&state.db)
        .await
        .map_err(|e| from_db(e, "deleting track"))?;

    if result.rows_affected == 0 {
        warn!("Track with ID {} not found for deletion", track_id);
        return Err(not_found("Track", track_id));
    }

    info!("Track with ID {} deleted successfully", track_id);
    Ok(Json(ApiResponse::ok(
        format!("Track {} deleted", track_id),
        "Track deleted successfully",
    )))
}
