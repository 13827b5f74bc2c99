use crate::helpers::errors::{ApiError, from_compute, missing_parameter};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use common::{Session, SessionEntry, SessionRecord};
use compute::{AttendanceRecorder, SessionFilter, SessionKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};

/// Request body for recording one attendance session.
///
/// The identifying fields are optional at the wire level so that a missing
/// one is reported as `MISSING_PARAMETER` instead of a generic body rejection.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecordSessionRequest {
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
    pub subject_id: Option<i32>,
    /// Session date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Full list of lines; an empty list clears the session
    #[serde(default)]
    pub entries: Vec<SessionEntry>,
}

/// Query parameters for listing sessions
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct SessionQuery {
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
    pub subject_id: Option<i32>,
    /// Session date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
}

/// Record (create or replace) an attendance session
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    tag = "attendance",
    request_body = RecordSessionRequest,
    responses(
        (status = 201, description = "Session recorded", body = ApiResponse<SessionRecord>),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 504, description = "Store timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn record_session(
    State(state): State<AppState>,
    Json(request): Json<RecordSessionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionRecord>>), ApiError> {
    trace!("Entering record_session function");

    let key = SessionKey {
        class_id: request.class_id.ok_or_else(|| missing_parameter("class_id"))?,
        track_id: request.track_id.ok_or_else(|| missing_parameter("track_id"))?,
        subject_id: request.subject_id.ok_or_else(|| missing_parameter("subject_id"))?,
        date: request.date.ok_or_else(|| missing_parameter("date"))?,
    };
    debug!("Recording session {:?} with {} entries", key, request.entries.len());

    let recorder = AttendanceRecorder::new(state.db.clone(), state.store_timeout);
    let record = recorder
        .record_session(key, &request.entries)
        .await
        .map_err(from_compute)?;

    info!("Attendance session {} recorded", record.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(record, "Attendance recorded successfully")),
    ))
}

/// List recorded sessions with their entries
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    tag = "attendance",
    params(SessionQuery),
    responses(
        (status = 200, description = "Sessions retrieved", body = ApiResponse<Vec<Session>>),
        (status = 504, description = "Store timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn query_sessions(
    Query(query): Query<SessionQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Session>>>, ApiError> {
    trace!("Entering query_sessions function");

    let filter = SessionFilter {
        class_id: query.class_id,
        track_id: query.track_id,
        subject_id: query.subject_id,
        date: query.date,
    };

    let recorder = AttendanceRecorder::new(state.db.clone(), state.store_timeout);
    let sessions = recorder.query_sessions(filter).await.map_err(from_compute)?;

    info!("Retrieved {} attendance sessions", sessions.len());
    Ok(Json(ApiResponse::ok(sessions, "Sessions retrieved successfully")))
}
