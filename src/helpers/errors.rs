use axum::{http::StatusCode, response::Json};
use compute::ComputeError;
use compute::error::{is_foreign_key_violation, is_unique_violation};
use sea_orm::DbErr;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

pub fn missing_parameter(name: &str) -> ApiError {
    api_error(
        StatusCode::BAD_REQUEST,
        "MISSING_PARAMETER",
        format!("Parameter '{}' is required", name),
    )
}

pub fn invalid_parameter(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "INVALID_PARAMETER", message)
}

pub fn not_found(what: &str, id: impl std::fmt::Display) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        format!("{} with ID {} not found", what, id),
    )
}

pub fn conflict(code: &str, message: impl Into<String>) -> ApiError {
    api_error(StatusCode::CONFLICT, code, message)
}

/// Maps a core error onto its HTTP status and error code.
pub fn from_compute(err: ComputeError) -> ApiError {
    match err {
        ComputeError::Validation(message) => {
            warn!("Rejected request: {}", message);
            invalid_parameter(message)
        }
        ComputeError::Conflict(message) => {
            warn!("Conflict: {}", message);
            conflict("CONFLICT", message)
        }
        ComputeError::Timeout(limit) => {
            error!("Store call timed out after {:?}", limit);
            api_error(
                StatusCode::GATEWAY_TIMEOUT,
                "STORE_TIMEOUT",
                "The data store did not answer in time",
            )
        }
        ComputeError::Database(db_error) => from_db(db_error, "processing request"),
        other => {
            error!("Request failed: {}", other);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                format!("Internal server error: {}", other),
            )
        }
    }
}

/// Maps a database error raised while `action`. Constraint violations become 409.
pub fn from_db(db_error: DbErr, action: &str) -> ApiError {
    if is_unique_violation(&db_error) {
        warn!("Unique constraint violated while {}: {}", action, db_error);
        return conflict(
            "ALREADY_EXISTS",
            format!("A record with the same unique value already exists ({})", action),
        );
    }
    if is_foreign_key_violation(&db_error) {
        warn!("Reference constraint violated while {}: {}", action, db_error);
        return conflict(
            "REFERENCE_CONFLICT",
            format!("The record is referenced by or references missing data ({})", action),
        );
    }
    error!("Database error while {}: {}", action, db_error);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "DATABASE_ERROR",
        format!("Internal server error while {}", action),
    )
}
