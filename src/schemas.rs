use common::{
    ClassDto, GridRow, HistoryMonth, MonthGrid, MonthReport, ReportDay, ReportRow, Role, Session,
    SessionEntry, SessionRecord, Status, StatusTally, StudentDto, StudentHistory, SubjectDto,
    TrackDto, UserDto,
};
use compute::HolidayCalendar;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::{OpenApi, ToSchema};

use crate::handlers::attendance::RecordSessionRequest;
use crate::handlers::classes::ClassRequest;
use crate::handlers::students::{CreateStudentRequest, UpdateStudentRequest};
use crate::handlers::subjects::{NextCodeResponse, SubjectRequest};
use crate::handlers::tracks::TrackRequest;
use crate::handlers::users::{CreateUserRequest, UpdateUserRequest};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Holiday lookup used by the monthly report
    pub holidays: Arc<dyn HolidayCalendar>,
    /// Deadline of every store call made by the core components
    pub store_timeout: Duration,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::attendance::record_session,
        crate::handlers::attendance::query_sessions,
        crate::handlers::reports::month_grid,
        crate::handlers::reports::month_summary,
        crate::handlers::reports::month_export,
        crate::handlers::reports::student_history,
        crate::handlers::classes::create_class,
        crate::handlers::classes::get_classes,
        crate::handlers::classes::get_class,
        crate::handlers::classes::update_class,
        crate::handlers::classes::delete_class,
        crate::handlers::tracks::create_track,
        crate::handlers::tracks::get_tracks,
        crate::handlers::tracks::get_track,
        crate::handlers::tracks::update_track,
        crate::handlers::tracks::delete_track,
        crate::handlers::subjects::create_subject,
        crate::handlers::subjects::get_subjects,
        crate::handlers::subjects::get_subject,
        crate::handlers::subjects::update_subject,
        crate::handlers::subjects::delete_subject,
        crate::handlers::subjects::next_code,
        crate::handlers::students::create_student,
        crate::handlers::students::get_students,
        crate::handlers::students::get_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
    ),
    components(
        schemas(
            ApiResponse<SessionRecord>,
            ApiResponse<Vec<Session>>,
            ApiResponse<MonthGrid>,
            ApiResponse<MonthReport>,
            ApiResponse<StudentHistory>,
            ErrorResponse,
            HealthResponse,
            Status,
            StatusTally,
            SessionEntry,
            SessionRecord,
            Session,
            MonthGrid,
            GridRow,
            MonthReport,
            ReportDay,
            ReportRow,
            StudentHistory,
            HistoryMonth,
            ClassDto,
            TrackDto,
            SubjectDto,
            StudentDto,
            Role,
            UserDto,
            RecordSessionRequest,
            ClassRequest,
            TrackRequest,
            SubjectRequest,
            NextCodeResponse,
            CreateStudentRequest,
            UpdateStudentRequest,
            CreateUserRequest,
            UpdateUserRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "attendance", description = "Attendance recording endpoints"),
        (name = "reports", description = "Monthly and per-student attendance reports"),
        (name = "classes", description = "Class section management"),
        (name = "tracks", description = "Track management"),
        (name = "subjects", description = "Subject management"),
        (name = "students", description = "Student management"),
        (name = "users", description = "User account management"),
    ),
    info(
        title = "Rollbook API",
        description = "School attendance recording and monthly attendance reporting",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
