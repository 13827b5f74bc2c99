use crate::handlers::{
    attendance::{query_sessions, record_session},
    classes::{create_class, delete_class, get_class, get_classes, update_class},
    health::health_check,
    reports::{month_export, month_grid, month_summary, student_history},
    students::{create_student, delete_student, get_student, get_students, update_student},
    subjects::{create_subject, delete_subject, get_subject, get_subjects, next_code, update_subject},
    tracks::{create_track, delete_track, get_track, get_tracks, update_track},
    users::{create_user, delete_user, get_user, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Attendance sessions
        .route(
            "/api/v1/attendance",
            post(record_session).get(query_sessions),
        )
        // Reports
        .route("/api/v1/reports/month", get(month_grid))
        .route("/api/v1/reports/month/summary", get(month_summary))
        .route("/api/v1/reports/month/export", get(month_export))
        .route("/api/v1/reports/student", get(student_history))
        // Class CRUD routes
        .route("/api/v1/classes", post(create_class).get(get_classes))
        .route(
            "/api/v1/classes/:class_id",
            get(get_class).put(update_class).delete(delete_class),
        )
        // Track CRUD routes
        .route("/api/v1/tracks", post(create_track).get(get_tracks))
        .route(
            "/api/v1/tracks/:track_id",
            get(get_track).put(update_track).delete(delete_track),
        )
        // Subject CRUD routes
        .route("/api/v1/subjects", post(create_subject).get(get_subjects))
        .route("/api/v1/subjects/next-code", get(next_code))
        .route(
            "/api/v1/subjects/:subject_id",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
        // Student CRUD routes
        .route("/api/v1/students", post(create_student).get(get_students))
        .route(
            "/api/v1/students/:student_id",
            get(get_student).put(update_student).delete(delete_student),
        )
        // User CRUD routes
        .route("/api/v1/users", post(create_user).get(get_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
