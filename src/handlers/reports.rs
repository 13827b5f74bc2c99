use crate::helpers::errors::{ApiError, from_compute, invalid_parameter, missing_parameter};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use axum_valid::Valid;
use common::{MonthGrid, MonthReport, StudentHistory};
use compute::report::{csv_file_name, load_holidays, render_month_report, write_csv};
use compute::{MonthQuery, MonthlyAggregator, StudentHistoryAggregator, YearMonth};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::IntoParams;
use validator::Validate;

/// Query parameters shared by the monthly report endpoints
#[derive(Debug, Deserialize, Serialize, IntoParams, Validate)]
pub struct MonthReportQuery {
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
    pub subject_id: Option<i32>,
    /// Month number (1-12)
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u32>,
    /// Four digit year
    #[validate(range(min = 1900, max = 9999))]
    pub year: Option<i32>,
}

impl MonthReportQuery {
    fn to_month_query(&self) -> Result<MonthQuery, ApiError> {
        Ok(MonthQuery {
            class_id: self.class_id.ok_or_else(|| missing_parameter("class_id"))?,
            track_id: self.track_id.ok_or_else(|| missing_parameter("track_id"))?,
            subject_id: self.subject_id.ok_or_else(|| missing_parameter("subject_id"))?,
            month: self.month.ok_or_else(|| missing_parameter("month"))?,
            year: self.year.ok_or_else(|| missing_parameter("year"))?,
        })
    }
}

/// Query parameters of the student history endpoint
#[derive(Debug, Deserialize, Serialize, IntoParams, Validate)]
pub struct StudentHistoryQuery {
    /// Student identification number
    #[validate(length(min = 1, max = 64))]
    pub nis: Option<String>,
    /// First month (YYYY-MM)
    pub start: Option<String>,
    /// Last month (YYYY-MM), inclusive
    pub end: Option<String>,
}

async fn build_grid(state: &AppState, query: &MonthReportQuery) -> Result<MonthGrid, ApiError> {
    let month_query = query.to_month_query()?;
    MonthlyAggregator::new(state.db.clone(), state.store_timeout)
        .build_month_grid(month_query)
        .await
        .map_err(from_compute)
}

async fn build_report(state: &AppState, query: &MonthReportQuery) -> Result<MonthReport, ApiError> {
    let grid = build_grid(state, query).await?;
    let holidays = load_holidays(state.holidays.as_ref(), grid.year).await;
    debug!(
        "Rendering report with {} students, holidays available: {}",
        grid.students.len(),
        holidays.is_some()
    );
    render_month_report(&grid, holidays.as_ref()).map_err(from_compute)
}

/// Dense student-by-day status grid of one month
#[utoipa::path(
    get,
    path = "/api/v1/reports/month",
    tag = "reports",
    params(MonthReportQuery),
    responses(
        (status = 200, description = "Month grid", body = ApiResponse<MonthGrid>),
        (status = 400, description = "Missing or invalid parameter", body = ErrorResponse),
        (status = 504, description = "Store timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn month_grid(
    Valid(Query(query)): Valid<Query<MonthReportQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MonthGrid>>, ApiError> {
    trace!("Entering month_grid function");
    let grid = build_grid(&state, &query).await?;
    info!(
        "Built month grid {}-{:02} with {} students",
        grid.year,
        grid.month,
        grid.students.len()
    );
    Ok(Json(ApiResponse::ok(grid, "Month grid retrieved successfully")))
}

/// Rendered monthly report: day flags, symbols and tallies
#[utoipa::path(
    get,
    path = "/api/v1/reports/month/summary",
    tag = "reports",
    params(MonthReportQuery),
    responses(
        (status = 200, description = "Rendered report", body = ApiResponse<MonthReport>),
        (status = 400, description = "Missing or invalid parameter", body = ErrorResponse),
        (status = 504, description = "Store timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn month_summary(
    Valid(Query(query)): Valid<Query<MonthReportQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MonthReport>>, ApiError> {
    trace!("Entering month_summary function");
    let report = build_report(&state, &query).await?;
    info!("Rendered month report with {} rows", report.rows.len());
    Ok(Json(ApiResponse::ok(report, "Month report rendered successfully")))
}

/// Monthly report as a CSV spreadsheet
#[utoipa::path(
    get,
    path = "/api/v1/reports/month/export",
    tag = "reports",
    params(MonthReportQuery),
    responses(
        (status = 200, description = "CSV spreadsheet", content_type = "text/csv", body = String),
        (status = 400, description = "Missing or invalid parameter", body = ErrorResponse),
        (status = 504, description = "Store timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn month_export(
    Valid(Query(query)): Valid<Query<MonthReportQuery>>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    trace!("Entering month_export function");
    let report = build_report(&state, &query).await?;
    let body = write_csv(&report).map_err(from_compute)?;
    let file_name = csv_file_name(report.year, report.month);

    info!("Exported {} ({} bytes)", file_name, body.len());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response())
}

/// Per-student attendance across an inclusive month range (at most 24 months)
#[utoipa::path(
    get,
    path = "/api/v1/reports/student",
    tag = "reports",
    params(StudentHistoryQuery),
    responses(
        (status = 200, description = "Student history", body = ApiResponse<StudentHistory>),
        (status = 400, description = "Missing or invalid parameter", body = ErrorResponse),
        (status = 504, description = "Store timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn student_history(
    Valid(Query(query)): Valid<Query<StudentHistoryQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StudentHistory>>, ApiError> {
    trace!("Entering student_history function");

    let nis = query.nis.as_deref().ok_or_else(|| missing_parameter("nis"))?;
    let start: YearMonth = query
        .start
        .as_deref()
        .ok_or_else(|| missing_parameter("start"))?
        .parse()
        .map_err(|e: compute::ComputeError| invalid_parameter(format!("start: {}", e)))?;
    let end: YearMonth = query
        .end
        .as_deref()
        .ok_or_else(|| missing_parameter("end"))?
        .parse()
        .map_err(|e: compute::ComputeError| invalid_parameter(format!("end: {}", e)))?;

    let history = StudentHistoryAggregator::new(state.db.clone(), state.store_timeout)
        .build_student_history(nis, start, end)
        .await
        .map_err(from_compute)?;

    info!(
        "Built history of {} over {} months",
        history.nis,
        history.months.len()
    );
    Ok(Json(ApiResponse::ok(history, "Student history retrieved successfully")))
}
