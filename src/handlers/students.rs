use crate::helpers::errors::{ApiError, conflict, from_compute, from_db, invalid_parameter, not_found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::StudentDto;
use compute::reference::has_attendance;
use model::entities::{class_section, student, track};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateStudentRequest {
    /// Student registration number, unique across the school
    pub nis: String,
    pub name: String,
    /// "L" or "P"
    pub sex: Option<String>,
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
}

/// Fields left out are kept as they are
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub nis: Option<String>,
    pub name: Option<String>,
    pub sex: Option<String>,
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StudentListQuery {
    pub class_id: Option<i32>,
    pub track_id: Option<i32>,
}

fn required(value: &str, field: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid_parameter(format!("Student {} must not be empty", field)));
    }
    Ok(value.to_string())
}

fn checked_sex(sex: Option<&str>) -> Result<Option<String>, ApiError> {
    match sex.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s @ ("L" | "P")) => Ok(Some(s.to_string())),
        Some(other) => Err(invalid_parameter(format!(
            "Invalid sex '{}', expected L or P",
            other
        ))),
    }
}

/// Student row with its class and track names joined in
#[derive(Debug, FromQueryResult)]
struct NamedStudent {
    id: i32,
    nis: String,
    name: String,
    sex: Option<String>,
    class_id: Option<i32>,
    track_id: Option<i32>,
    class_name: Option<String>,
    track_name: Option<String>,
}

impl From<NamedStudent> for StudentDto {
    fn from(row: NamedStudent) -> Self {
        Self {
            id: row.id,
            nis: row.nis,
            name: row.name,
            sex: row.sex,
            class_id: row.class_id,
            track_id: row.track_id,
            class_name: row.class_name,
            track_name: row.track_name,
        }
    }
}

/// Students left-joined with the names of their class and track
fn named_students() -> Select<student::Entity> {
    student::Entity::find()
        .column_as(class_section::Column::Name, "class_name")
        .column_as(track::Column::Name, "track_name")
        .join(JoinType::LeftJoin, student::Relation::ClassSection.def())
        .join(JoinType::LeftJoin, student::Relation::Track.def())
}

async fn named_student(state: &AppState, student_id: i32) -> Result<StudentDto, ApiError> {
    named_students()
        .filter(student::Column::Id.eq(student_id))
        .into_model::<NamedStudent>()
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading student"))?
        .map(StudentDto::from)
        .ok_or_else(|| {
            warn!("Student with ID {} not found", student_id);
            not_found("Student", student_id)
        })
}

async fn find_student(state: &AppState, student_id: i32) -> Result<student::Model, ApiError> {
    student::Entity::find_by_id(student_id)
        .one(&state.db)
        .await
        .map_err(|e| from_db(e, "loading student"))?
        .ok_or_else(|| {
            warn!("Student with ID {} not found", student_id);
            not_found("Student", student_id)
        })
}

/// Register a new student
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created successfully", body = ApiResponse<StudentDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "NIS already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StudentDto>>), ApiError> {
    trace!("Entering create_student function");

    let nis = required(&request.nis, "NIS")?;
    let name = required(&request.name, "name")?;
    let sex = checked_sex(request.sex.as_deref())?;

    let created = student::ActiveModel {
        nis: Set(nis),
        name: Set(name),
        sex: Set(sex),
        class_id: Set(request.class_id),
        track_id: Set(request.track_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| from_db(e, "creating student"))?;

    info!("Student created with ID: {}, NIS: {}", created.id, created.nis);
    let dto = named_student(&state, created.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(dto, "Student created successfully")),
    ))
}

/// List students ordered by name, optionally filtered by class and track
#[utoipa::path(
    get,
    path = "/api/v1/students",
    tag = "students",
    params(StudentListQuery),
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<StudentDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_students(
    Query(query): Query<StudentListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StudentDto>>>, ApiError> {
    trace!("Entering get_students function");

    let mut select = named_students();
    if let Some(class_id) = query.class_id {
        select = select.filter(student::Column::ClassId.eq(class_id));
    }
    if let Some(track_id) = query.track_id {
        select = select.filter(student::Column::TrackId.eq(track_id));
    }
    let data: Vec<StudentDto> = select
        .order_by_asc(student::Column::Name)
        .order_by_asc(student::Column::Nis)
        .into_model::<NamedStudent>()
        .all(&state.db)
        .await
        .map_err(|e| from_db(e, "listing students"))?
        .into_iter()
        .map(StudentDto::from)
        .collect();

    debug!("Retrieved {} students from database", data.len());
    Ok(Json(ApiResponse::ok(data, "Students retrieved successfully")))
}

/// Get a specific student by ID
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<StudentDto>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StudentDto>>, ApiError> {
    trace!("Entering get_student function for student_id: {}", student_id);

    let dto = named_student(&state, student_id).await?;
    Ok(Json(ApiResponse::ok(dto, "Student retrieved successfully")))
}

/// Update a student. The NIS is locked once attendance has been recorded for it.
#[utoipa::path(
    put,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated successfully", body = ApiResponse<StudentDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 409, description = "NIS taken or locked by attendance", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateStudentRequest>,
) -> Result<Json<ApiResponse<StudentDto>>, ApiError> {
    trace!("Entering update_student function for student_id: {}", student_id);

    let existing = find_student(&state, student_id).await?;
    let old_nis = existing.nis.clone();
    let mut active: student::ActiveModel = existing.into();

    if let Some(nis) = &request.nis {
        let nis = required(nis, "NIS")?;
        if nis != old_nis {
            let locked = has_attendance(&state.db, &old_nis, state.store_timeout)
                .await
                .map_err(from_compute)?;
            if locked {
                warn!("Refusing NIS change for {}: attendance already recorded", old_nis);
                return Err(conflict(
                    "NIS_LOCKED",
                    format!("NIS {} already has attendance and cannot change", old_nis),
                ));
            }
            debug!("Changing NIS from {} to {}", old_nis, nis);
            active.nis = Set(nis);
        }
    }
    if let Some(name) = &request.name {
        active.name = Set(required(name, "name")?);
    }
    if request.sex.is_some() {
        active.sex = Set(checked_sex(request.sex.as_deref())?);
    }
    if request.class_id.is_some() {
        active.class_id = Set(request.class_id);
    }
    if request.track_id.is_some() {
        active.track_id = Set(request.track_id);
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| from_db(e, "updating student"))?;

    info!("Student with ID {} updated successfully", updated.id);
    let dto = named_student(&state, updated.id).await?;
    Ok(Json(ApiResponse::ok(dto, "Student updated successfully")))
}

/// Delete a student. Recorded attendance lines are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_student function for student_id: {}", student_id);

    let result = student::Entity::delete_by_id(student_id)
        .exec(&state.db)
        .await
        .map_err(|e| from_db(e, "deleting student"))?;

    if result.rows_affected == 0 {
        warn!("Student with ID {} not found for deletion", student_id);
        return Err(not_found("Student", student_id));
    }

    info!("Student with ID {} deleted successfully", student_id);
    Ok(Json(ApiResponse::ok(
        format!("Student {} deleted", student_id),
        "Student deleted successfully",
    )))
}
