use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::{check_course_access, plan_course_entries};
use crate::db::Database;
use crate::grading::AutoGrader;
use crate::models::*;

type ApiError = (StatusCode, String);

// ============================================================
// Error Handling
// ============================================================

/// Map a failed operation to a response.
///
/// Domain rule violations are returned to the client as `400`, missing
/// entities as `404`. Anything else is logged in full and sanitized to a
/// generic `500` so internal details don't leak.
fn api_error(e: anyhow::Error) -> ApiError {
    if let Some(err) = e.downcast_ref::<ValidationError>() {
        tracing::warn!("Validation error: {}", err);
        return (StatusCode::BAD_REQUEST, err.to_string());
    }
    if let Some(err) = e.downcast_ref::<NotFound>() {
        return (StatusCode::NOT_FOUND, err.to_string());
    }

    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn not_found(what: &'static str) -> ApiError {
    (StatusCode::NOT_FOUND, NotFound(what).to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Courses
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ListCoursesQuery {
    /// Include archived courses. Defaults to false.
    #[serde(default)]
    pub include_archived: bool,
}

pub async fn list_courses(
    State(db): State<Database>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<Vec<Course>>, ApiError> {
    db.get_all_courses(query.include_archived)
        .map(Json)
        .map_err(api_error)
}

pub async fn get_course(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError> {
    db.get_course(id)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Course"))
}

pub async fn create_course(
    State(db): State<Database>,
    Json(input): Json<CreateCourseInput>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    db.create_course(input)
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(api_error)
}

pub async fn update_course(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCourseInput>,
) -> Result<Json<Course>, ApiError> {
    db.update_course(id, input)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Course"))
}

pub async fn delete_course(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_course(id).map_err(api_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Course"))
    }
}

pub async fn archive_course(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError> {
    db.set_course_archived(id, true)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Course"))
}

pub async fn restore_course(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError> {
    db.set_course_archived(id, false)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Course"))
}

// ============================================================
// Employees
// ============================================================

pub async fn list_employees(State(db): State<Database>) -> Result<Json<Vec<Employee>>, ApiError> {
    db.get_all_employees().map(Json).map_err(api_error)
}

pub async fn get_employee(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError> {
    db.get_employee(id)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Employee"))
}

pub async fn create_employee(
    State(db): State<Database>,
    Json(input): Json<CreateEmployeeInput>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    db.create_employee(input)
        .map(|e| (StatusCode::CREATED, Json(e)))
        .map_err(api_error)
}

pub async fn delete_employee(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_employee(id).map_err(api_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Employee"))
    }
}

// ============================================================
// Development plans and access
// ============================================================

pub async fn assign_course(
    State(db): State<Database>,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<AssignCourseInput>,
) -> Result<Json<Employee>, ApiError> {
    db.get_course(input.course_id)
        .map_err(api_error)?
        .ok_or_else(|| not_found("Course"))?;

    db.assign_course(employee_id, input)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Employee"))
}

pub async fn unassign_course(
    State(db): State<Database>,
    Path((employee_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Employee>, ApiError> {
    db.unassign_course(employee_id, course_id)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Employee"))
}

/// Every plan entry with its course, access status and stage, in plan order.
pub async fn list_plan_courses(
    State(db): State<Database>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Vec<PlanCourseEntry>>, ApiError> {
    let employee = db
        .get_employee(employee_id)
        .map_err(api_error)?
        .ok_or_else(|| not_found("Employee"))?;
    let courses = db.get_all_courses(true).map_err(api_error)?;

    Ok(Json(plan_course_entries(&employee, &courses)))
}

/// Unknown employees get a locked status rather than a 404.
pub async fn check_access(
    State(db): State<Database>,
    Path((employee_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccessStatus>, ApiError> {
    let employee = db.get_employee(employee_id).map_err(api_error)?;
    let summaries = db.course_summaries().map_err(api_error)?;

    Ok(Json(check_course_access(
        employee.as_ref(),
        course_id,
        &summaries,
    )))
}

pub async fn update_progress(
    State(db): State<Database>,
    Path((employee_id, course_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<CourseProgressUpdate>,
) -> Result<Json<Employee>, ApiError> {
    db.commit_course_progress(employee_id, course_id, &update)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Employee"))
}

pub async fn certify_course(
    State(db): State<Database>,
    Path((employee_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Employee>, ApiError> {
    db.certify_course(employee_id, course_id)
        .map(Json)
        .map_err(api_error)
}

// ============================================================
// Task submissions
// ============================================================

pub async fn submit_task(
    State(db): State<Database>,
    State(grader): State<AutoGrader>,
    Path((employee_id, course_id, task_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(input): Json<CreateSubmissionInput>,
) -> Result<(StatusCode, Json<TaskSubmission>), ApiError> {
    db.submit_task(employee_id, course_id, task_id, input, &grader)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(api_error)
}

#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    /// Limit results to one course.
    pub course_id: Option<Uuid>,
}

pub async fn list_submissions(
    State(db): State<Database>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<Vec<TaskSubmission>>, ApiError> {
    db.get_submissions_by_employee(employee_id, query.course_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn get_submission(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskSubmission>, ApiError> {
    db.get_submission(id)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Submission"))
}

pub async fn review_submission(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReviewSubmissionInput>,
) -> Result<Json<TaskSubmission>, ApiError> {
    db.review_submission(id, input)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Submission"))
}

// ============================================================
// ЗРС documents
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ListZrsQuery {
    pub employee_id: Option<Uuid>,
}

pub async fn list_zrs(
    State(db): State<Database>,
    Query(query): Query<ListZrsQuery>,
) -> Result<Json<Vec<ZrsDocument>>, ApiError> {
    db.get_zrs_documents(query.employee_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn get_zrs(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ZrsDocument>, ApiError> {
    db.get_zrs_document(id)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Document"))
}

pub async fn create_zrs(
    State(db): State<Database>,
    Json(input): Json<CreateZrsInput>,
) -> Result<(StatusCode, Json<ZrsDocument>), ApiError> {
    db.create_zrs_document(input)
        .map(|d| (StatusCode::CREATED, Json(d)))
        .map_err(api_error)
}

pub async fn update_zrs(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateZrsInput>,
) -> Result<Json<ZrsDocument>, ApiError> {
    db.update_zrs_document(id, input)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Document"))
}

pub async fn delete_zrs(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_zrs_document(id).map_err(api_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Document"))
    }
}

fn transition_zrs(
    db: &Database,
    id: Uuid,
    next: ZrsStatus,
    input: ZrsTransitionInput,
) -> Result<Json<ZrsDocument>, ApiError> {
    db.transition_zrs_document(id, next, input)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| not_found("Document"))
}

pub async fn submit_zrs(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ZrsDocument>, ApiError> {
    transition_zrs(&db, id, ZrsStatus::Submitted, ZrsTransitionInput::default())
}

pub async fn approve_zrs(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<ZrsTransitionInput>,
) -> Result<Json<ZrsDocument>, ApiError> {
    transition_zrs(&db, id, ZrsStatus::Approved, input)
}

pub async fn reject_zrs(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<ZrsTransitionInput>,
) -> Result<Json<ZrsDocument>, ApiError> {
    transition_zrs(&db, id, ZrsStatus::Rejected, input)
}

pub async fn rework_zrs(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ZrsDocument>, ApiError> {
    transition_zrs(&db, id, ZrsStatus::Draft, ZrsTransitionInput::default())
}
