use super::SearchParams;
use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use core_types::{
    Entity, GradeOwner, Id, NewStudent, Student, StudentAverage, StudentFilter, StudentPatch,
    compute_average, query::search_term,
};
use database::{DbError, validators};
use std::sync::Arc;

/// # POST /students
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<NewStudent>, AppError>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let new_student = payload.validated()?;
    let store = state.store.as_ref();

    validators::validate_email_unique(store, &new_student.email, None).await?;
    let student = store.insert_student(&new_student).await?;

    tracing::info!(student_id = student.id, "Student created.");
    Ok((StatusCode::CREATED, Json(student)))
}

/// # GET /students
/// Optional `search` matches first name, last name or email.
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, AppError>,
) -> Result<Json<Vec<Student>>, AppError> {
    let filter = StudentFilter {
        page: params.page(),
        search: search_term(params.search),
    };
    let students = state.store.list_students(&filter).await?;
    Ok(Json(students))
}

/// # GET /students/:student_id
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(student_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<Json<Student>, AppError> {
    let student = validators::validate_student_exists(state.store.as_ref(), student_id).await?;
    Ok(Json(student))
}

/// # PUT /students/:student_id
/// Only the supplied fields change. A changed email must still be unique.
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(student_id), _): WithRejection<Path<Id>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<StudentPatch>, AppError>,
) -> Result<Json<Student>, AppError> {
    let patch = payload.validated()?;
    let store = state.store.as_ref();

    let mut student = validators::validate_student_exists(store, student_id).await?;
    if let Some(email) = patch.changed_email(&student) {
        validators::validate_email_unique(store, email, Some(student_id)).await?;
    }
    patch.apply_to(&mut student);

    let saved = store.save_student(&student).await?;
    Ok(Json(saved))
}

/// # DELETE /students/:student_id
/// Refused while the student still has grades.
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(student_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_student(student_id).await? {
        return Err(DbError::NotFound(Entity::Student).into());
    }
    tracing::info!(student_id, "Student deleted.");
    Ok(StatusCode::NO_CONTENT)
}

/// # GET /students/:student_id/average
/// Mean of all the student's grades, `0` when there are none.
pub async fn student_average(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(student_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<Json<StudentAverage>, AppError> {
    let store = state.store.as_ref();
    let student = validators::validate_student_exists(store, student_id).await?;
    let values = store.grade_values(GradeOwner::Student(student.id)).await?;

    Ok(Json(StudentAverage {
        student_id: student.id,
        student_name: student.full_name(),
        overall_average: compute_average(&values),
    }))
}
