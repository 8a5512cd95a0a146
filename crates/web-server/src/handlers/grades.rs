use super::Pagination;
use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use core_types::{
    Entity, Grade, GradeFilter, GradeOwner, GradePatch, GradeWithDetails, Id, NewGrade, Page,
};
use database::{DbError, validators};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

/// `?skip=&limit=&min_grade=&max_grade=` on `GET /grades`.
#[derive(Debug, Deserialize)]
pub struct GradeListParams {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "super::default_limit")]
    pub limit: u32,
    pub min_grade: Option<Decimal>,
    pub max_grade: Option<Decimal>,
}

/// # POST /grades
/// Both the student and the subject must exist.
pub async fn create_grade(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<NewGrade>, AppError>,
) -> Result<(StatusCode, Json<Grade>), AppError> {
    let new_grade = payload.validated()?;
    let store = state.store.as_ref();

    validators::validate_student_exists(store, new_grade.student_id).await?;
    validators::validate_subject_exists(store, new_grade.subject_id).await?;
    let grade = store.insert_grade(&new_grade).await?;

    tracing::info!(
        grade_id = grade.id,
        student_id = grade.student_id,
        subject_id = grade.subject_id,
        "Grade recorded."
    );
    Ok((StatusCode::CREATED, Json(grade)))
}

/// # GET /grades
/// `min_grade` and `max_grade` are inclusive.
pub async fn list_grades(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<GradeListParams>, AppError>,
) -> Result<Json<Vec<GradeWithDetails>>, AppError> {
    let filter = GradeFilter {
        min_value: params.min_grade,
        max_value: params.max_grade,
        page: Page::new(params.skip, params.limit),
    };
    Ok(Json(state.store.list_grades(&filter).await?))
}

/// # GET /grades/:grade_id
pub async fn get_grade(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(grade_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<Json<GradeWithDetails>, AppError> {
    let grade = state
        .store
        .find_grade(grade_id)
        .await?
        .ok_or(DbError::NotFound(Entity::Grade))?;
    Ok(Json(grade))
}

/// # GET /grades/student/:student_id
pub async fn grades_for_student(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(student_id), _): WithRejection<Path<Id>, AppError>,
    WithRejection(Query(pagination), _): WithRejection<Query<Pagination>, AppError>,
) -> Result<Json<Vec<GradeWithDetails>>, AppError> {
    let store = state.store.as_ref();
    validators::validate_student_exists(store, student_id).await?;
    let grades = store
        .list_grades_for(GradeOwner::Student(student_id), pagination.into())
        .await?;
    Ok(Json(grades))
}

/// # GET /grades/subject/:subject_id
pub async fn grades_for_subject(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(subject_id), _): WithRejection<Path<Id>, AppError>,
    WithRejection(Query(pagination), _): WithRejection<Query<Pagination>, AppError>,
) -> Result<Json<Vec<GradeWithDetails>>, AppError> {
    let store = state.store.as_ref();
    validators::validate_subject_exists(store, subject_id).await?;
    let grades = store
        .list_grades_for(GradeOwner::Subject(subject_id), pagination.into())
        .await?;
    Ok(Json(grades))
}

/// # PUT /grades/:grade_id
/// Only `value` and `comment` can change.
pub async fn update_grade(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(grade_id), _): WithRejection<Path<Id>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<GradePatch>, AppError>,
) -> Result<Json<Grade>, AppError> {
    let patch = payload.validated()?;
    let store = state.store.as_ref();

    let mut grade = store
        .find_grade(grade_id)
        .await?
        .ok_or(DbError::NotFound(Entity::Grade))?
        .grade;
    patch.apply_to(&mut grade);

    Ok(Json(store.save_grade(&grade).await?))
}

/// # DELETE /grades/:grade_id
pub async fn delete_grade(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(grade_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_grade(grade_id).await? {
        return Err(DbError::NotFound(Entity::Grade).into());
    }
    tracing::info!(grade_id, "Grade deleted.");
    Ok(StatusCode::NO_CONTENT)
}
