use super::SearchParams;
use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use core_types::{
    Entity, GradeOwner, Id, NewSubject, Subject, SubjectAverage, SubjectFilter, SubjectPatch,
    compute_average, query::search_term,
};
use database::{DbError, validators};
use std::sync::Arc;

/// # POST /subjects
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<NewSubject>, AppError>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let new_subject = payload.validated()?;
    let store = state.store.as_ref();

    validators::validate_subject_name_unique(store, &new_subject.name, None).await?;
    let subject = store.insert_subject(&new_subject).await?;

    tracing::info!(subject_id = subject.id, "Subject created.");
    Ok((StatusCode::CREATED, Json(subject)))
}

/// # GET /subjects
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, AppError>,
) -> Result<Json<Vec<Subject>>, AppError> {
    let filter = SubjectFilter {
        page: params.page(),
        search: search_term(params.search),
    };
    Ok(Json(state.store.list_subjects(&filter).await?))
}

/// # GET /subjects/:subject_id
pub async fn get_subject(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(subject_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<Json<Subject>, AppError> {
    let subject = validators::validate_subject_exists(state.store.as_ref(), subject_id).await?;
    Ok(Json(subject))
}

/// # PUT /subjects/:subject_id
pub async fn update_subject(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(subject_id), _): WithRejection<Path<Id>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<SubjectPatch>, AppError>,
) -> Result<Json<Subject>, AppError> {
    let patch = payload.validated()?;
    let store = state.store.as_ref();

    let mut subject = validators::validate_subject_exists(store, subject_id).await?;
    if let Some(name) = patch.changed_name(&subject) {
        validators::validate_subject_name_unique(store, name, Some(subject_id)).await?;
    }
    patch.apply_to(&mut subject);

    Ok(Json(store.save_subject(&subject).await?))
}

/// # DELETE /subjects/:subject_id
pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(subject_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_subject(subject_id).await? {
        return Err(DbError::NotFound(Entity::Subject).into());
    }
    tracing::info!(subject_id, "Subject deleted.");
    Ok(StatusCode::NO_CONTENT)
}

/// # GET /subjects/:subject_id/average
pub async fn subject_average(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(subject_id), _): WithRejection<Path<Id>, AppError>,
) -> Result<Json<SubjectAverage>, AppError> {
    let store = state.store.as_ref();
    let subject = validators::validate_subject_exists(store, subject_id).await?;
    let values = store.grade_values(GradeOwner::Subject(subject.id)).await?;

    Ok(Json(SubjectAverage {
        subject_id: subject.id,
        subject_name: subject.name,
        average: compute_average(&values),
    }))
}
