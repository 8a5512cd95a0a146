use crate::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct RootInfo {
    pub message: &'static str,
    pub environment: &'static str,
    pub database_configured: bool,
}

/// # GET /
/// Liveness and deployment info. Not part of the data API.
pub async fn read_root(State(state): State<Arc<AppState>>) -> Json<RootInfo> {
    Json(RootInfo {
        message: "Welcome to Student Grades API",
        environment: state.info.environment.as_str(),
        database_configured: state.info.database_configured,
    })
}
