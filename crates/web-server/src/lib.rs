use axum::{
    Router,
    http::HeaderValue,
    routing::get,
};
use configuration::{Environment, Settings};
use database::{DbRepository, GradebookStore};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

use handlers::{grades, root, students, subjects};

/// Deployment facts reported by `GET /`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub environment: Environment,
    pub database_configured: bool,
}

impl ServiceInfo {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            environment: settings.environment,
            database_configured: settings.database.has_explicit_url(),
        }
    }
}

/// The shared application state that all handlers can access.
pub struct AppState {
    pub store: Arc<dyn GradebookStore>,
    pub info: ServiceInfo,
}

impl AppState {
    pub fn new(store: Arc<dyn GradebookStore>, info: ServiceInfo) -> Self {
        Self { store, info }
    }
}

/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin.");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Builds the full route table over the given state.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root::read_root))
        .route("/health", get(|| async { "OK" }))
        // --- Students ---
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/students/:student_id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route(
            "/students/:student_id/average",
            get(students::student_average),
        )
        // --- Subjects ---
        .route(
            "/subjects",
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route(
            "/subjects/:subject_id",
            get(subjects::get_subject)
                .put(subjects::update_subject)
                .delete(subjects::delete_subject),
        )
        .route(
            "/subjects/:subject_id/average",
            get(subjects::subject_average),
        )
        // --- Grades ---
        .route("/grades", get(grades::list_grades).post(grades::create_grade))
        .route(
            "/grades/:grade_id",
            get(grades::get_grade)
                .put(grades::update_grade)
                .delete(grades::delete_grade),
        )
        .route(
            "/grades/student/:student_id",
            get(grades::grades_for_student),
        )
        .route(
            "/grades/subject/:subject_id",
            get(grades::grades_for_subject),
        )
        .with_state(state)
        .layer(cors_layer(cors_origins))
        // Logs every request and response at the `tower_http` target.
        .layer(TraceLayer::new_for_http())
}

/// Connects to PostgreSQL, applies pending migrations and wraps the pool.
pub async fn connect_store(settings: &Settings) -> anyhow::Result<Arc<dyn GradebookStore>> {
    let pool = database::connect(&settings.database).await?;
    database::run_migrations(&pool).await?;
    Ok(Arc::new(DbRepository::new(pool)))
}

/// Serves the API on the configured address until Ctrl+C.
pub async fn run_server(settings: &Settings, store: Arc<dyn GradebookStore>) -> anyhow::Result<()> {
    let addr = settings.server.socket_addr()?;
    let state = Arc::new(AppState::new(store, ServiceInfo::from_settings(settings)));
    let app = build_router(state, &settings.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        environment = %settings.environment,
        "Web server listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}
