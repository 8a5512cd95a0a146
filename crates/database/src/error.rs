use core_types::Entity;
use thiserror::Error;

/// Which uniqueness rule a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    StudentEmail,
    SubjectName,
}

impl Conflict {
    pub fn message(&self) -> &'static str {
        match self {
            Conflict::StudentEmail => "Email already registered",
            Conflict::SubjectName => "Subject name already exists",
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load settings for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("{}", .0.message())]
    Conflict(Conflict),

    #[error("{0} still has grades; delete them first")]
    HasDependents(Entity),
}
