//! Entity validators: the referential-integrity and uniqueness checks run
//! before a write.
//!
//! Each validator performs exactly one store lookup and has no side effects.
//! They give callers a clear error early; the store's own constraints remain the
//! authority when two requests race past the same check.

use crate::error::{Conflict, DbError};
use crate::store::GradebookStore;
use core_types::{Entity, Id, Student, Subject};

pub async fn validate_student_exists(
    store: &dyn GradebookStore,
    id: Id,
) -> Result<Student, DbError> {
    store
        .find_student(id)
        .await?
        .ok_or(DbError::NotFound(Entity::Student))
}

pub async fn validate_subject_exists(
    store: &dyn GradebookStore,
    id: Id,
) -> Result<Subject, DbError> {
    store
        .find_subject(id)
        .await?
        .ok_or(DbError::NotFound(Entity::Subject))
}

/// Fails with a conflict if another student already uses `email`.
///
/// `excluding` lets a student keep its own email on update.
pub async fn validate_email_unique(
    store: &dyn GradebookStore,
    email: &str,
    excluding: Option<Id>,
) -> Result<(), DbError> {
    match store.find_student_by_email(email).await? {
        Some(existing) if Some(existing.id) != excluding => {
            Err(DbError::Conflict(Conflict::StudentEmail))
        }
        _ => Ok(()),
    }
}

/// Fails with a conflict if another subject already uses `name`.
pub async fn validate_subject_name_unique(
    store: &dyn GradebookStore,
    name: &str,
    excluding: Option<Id>,
) -> Result<(), DbError> {
    match store.find_subject_by_name(name).await? {
        Some(existing) if Some(existing.id) != excluding => {
            Err(DbError::Conflict(Conflict::SubjectName))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use core_types::{NewStudent, NewSubject};

    async fn seeded() -> (InMemoryStore, Student, Subject) {
        let store = InMemoryStore::new();
        let student = store
            .insert_student(&NewStudent {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        let subject = store
            .insert_subject(&NewSubject {
                name: "Math".to_string(),
                description: None,
            })
            .await
            .unwrap();
        (store, student, subject)
    }

    #[tokio::test]
    async fn test_existence_checks() {
        let (store, student, subject) = seeded().await;

        assert_eq!(validate_student_exists(&store, student.id).await.unwrap(), student);
        assert_eq!(validate_subject_exists(&store, subject.id).await.unwrap(), subject);

        assert!(matches!(
            validate_student_exists(&store, 404).await,
            Err(DbError::NotFound(Entity::Student))
        ));
        assert!(matches!(
            validate_subject_exists(&store, 404).await,
            Err(DbError::NotFound(Entity::Subject))
        ));
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let (store, student, _) = seeded().await;

        assert!(validate_email_unique(&store, "new@example.com", None).await.is_ok());
        assert!(matches!(
            validate_email_unique(&store, "ada@example.com", None).await,
            Err(DbError::Conflict(Conflict::StudentEmail))
        ));
        // A student may keep its own email.
        assert!(validate_email_unique(&store, "ada@example.com", Some(student.id)).await.is_ok());
        assert!(validate_email_unique(&store, "ada@example.com", Some(student.id + 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_subject_name_uniqueness() {
        let (store, _, subject) = seeded().await;

        assert!(validate_subject_name_unique(&store, "Physics", None).await.is_ok());
        assert!(matches!(
            validate_subject_name_unique(&store, "Math", None).await,
            Err(DbError::Conflict(Conflict::SubjectName))
        ));
        assert!(validate_subject_name_unique(&store, "Math", Some(subject.id)).await.is_ok());
    }
}
