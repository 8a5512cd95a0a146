use crate::error::DbError;
use async_trait::async_trait;
use core_types::{
    Grade, GradeFilter, GradeOwner, GradeWithDetails, Id, NewGrade, NewStudent, NewSubject, Page,
    Student, StudentFilter, Subject, SubjectFilter,
};
use rust_decimal::Decimal;

/// The data store gateway: every read and write the service performs.
///
/// Implementations enforce email/subject-name uniqueness and grade foreign keys
/// themselves, atomically with the write, and report violations as
/// [`DbError::Conflict`], [`DbError::NotFound`] or [`DbError::HasDependents`].
/// Each call holds a store connection only for its own duration.
#[async_trait]
pub trait GradebookStore: Send + Sync {
    // --- Students ---
    async fn insert_student(&self, student: &NewStudent) -> Result<Student, DbError>;
    async fn find_student(&self, id: Id) -> Result<Option<Student>, DbError>;
    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, DbError>;
    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, DbError>;
    /// Persists every field of an already merged record and stamps `updated_at`.
    async fn save_student(&self, student: &Student) -> Result<Student, DbError>;
    /// Returns `false` when no such student exists.
    async fn delete_student(&self, id: Id) -> Result<bool, DbError>;

    // --- Subjects ---
    async fn insert_subject(&self, subject: &NewSubject) -> Result<Subject, DbError>;
    async fn find_subject(&self, id: Id) -> Result<Option<Subject>, DbError>;
    async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, DbError>;
    async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>, DbError>;
    async fn save_subject(&self, subject: &Subject) -> Result<Subject, DbError>;
    async fn delete_subject(&self, id: Id) -> Result<bool, DbError>;

    // --- Grades ---
    async fn insert_grade(&self, grade: &NewGrade) -> Result<Grade, DbError>;
    async fn find_grade(&self, id: Id) -> Result<Option<GradeWithDetails>, DbError>;
    async fn list_grades(&self, filter: &GradeFilter) -> Result<Vec<GradeWithDetails>, DbError>;
    async fn list_grades_for(
        &self,
        owner: GradeOwner,
        page: Page,
    ) -> Result<Vec<GradeWithDetails>, DbError>;
    /// Every grade value belonging to `owner`, the input of the average calculator.
    async fn grade_values(&self, owner: GradeOwner) -> Result<Vec<Decimal>, DbError>;
    async fn save_grade(&self, grade: &Grade) -> Result<Grade, DbError>;
    async fn delete_grade(&self, id: Id) -> Result<bool, DbError>;
}
