use crate::error::{Conflict, DbError};
use crate::store::GradebookStore;
use async_trait::async_trait;
use core_types::{
    Entity, Grade, GradeFilter, GradeOwner, GradeWithDetails, Id, NewGrade, NewStudent, NewSubject,
    Page, Student, StudentFilter, Subject, SubjectFilter,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Row};

// Constraint names from the migrations; database errors are translated by name.
const STUDENT_EMAIL_KEY: &str = "students_email_key";
const SUBJECT_NAME_KEY: &str = "subjects_name_key";
const GRADE_STUDENT_FKEY: &str = "grades_student_id_fkey";
const GRADE_SUBJECT_FKEY: &str = "grades_subject_id_fkey";

const GRADE_DETAILS_SELECT: &str = r#"
    SELECT
        g.id, g.student_id, g.subject_id, g.value, g.comment, g.created_at, g.updated_at,
        st.first_name AS student_first_name, st.last_name AS student_last_name,
        st.email AS student_email, st.created_at AS student_created_at,
        st.updated_at AS student_updated_at,
        su.name AS subject_name, su.description AS subject_description,
        su.created_at AS subject_created_at, su.updated_at AS subject_updated_at
    FROM
        grades AS g
    JOIN
        students AS st ON st.id = g.student_id
    JOIN
        subjects AS su ON su.id = g.subject_id
"#;

/// The `DbRepository` provides the PostgreSQL implementation of [`GradebookStore`].
/// It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GradebookStore for DbRepository {
    async fn insert_student(&self, student: &NewStudent) -> Result<Student, DbError> {
        let created = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (first_name, last_name, email)
            VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, email, created_at, updated_at
            "#,
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_conflict)?;

        tracing::debug!(student_id = created.id, "Inserted student.");
        Ok(created)
    }

    async fn find_student(&self, id: Id) -> Result<Option<Student>, DbError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, first_name, last_name, email, created_at, updated_at FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, DbError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, first_name, last_name, email, created_at, updated_at FROM students WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, DbError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, first_name, last_name, email, created_at, updated_at
            FROM students
            WHERE $1::text IS NULL
               OR first_name ILIKE $1
               OR last_name ILIKE $1
               OR email ILIKE $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(filter.search.as_deref().map(like_pattern))
        .bind(i64::from(filter.page.skip))
        .bind(i64::from(filter.page.limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    async fn save_student(&self, student: &Student) -> Result<Student, DbError> {
        sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET first_name = $2, last_name = $3, email = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, created_at, updated_at
            "#,
        )
        .bind(student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_conflict)?
        .ok_or(DbError::NotFound(Entity::Student))
    }

    async fn delete_student(&self, id: Id) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| still_referenced(e, Entity::Student))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_subject(&self, subject: &NewSubject) -> Result<Subject, DbError> {
        let created = sqlx::query_as::<_, Subject>(
            r#"
            INSERT INTO subjects (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&subject.name)
        .bind(&subject.description)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_conflict)?;

        tracing::debug!(subject_id = created.id, "Inserted subject.");
        Ok(created)
    }

    async fn find_subject(&self, id: Id) -> Result<Option<Subject>, DbError> {
        let subject = sqlx::query_as::<_, Subject>(
            "SELECT id, name, description, created_at, updated_at FROM subjects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subject)
    }

    async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, DbError> {
        let subject = sqlx::query_as::<_, Subject>(
            "SELECT id, name, description, created_at, updated_at FROM subjects WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subject)
    }

    async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>, DbError> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM subjects
            WHERE $1::text IS NULL
               OR name ILIKE $1
               OR description ILIKE $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(filter.search.as_deref().map(like_pattern))
        .bind(i64::from(filter.page.skip))
        .bind(i64::from(filter.page.limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(subjects)
    }

    async fn save_subject(&self, subject: &Subject) -> Result<Subject, DbError> {
        sqlx::query_as::<_, Subject>(
            r#"
            UPDATE subjects
            SET name = $2, description = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(subject.id)
        .bind(&subject.name)
        .bind(&subject.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_conflict)?
        .ok_or(DbError::NotFound(Entity::Subject))
    }

    async fn delete_subject(&self, id: Id) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| still_referenced(e, Entity::Subject))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_grade(&self, grade: &NewGrade) -> Result<Grade, DbError> {
        let created = sqlx::query_as::<_, Grade>(
            r#"
            INSERT INTO grades (student_id, subject_id, value, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, student_id, subject_id, value, comment, created_at, updated_at
            "#,
        )
        .bind(grade.student_id)
        .bind(grade.subject_id)
        .bind(grade.value)
        .bind(&grade.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_reference)?;

        tracing::debug!(grade_id = created.id, "Inserted grade.");
        Ok(created)
    }

    async fn find_grade(&self, id: Id) -> Result<Option<GradeWithDetails>, DbError> {
        let sql = format!("{GRADE_DETAILS_SELECT} WHERE g.id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(grade_with_details).transpose()?)
    }

    async fn list_grades(&self, filter: &GradeFilter) -> Result<Vec<GradeWithDetails>, DbError> {
        let sql = format!(
            r#"{GRADE_DETAILS_SELECT}
            WHERE ($1::numeric IS NULL OR g.value >= $1)
              AND ($2::numeric IS NULL OR g.value <= $2)
            ORDER BY g.id
            OFFSET $3 LIMIT $4"#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.min_value)
            .bind(filter.max_value)
            .bind(i64::from(filter.page.skip))
            .bind(i64::from(filter.page.limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(grade_with_details).collect::<Result<Vec<_>, _>>()?)
    }

    async fn list_grades_for(
        &self,
        owner: GradeOwner,
        page: Page,
    ) -> Result<Vec<GradeWithDetails>, DbError> {
        let sql = format!(
            "{GRADE_DETAILS_SELECT} WHERE g.{} = $1 ORDER BY g.id OFFSET $2 LIMIT $3",
            owner_column(owner)
        );
        let rows = sqlx::query(&sql)
            .bind(owner.id())
            .bind(i64::from(page.skip))
            .bind(i64::from(page.limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(grade_with_details).collect::<Result<Vec<_>, _>>()?)
    }

    async fn grade_values(&self, owner: GradeOwner) -> Result<Vec<Decimal>, DbError> {
        let sql = format!("SELECT value FROM grades WHERE {} = $1", owner_column(owner));
        let values = sqlx::query_scalar::<_, Decimal>(&sql)
            .bind(owner.id())
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }

    async fn save_grade(&self, grade: &Grade) -> Result<Grade, DbError> {
        sqlx::query_as::<_, Grade>(
            r#"
            UPDATE grades
            SET value = $2, comment = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, student_id, subject_id, value, comment, created_at, updated_at
            "#,
        )
        .bind(grade.id)
        .bind(grade.value)
        .bind(&grade.comment)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound(Entity::Grade))
    }

    async fn delete_grade(&self, id: Id) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn owner_column(owner: GradeOwner) -> &'static str {
    match owner {
        GradeOwner::Student(_) => "student_id",
        GradeOwner::Subject(_) => "subject_id",
    }
}

/// Builds an `ILIKE` pattern matching `term` anywhere, with its own wildcards escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn grade_with_details(row: &PgRow) -> Result<GradeWithDetails, sqlx::Error> {
    let grade = Grade::from_row(row)?;
    let student = Student {
        id: grade.student_id,
        first_name: row.try_get("student_first_name")?,
        last_name: row.try_get("student_last_name")?,
        email: row.try_get("student_email")?,
        created_at: row.try_get("student_created_at")?,
        updated_at: row.try_get("student_updated_at")?,
    };
    let subject = Subject {
        id: grade.subject_id,
        name: row.try_get("subject_name")?,
        description: row.try_get("subject_description")?,
        created_at: row.try_get("subject_created_at")?,
        updated_at: row.try_get("subject_updated_at")?,
    };
    Ok(GradeWithDetails {
        grade,
        student,
        subject,
    })
}

/// The constraint a unique or foreign-key violation names, if `err` is one.
fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
        {
            db_err.constraint().map(str::to_owned)
        }
        _ => None,
    }
}

fn unique_conflict(err: sqlx::Error) -> DbError {
    match violated_constraint(&err).as_deref() {
        Some(STUDENT_EMAIL_KEY) => DbError::Conflict(Conflict::StudentEmail),
        Some(SUBJECT_NAME_KEY) => DbError::Conflict(Conflict::SubjectName),
        _ => err.into(),
    }
}

fn missing_reference(err: sqlx::Error) -> DbError {
    match violated_constraint(&err).as_deref() {
        Some(GRADE_STUDENT_FKEY) => DbError::NotFound(Entity::Student),
        Some(GRADE_SUBJECT_FKEY) => DbError::NotFound(Entity::Subject),
        _ => err.into(),
    }
}

fn still_referenced(err: sqlx::Error, entity: Entity) -> DbError {
    match violated_constraint(&err).as_deref() {
        Some(GRADE_STUDENT_FKEY | GRADE_SUBJECT_FKEY) => DbError::HasDependents(entity),
        _ => err.into(),
    }
}
