use crate::error::ValidationErrors;
use crate::patch;
use crate::student::Student;
use crate::subject::Subject;
use crate::validation;
use crate::{Entity, Id};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lowest grade a student can receive.
pub const GRADE_MIN: Decimal = dec!(0);
/// Highest grade a student can receive.
pub const GRADE_MAX: Decimal = dec!(20);

/// Represents a row from the `grades` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Grade {
    pub id: Id,
    pub student_id: Id,
    pub subject_id: Id,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A grade together with the student and subject it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeWithDetails {
    #[serde(flatten)]
    pub grade: Grade,
    pub student: Student,
    pub subject: Subject,
}

/// Selects the grade set belonging to one student or one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeOwner {
    Student(Id),
    Subject(Id),
}

impl GradeOwner {
    pub fn id(&self) -> Id {
        match self {
            GradeOwner::Student(id) | GradeOwner::Subject(id) => *id,
        }
    }

    pub fn entity(&self) -> Entity {
        match self {
            GradeOwner::Student(_) => Entity::Student,
            GradeOwner::Subject(_) => Entity::Subject,
        }
    }

    /// Whether `grade` belongs to this owner.
    pub fn owns(&self, grade: &Grade) -> bool {
        match self {
            GradeOwner::Student(id) => grade.student_id == *id,
            GradeOwner::Subject(id) => grade.subject_id == *id,
        }
    }
}

/// Body of `POST /grades`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewGrade {
    pub student_id: Id,
    pub subject_id: Id,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewGrade {
    pub fn validated(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let grade = Self {
            student_id: self.student_id,
            subject_id: self.subject_id,
            value: validation::grade_value("value", self.value, &mut errors),
            comment: validation::optional_text(self.comment),
        };
        errors.into_result(grade)
    }
}

/// Body of `PUT /grades/:id`. The referenced student and subject never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GradePatch {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub comment: Option<Option<String>>,
}

impl GradePatch {
    pub fn validated(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let patch = Self {
            value: self
                .value
                .map(|v| validation::grade_value("value", v, &mut errors)),
            comment: self.comment.map(validation::optional_text),
        };
        errors.into_result(patch)
    }

    pub fn apply_to(self, grade: &mut Grade) {
        if let Some(value) = self.value {
            grade.value = value;
        }
        if let Some(comment) = self.comment {
            grade.comment = comment;
        }
    }
}

/// Response of `GET /students/:id/average`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentAverage {
    pub student_id: Id,
    pub student_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub overall_average: Decimal,
}

/// Response of `GET /subjects/:id/average`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectAverage {
    pub subject_id: Id,
    pub subject_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub average: Decimal,
}
