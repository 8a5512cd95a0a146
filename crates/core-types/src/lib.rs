//! # Gradebook Core Types
//!
//! The shared vocabulary of the gradebook service: entity records, the payloads
//! used to create and patch them, input validation, and the aggregate calculator.
//!
//! ## Architectural Principles
//!
//! - **Layer 0 Logic:** This crate has no knowledge of HTTP or of how records are
//!   stored. Every other crate in the workspace depends on it.
//! - **Validate Before Touching the Store:** Payload types expose `validated()`,
//!   which normalizes the input and collects field-level errors.
//! - **Exact Arithmetic:** Grade values are `rust_decimal::Decimal`, so averages
//!   round the same way on every platform.

pub mod average;
pub mod enums;
pub mod error;
pub mod grade;
pub mod patch;
pub mod query;
pub mod student;
pub mod subject;

mod validation;

// Re-export the core types to provide a clean public API.
pub use average::{AVERAGE_SCALE, compute_average};
pub use enums::Entity;
pub use error::{FieldError, ValidationCode, ValidationErrors};
pub use grade::{
    GRADE_MAX, GRADE_MIN, Grade, GradeOwner, GradePatch, GradeWithDetails, NewGrade, StudentAverage,
    SubjectAverage,
};
pub use query::{GradeFilter, Page, StudentFilter, SubjectFilter};
pub use student::{NewStudent, Student, StudentPatch};
pub use subject::{NewSubject, Subject, SubjectPatch};

/// Surrogate identifier shared by every entity table.
pub type Id = i64;
