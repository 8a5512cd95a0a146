use crate::Id;
use crate::error::ValidationErrors;
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents a row from the `students` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    /// "First Last", as shown in average reports.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /students`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewStudent {
    /// Trims the names, normalizes the email, and rejects blank or malformed fields.
    pub fn validated(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let student = Self {
            first_name: validation::required_text("first_name", self.first_name, &mut errors),
            last_name: validation::required_text("last_name", self.last_name, &mut errors),
            email: validation::email("email", self.email, &mut errors),
        };
        errors.into_result(student)
    }
}

/// Body of `PUT /students/:id`. Only supplied fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl StudentPatch {
    pub fn validated(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let patch = Self {
            first_name: self
                .first_name
                .map(|v| validation::required_text("first_name", v, &mut errors)),
            last_name: self
                .last_name
                .map(|v| validation::required_text("last_name", v, &mut errors)),
            email: self.email.map(|v| validation::email("email", v, &mut errors)),
        };
        errors.into_result(patch)
    }

    /// The email this patch would set, if it differs from the stored one.
    pub fn changed_email<'a>(&'a self, current: &Student) -> Option<&'a str> {
        self.email.as_deref().filter(|email| *email != current.email)
    }

    /// Merges the supplied fields into `student`, leaving the rest untouched.
    pub fn apply_to(self, student: &mut Student) {
        if let Some(first_name) = self.first_name {
            student.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            student.last_name = last_name;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationCode;

    fn stored() -> Student {
        Student {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_new_student_collects_every_field_error() {
        let input = NewStudent {
            first_name: " ".to_string(),
            last_name: String::new(),
            email: "not-an-email".to_string(),
        };
        let errors = input.validated().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "last_name", "email"]);
        assert_eq!(errors.errors()[2].code, ValidationCode::InvalidFormat);
    }

    #[test]
    fn test_patch_with_single_field_leaves_others_unchanged() {
        let mut student = stored();
        let patch = StudentPatch {
            last_name: Some("Byron".to_string()),
            ..Default::default()
        };
        patch.validated().unwrap().apply_to(&mut student);

        assert_eq!(student.first_name, "Ada");
        assert_eq!(student.last_name, "Byron");
        assert_eq!(student.email, "ada@example.com");
    }

    #[test]
    fn test_changed_email_ignores_own_email() {
        let student = stored();
        let same = StudentPatch {
            email: Some("ADA@example.com".to_string()),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(same.changed_email(&student), None);

        let other = StudentPatch {
            email: Some("countess@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(other.changed_email(&student), Some("countess@example.com"));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(stored().full_name(), "Ada Lovelace");
    }
}
