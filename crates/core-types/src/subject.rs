use crate::Id;
use crate::error::ValidationErrors;
use crate::patch;
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents a row from the `subjects` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /subjects`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSubject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewSubject {
    pub fn validated(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let subject = Self {
            name: validation::required_text("name", self.name, &mut errors),
            description: validation::optional_text(self.description),
        };
        errors.into_result(subject)
    }
}

/// Body of `PUT /subjects/:id`.
///
/// `description: null` clears the description; omitting it keeps the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubjectPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub description: Option<Option<String>>,
}

impl SubjectPatch {
    pub fn validated(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let patch = Self {
            name: self
                .name
                .map(|v| validation::required_text("name", v, &mut errors)),
            description: self.description.map(validation::optional_text),
        };
        errors.into_result(patch)
    }

    /// The name this patch would set, if it differs from the stored one.
    pub fn changed_name<'a>(&'a self, current: &Subject) -> Option<&'a str> {
        self.name.as_deref().filter(|name| *name != current.name)
    }

    pub fn apply_to(self, subject: &mut Subject) {
        if let Some(name) = self.name {
            subject.name = name;
        }
        if let Some(description) = self.description {
            subject.description = description;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Subject {
        Subject {
            id: 3,
            name: "Math".to_string(),
            description: Some("Algebra and geometry".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_description_tri_state() {
        let absent: SubjectPatch = serde_json::from_str(r#"{"name": "Maths"}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: SubjectPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: SubjectPatch = serde_json::from_str(r#"{"description": "Numbers"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Numbers".to_string())));
    }

    #[test]
    fn test_patch_name_only_keeps_description() {
        let mut subject = stored();
        let patch: SubjectPatch = serde_json::from_str(r#"{"name": " Maths "}"#).unwrap();
        patch.validated().unwrap().apply_to(&mut subject);

        assert_eq!(subject.name, "Maths");
        assert_eq!(subject.description.as_deref(), Some("Algebra and geometry"));
    }

    #[test]
    fn test_patch_null_description_clears_it() {
        let mut subject = stored();
        let patch: SubjectPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        patch.validated().unwrap().apply_to(&mut subject);

        assert_eq!(subject.name, "Math");
        assert_eq!(subject.description, None);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let input = NewSubject {
            name: "   ".to_string(),
            description: None,
        };
        assert_eq!(input.validated().unwrap_err().len(), 1);
    }

    #[test]
    fn test_changed_name() {
        let subject = stored();
        let patch = SubjectPatch {
            name: Some("Math".to_string()),
            ..Default::default()
        };
        assert_eq!(patch.changed_name(&subject), None);
    }
}
