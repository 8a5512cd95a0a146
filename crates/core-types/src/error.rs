use serde::Serialize;
use thiserror::Error;

/// Machine-readable category of a field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// Required field is missing or blank.
    Required,
    /// Value doesn't match the expected shape (e.g. an email address).
    InvalidFormat,
    /// Value is below the allowed minimum.
    TooSmall,
    /// Value is above the allowed maximum.
    TooLarge,
    /// The request body, query or path could not be parsed at all.
    Malformed,
}

/// A single validation error for a specific field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: ValidationCode,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: ValidationCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            message: format!("{field} must not be empty"),
            field,
            code: ValidationCode::Required,
        }
    }
}

/// All field errors collected while validating one payload.
#[derive(Error, Debug, Clone, Default, PartialEq, Serialize)]
#[error("validation failed: {}", join_messages(.0))]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding exactly one error.
    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn add(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `Ok(value)` when nothing was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result_passes_value_through_when_empty() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.into_result(7), Ok(7));
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.add(FieldError::required("first_name"));
        errors.add(FieldError::new("email", "email is not valid", ValidationCode::InvalidFormat));

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "validation failed: first_name must not be empty; email is not valid"
        );
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let errors = ValidationErrors::single(FieldError::required("name"));
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json[0]["field"], "name");
        assert_eq!(json[0]["code"], "REQUIRED");
    }
}
