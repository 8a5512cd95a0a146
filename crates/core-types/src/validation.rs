use crate::error::{FieldError, ValidationCode, ValidationErrors};
use crate::grade::{GRADE_MAX, GRADE_MIN};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

// One `@`, no whitespace, a domain of dot-separated labels ending in an alphabetic TLD.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Trims `value`, recording a `Required` error if nothing is left.
pub(crate) fn required_text(field: &str, value: String, errors: &mut ValidationErrors) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(FieldError::required(field));
    }
    trimmed.to_string()
}

/// Trims and lowercases an email address and checks its shape.
pub(crate) fn email(field: &str, value: String, errors: &mut ValidationErrors) -> String {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        errors.add(FieldError::required(field));
    } else if !EMAIL_SHAPE.is_match(&normalized) {
        errors.add(FieldError::new(
            field,
            format!("{field} is not a valid email address"),
            ValidationCode::InvalidFormat,
        ));
    }
    normalized
}

/// Checks that a grade value lies in the inclusive `[GRADE_MIN, GRADE_MAX]` range.
pub(crate) fn grade_value(field: &str, value: Decimal, errors: &mut ValidationErrors) -> Decimal {
    if value < GRADE_MIN {
        errors.add(FieldError::new(
            field,
            format!("{field} must be greater than or equal to {GRADE_MIN}"),
            ValidationCode::TooSmall,
        ));
    } else if value > GRADE_MAX {
        errors.add(FieldError::new(
            field,
            format!("{field} must be less than or equal to {GRADE_MAX}"),
            ValidationCode::TooLarge,
        ));
    }
    value
}

/// Blank optional text collapses to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_email_is_normalized() {
        let mut errors = ValidationErrors::new();
        let email = email("email", "  Ada.Lovelace@Example.COM ".to_string(), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(email, "ada.lovelace@example.com");
    }

    #[test]
    fn test_email_shape_is_checked() {
        for bad in [
            "ada",
            "ada@",
            "@example.com",
            "ada@example",
            "a b@example.com",
            "a@b@c.com",
            "a@.example.com",
            "a@b..com",
            "a@-.com",
            "a@example-.com",
            "a@example.c0m",
        ] {
            let mut errors = ValidationErrors::new();
            email("email", bad.to_string(), &mut errors);
            assert_eq!(errors.len(), 1, "{bad} should be rejected");
            assert_eq!(errors.errors()[0].code, ValidationCode::InvalidFormat);
        }
    }

    #[test]
    fn test_subdomains_and_hyphens_are_accepted() {
        for good in ["ada@mail.example.com", "ada+tag@my-school.edu", "a.b_c@x1.io"] {
            let mut errors = ValidationErrors::new();
            email("email", good.to_string(), &mut errors);
            assert!(errors.is_empty(), "{good} should be accepted");
        }
    }

    #[test]
    fn test_grade_bounds_are_inclusive() {
        let mut errors = ValidationErrors::new();
        grade_value("value", dec!(0), &mut errors);
        grade_value("value", dec!(20), &mut errors);
        assert!(errors.is_empty());

        grade_value("value", dec!(-0.01), &mut errors);
        grade_value("value", dec!(20.5), &mut errors);
        let codes: Vec<_> = errors.errors().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ValidationCode::TooSmall, ValidationCode::TooLarge]);
    }

    #[test]
    fn test_blank_optional_text_becomes_none() {
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_text(Some(" Algebra ".to_string())), Some("Algebra".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
