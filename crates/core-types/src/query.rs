use rust_decimal::Decimal;

/// Offset/limit window applied to every list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 100;

    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Filter for `GET /students`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Case-insensitive substring of the first name, last name or email.
    pub search: Option<String>,
    pub page: Page,
}

/// Filter for `GET /subjects`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectFilter {
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    pub page: Page,
}

/// Filter for `GET /grades`. Both bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeFilter {
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
    pub page: Page,
}

impl GradeFilter {
    pub fn accepts(&self, value: Decimal) -> bool {
        self.min_value.is_none_or(|min| value >= min) && self.max_value.is_none_or(|max| value <= max)
    }
}

/// A blank search term means "no search".
pub fn search_term(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
