//! Request handlers, one module per resource.
//!
//! Every handler follows the same shape: extract and validate the input, run the
//! entity validators, perform one store call, and map the outcome to a response.

pub mod grades;
pub mod root;
pub mod students;
pub mod subjects;

use core_types::Page;
use serde::Deserialize;

fn default_limit() -> u32 {
    Page::DEFAULT_LIMIT
}

/// `?skip=&limit=` on the per-owner grade lists.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl From<Pagination> for Page {
    fn from(p: Pagination) -> Self {
        Page::new(p.skip, p.limit)
    }
}

/// `?skip=&limit=&search=` on the student and subject lists.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
}

impl SearchParams {
    fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}
