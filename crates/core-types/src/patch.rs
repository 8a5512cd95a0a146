//! Helpers for tri-state patch fields.
//!
//! A field typed `Option<Option<T>>` and annotated with
//! `#[serde(default, deserialize_with = "patch::nullable")]` distinguishes
//! three cases: the key is absent (`None`), the key is `null`
//! (`Some(None)`), or the key carries a value (`Some(Some(v))`).

use serde::{Deserialize, Deserializer};

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
