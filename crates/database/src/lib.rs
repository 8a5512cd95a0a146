//! # Gradebook Database Crate
//!
//! This crate is the data store gateway of the gradebook service. It owns the
//! schema, the SQL, and the rules the store itself enforces.
//!
//! ## Architectural Principles
//!
//! - **Adapter Behind a Trait:** Handlers only see [`GradebookStore`]. The
//!   PostgreSQL implementation ([`DbRepository`]) and the in-memory one
//!   ([`InMemoryStore`]) enforce the same constraints.
//! - **Constraints Are Authoritative:** Unique and foreign-key constraints live in
//!   the store. The [`validators`] are an early check that produces friendlier
//!   errors, not the safeguard.
//! - **Asynchronous & Pooled:** All operations are asynchronous and draw scoped
//!   connections from a `PgPool`.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: Applies the embedded migrations.
//! - `GradebookStore`: The store contract.
//! - `DbError` / `Conflict`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;
pub mod validators;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::{Conflict, DbError};
pub use memory::InMemoryStore;
pub use repository::DbRepository;
pub use store::GradebookStore;
