//! Storage subsystem.
//!
//! One SQLite database opened at process startup and shared by every store
//! through an [`std::sync::Arc`]. The handle wraps an sqlx pool behind a
//! blocking facade so stores can be called from any thread; see
//! [`database::Database`].

pub mod database;
pub mod lanes;

pub use database::Database;
pub use lanes::WriteLanes;
