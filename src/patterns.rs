//! Derived behavioral-pattern summaries.
//!
//! Patterns are opaque, session-scoped feature summaries produced by the
//! capture agent from raw telemetry. The core stores and orders them; it
//! attaches no meaning to `pattern_data` beyond it being serialized text.

pub mod repository;
pub mod types;

pub use repository::PatternRepository;
pub use types::BehavioralPattern;
