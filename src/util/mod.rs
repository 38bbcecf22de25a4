//! Small shared utilities: identifiers and serde helpers for `Duration`.

mod ids;

pub mod duration_serde;

pub use ids::ComponentId;
