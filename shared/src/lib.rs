//! Shared types and models for the Bloom Monitor platform
//!
//! This crate holds the pure domain logic (bounding boxes, Brazil lookup
//! tables, vegetation scoring) used by the backend. Nothing here performs I/O.

pub mod brazil;
pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
