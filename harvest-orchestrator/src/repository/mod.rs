//! Repository Module
//!
//! Data access layer for the orchestrator.
//! Job records live in memory for the lifetime of the process.

pub mod job;

// Re-export for convenience
pub use job::{JobRegistry, RegistryError};
