//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services coordinate the registry, collectors and the store.

pub mod job;

// Re-export for convenience
pub use job as job_service;
pub use job::{JobError, JobOrchestrator, OrchestratorSettings, ValidatedRequest};
