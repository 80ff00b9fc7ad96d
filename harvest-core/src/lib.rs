//! Harvest Core
//!
//! Core types and abstractions for the Harvest collection service.
//!
//! This crate contains:
//! - Domain types: Core business entities (JobRequest, JobRecord, backends)
//! - DTOs: Data transfer objects exchanged over the HTTP API
//! - Validation: Admission rules applied to job requests

pub mod domain;
pub mod dto;
pub mod validation;
