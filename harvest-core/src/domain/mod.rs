//! Core domain types
//!
//! This module contains the core domain structures used across Harvest services.
//! These types are shared between the orchestrator (which owns job state) and
//! the client/CLI (which submit and inspect jobs).

pub mod backend;
pub mod job;
pub mod request;
