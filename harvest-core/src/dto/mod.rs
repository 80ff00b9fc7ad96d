//! Data Transfer Objects for the HTTP API
//!
//! This module contains DTOs exchanged between the orchestrator and its
//! clients, plus the configuration payload handed to collector workers.

pub mod backend;
pub mod collector;
pub mod config;
pub mod job;
pub mod store;
