//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate document store calls into the pet directory operations.
//! - Keep callers (CLI, future routing layers) decoupled from storage details.

pub mod pets_service;
