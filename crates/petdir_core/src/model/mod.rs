//! Typed documents for the pet directory.
//!
//! # Responsibility
//! - Define the cat/dog/owner shapes exchanged with callers.
//! - Validate create payloads before they reach the store.
//!
//! # Invariants
//! - Identifiers are assigned by the store, never by callers.
//! - Owner pet lists are weak references; nothing guarantees the target exists.

pub mod owner;
pub mod pet;

use uuid::Uuid;

/// Store-assigned identifier shared by every collection.
pub type DocumentId = Uuid;
