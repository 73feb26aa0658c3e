//! Document store gateway.
//!
//! # Responsibility
//! - Expose collection-level insert/find/lookup/group primitives.
//! - Keep SQL and JSON path details behind the `DocumentStore` trait.
//!
//! # Invariants
//! - Document bodies are JSON objects; the id lives outside the body.
//! - Reads return documents in collection natural (insertion) order.

pub mod document;
pub mod document_store;

pub use document::{
    encode_body, Collection, Document, DocumentBody, Filter, Projection, SizeGroup,
};
pub use document_store::{DocumentStore, SqliteDocumentStore, StoreError, StoreResult};
