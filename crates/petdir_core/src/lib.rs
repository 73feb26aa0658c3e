//! Core domain logic for the pet directory.
//! Cats, dogs and their owners stored as JSON documents in SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::owner::{CreateOwner, Owner, OwnerWithPets, PetsCountGroup};
pub use model::pet::{Cat, CreateCat, CreateDog, Dog, Pet, PetType, PetValidationError};
pub use model::DocumentId;
pub use service::pets_service::{parse_pet_id, PetsService, ServiceError, ServiceResult};
pub use store::{
    Collection, Document, DocumentStore, Filter, Projection, SqliteDocumentStore, StoreError,
    StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
