//! Owner documents and the owner ranking read model.

use super::pet::{Cat, Dog};
use super::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Persisted owner document.
///
/// `cats` and `dogs` hold ids of documents in the respective collections.
/// They are references only and may dangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub age: Number,
    #[serde(default)]
    pub cats: Vec<DocumentId>,
    #[serde(default)]
    pub dogs: Vec<DocumentId>,
}

impl Owner {
    pub fn total_pets(&self) -> usize {
        self.cats.len() + self.dogs.len()
    }

    /// Numeric age comparison: `30` and `30.0` both match `30`.
    pub fn is_aged(&self, age: i64) -> bool {
        match self.age.as_i64() {
            Some(stored) => stored == age,
            None => self.age.as_f64() == Some(age as f64),
        }
    }
}

/// Create payload used to seed owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOwner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub age: i64,
    #[serde(default)]
    pub cats: Vec<DocumentId>,
    #[serde(default)]
    pub dogs: Vec<DocumentId>,
}

impl CreateOwner {
    pub fn new(age: i64) -> Self {
        Self {
            age,
            ..Self::default()
        }
    }

    pub fn with_cats(mut self, cats: impl IntoIterator<Item = DocumentId>) -> Self {
        self.cats.extend(cats);
        self
    }

    pub fn with_dogs(mut self, dogs: impl IntoIterator<Item = DocumentId>) -> Self {
        self.dogs.extend(dogs);
        self
    }
}

/// Owner with pet references resolved into full documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerWithPets {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub age: Number,
    pub cats: Vec<Cat>,
    pub dogs: Vec<Dog>,
}

/// One ranking bucket: every matching owner holding exactly `pets_count` pets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetsCountGroup {
    pub pets_count: i64,
    pub owners: Vec<OwnerWithPets>,
}
