//! Cat and dog documents.

use super::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Pet kind, used to pick a collection and to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Cat,
    Dog,
}

impl PetType {
    /// Capitalized label used in caller-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cat => "Cat",
            Self::Dog => "Dog",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Dog => "dog",
        }
    }
}

impl Display for PetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cat" => Ok(Self::Cat),
            "dog" => Ok(Self::Dog),
            other => Err(format!("unsupported pet type `{other}`; expected cat|dog")),
        }
    }
}

/// Persisted cat document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    /// Any JSON number; stored documents may carry non-integer ages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Persisted dog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    /// Any JSON number; stored documents may carry non-integer ages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub wags_tail: bool,
}

/// Create payload for a cat; persisted as-is once validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCat {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl CreateCat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn validate(&self) -> Result<(), PetValidationError> {
        validate_pet_fields(&self.name, self.weight)
    }
}

/// Create payload for a dog; persisted as-is once validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDog {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub wags_tail: bool,
}

impl CreateDog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn wagging(mut self, wags_tail: bool) -> Self {
        self.wags_tail = wags_tail;
        self
    }

    pub fn validate(&self) -> Result<(), PetValidationError> {
        validate_pet_fields(&self.name, self.weight)
    }
}

/// Either pet kind, as returned by unfiltered listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Pet {
    Cat(Cat),
    Dog(Dog),
}

impl Pet {
    pub fn id(&self) -> DocumentId {
        match self {
            Self::Cat(cat) => cat.id,
            Self::Dog(dog) => dog.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Cat(cat) => &cat.name,
            Self::Dog(dog) => &dog.name,
        }
    }

    pub fn pet_type(&self) -> PetType {
        match self {
            Self::Cat(_) => PetType::Cat,
            Self::Dog(_) => PetType::Dog,
        }
    }
}

/// Rejections raised before a pet reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PetValidationError {
    #[error("pet name must not be blank")]
    BlankName,
    #[error("pet weight must be a finite non-negative number, got {0}")]
    InvalidWeight(f64),
}

fn validate_pet_fields(name: &str, weight: Option<f64>) -> Result<(), PetValidationError> {
    if name.trim().is_empty() {
        return Err(PetValidationError::BlankName);
    }
    match weight {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(PetValidationError::InvalidWeight(value))
        }
        _ => Ok(()),
    }
}
