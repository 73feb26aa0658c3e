//! Collection, document and query vocabulary of the store.

use crate::model::pet::PetType;
use crate::model::DocumentId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// JSON object stored for one document, without its id.
pub type DocumentBody = Map<String, Value>;

/// Field name carrying the id once a document leaves the store.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Cats,
    Dogs,
    Owners,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Cats, Self::Dogs, Self::Owners];

    pub fn table_name(self) -> &'static str {
        match self {
            Self::Cats => "cats",
            Self::Dogs => "dogs",
            Self::Owners => "owners",
        }
    }

    pub fn for_pet(pet_type: PetType) -> Self {
        match pet_type {
            PetType::Cat => Self::Cats,
            PetType::Dog => Self::Dogs,
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub body: DocumentBody,
}

impl Document {
    /// Decodes the document into a typed model, exposing the id as `_id`.
    pub fn decode<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        let mut body = self.body;
        body.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
        serde_json::from_value(Value::Object(body))
    }
}

/// Serializes a create payload into a storable body.
///
/// Fails when the value does not serialize to a JSON object.
pub fn encode_body<T: Serialize>(value: &T) -> serde_json::Result<DocumentBody> {
    match serde_json::to_value(value)? {
        Value::Object(mut body) => {
            body.remove(ID_FIELD);
            Ok(body)
        }
        other => Err(serde::ser::Error::custom(format!(
            "document body must be a JSON object, got `{other}`"
        ))),
    }
}

/// Document selection for `find`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document of the collection.
    All,
    /// Top-level field equal to a scalar JSON value, type included.
    Eq { field: String, value: Value },
    /// Documents whose id is one of `ids`.
    IdIn(Vec<DocumentId>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn id_in(ids: impl IntoIterator<Item = DocumentId>) -> Self {
        Self::IdIn(ids.into_iter().collect())
    }
}

/// Body fields kept on returned documents. The id is always returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Fields(Vec<String>),
}

impl Projection {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(fields.into_iter().map(Into::into).collect())
    }

    pub(crate) fn apply(&self, body: &mut DocumentBody) {
        if let Self::Fields(fields) = self {
            body.retain(|key, _| fields.iter().any(|field| field == key));
        }
    }
}

/// Output of the size grouping stage: every document whose summed array
/// sizes equal `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    pub total: i64,
    pub ids: BTreeSet<DocumentId>,
}
