//! Pet directory use-case service.
//!
//! # Responsibility
//! - Create and look up cats and dogs.
//! - Compute weight totals, happy dog names and the owner ranking.
//!
//! # Invariants
//! - The service holds no state besides its store handle.
//! - Store failures are returned unchanged; nothing is retried.
//! - Owner→pet references are resolved by inner join; dangling ids vanish.

use crate::model::owner::{CreateOwner, Owner, OwnerWithPets, PetsCountGroup};
use crate::model::pet::{Cat, CreateCat, CreateDog, Dog, Pet, PetType, PetValidationError};
use crate::model::DocumentId;
use crate::store::{
    encode_body, Collection, Document, DocumentStore, Filter, Projection, StoreError,
};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

const WEIGHT_FIELD: &str = "weight";
const NAME_FIELD: &str = "name";
const WAGS_TAIL_FIELD: &str = "wagsTail";
const OWNER_CATS_FIELD: &str = "cats";
const OWNER_DOGS_FIELD: &str = "dogs";
const TOP_PET_COUNT_GROUPS: usize = 3;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for pet directory use-cases.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Point lookup matched no document.
    #[error("{} with given id can not be found", .0.label())]
    NotFound(PetType),
    /// Create payload rejected before persistence.
    #[error(transparent)]
    Validation(#[from] PetValidationError),
    /// Persistence-layer failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Stored document cannot be read as its typed model.
    #[error("invalid document `{id}` in `{collection}`: {message}")]
    InvalidData {
        collection: Collection,
        id: DocumentId,
        message: String,
    },
}

impl ServiceError {
    /// True for the lookup failures a routing layer reports as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Parses a caller-supplied id for a pet lookup.
///
/// Text that is not an id cannot match any document, so it is reported as
/// the same `NotFound` a missing document produces.
pub fn parse_pet_id(pet_type: PetType, text: &str) -> ServiceResult<DocumentId> {
    DocumentId::parse_str(text.trim()).map_err(|_| ServiceError::NotFound(pet_type))
}

/// Pet directory facade over a document store.
pub struct PetsService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> PetsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new cat. Identical payloads create distinct documents.
    pub fn add_cat(&self, payload: &CreateCat) -> ServiceResult<Cat> {
        payload.validate()?;
        let cat: Cat = self.insert(Collection::Cats, payload)?;
        info!("event=service_add_cat module=service status=ok id={}", cat.id);
        Ok(cat)
    }

    /// Persists a new dog. Identical payloads create distinct documents.
    pub fn add_dog(&self, payload: &CreateDog) -> ServiceResult<Dog> {
        payload.validate()?;
        let dog: Dog = self.insert(Collection::Dogs, payload)?;
        info!("event=service_add_dog module=service status=ok id={}", dog.id);
        Ok(dog)
    }

    /// Seeds an owner document; pet ids are stored as given, unchecked.
    pub fn add_owner(&self, payload: &CreateOwner) -> ServiceResult<Owner> {
        let owner: Owner = self.insert(Collection::Owners, payload)?;
        info!(
            "event=service_add_owner module=service status=ok id={} pets={}",
            owner.id,
            owner.total_pets()
        );
        Ok(owner)
    }

    /// Lists pets of one kind, or cats followed by dogs when `pet_type` is `None`.
    pub fn find_all(&self, pet_type: Option<PetType>) -> ServiceResult<Vec<Pet>> {
        let pets: Vec<Pet> = match pet_type {
            Some(PetType::Cat) => self.list_cats()?.into_iter().map(Pet::Cat).collect(),
            Some(PetType::Dog) => self.list_dogs()?.into_iter().map(Pet::Dog).collect(),
            None => {
                let mut pets: Vec<Pet> = self.list_cats()?.into_iter().map(Pet::Cat).collect();
                pets.extend(self.list_dogs()?.into_iter().map(Pet::Dog));
                pets
            }
        };

        debug!(
            "event=service_find_all module=service status=ok pet_type={} count={}",
            pet_type.map_or("any", PetType::as_str),
            pets.len()
        );
        Ok(pets)
    }

    pub fn find_cat_by_id(&self, id: DocumentId) -> ServiceResult<Cat> {
        self.find_pet_by_id(PetType::Cat, id)
    }

    pub fn find_dog_by_id(&self, id: DocumentId) -> ServiceResult<Dog> {
        self.find_pet_by_id(PetType::Dog, id)
    }

    /// Sum of cat weights; cats without a numeric weight add nothing.
    pub fn get_cats_weight(&self) -> ServiceResult<f64> {
        self.total_weight(Collection::Cats)
    }

    /// Sum of dog weights; dogs without a numeric weight add nothing.
    pub fn get_dogs_weight(&self) -> ServiceResult<f64> {
        self.total_weight(Collection::Dogs)
    }

    /// Names of dogs whose `wagsTail` is `true`, in storage order.
    ///
    /// Matching dogs without a string `name` are skipped.
    pub fn get_happy_dogs(&self) -> ServiceResult<Vec<String>> {
        let documents = self.store.find(
            Collection::Dogs,
            &Filter::eq(WAGS_TAIL_FIELD, true),
            &Projection::fields([NAME_FIELD]),
        )?;

        let names = documents
            .into_iter()
            .filter_map(|document| match document.body.get(NAME_FIELD) {
                Some(Value::String(name)) => Some(name.clone()),
                _ => {
                    warn!(
                        "event=service_happy_dogs module=service status=skipped id={} reason=missing_name",
                        document.id
                    );
                    None
                }
            })
            .collect::<Vec<_>>();
        Ok(names)
    }

    /// Ranks owners by total pet count and keeps the three largest counts.
    ///
    /// Each returned group lists only owners aged exactly `owner_age`, with
    /// their cats and dogs resolved. Groups whose owners are all filtered out
    /// are still returned, with an empty `owners` list; fewer than three
    /// distinct counts yield fewer than three groups.
    pub fn get_top_three_pet_owners_at_age(
        &self,
        owner_age: i64,
    ) -> ServiceResult<Vec<PetsCountGroup>> {
        let mut groups = self
            .store
            .group_by_total_size(Collection::Owners, &[OWNER_CATS_FIELD, OWNER_DOGS_FIELD])?;
        groups.sort_by(|left, right| right.total.cmp(&left.total));
        groups.truncate(TOP_PET_COUNT_GROUPS);

        let ranking = groups
            .into_iter()
            .map(|group| {
                Ok(PetsCountGroup {
                    pets_count: group.total,
                    owners: self.resolve_owners_at_age(&group.ids, owner_age)?,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        debug!(
            "event=service_top_owners module=service status=ok owner_age={} groups={}",
            owner_age,
            ranking.len()
        );
        Ok(ranking)
    }

    fn find_pet_by_id<T: DeserializeOwned>(
        &self,
        pet_type: PetType,
        id: DocumentId,
    ) -> ServiceResult<T> {
        let collection = Collection::for_pet(pet_type);
        match self.store.find_by_id(collection, id)? {
            Some(document) => decode(collection, document),
            None => {
                warn!(
                    "event=service_find_by_id module=service status=not_found pet_type={pet_type} id={id}"
                );
                Err(ServiceError::NotFound(pet_type))
            }
        }
    }

    fn list_cats(&self) -> ServiceResult<Vec<Cat>> {
        self.find_typed(Collection::Cats, &Filter::All)
    }

    fn list_dogs(&self) -> ServiceResult<Vec<Dog>> {
        self.find_typed(Collection::Dogs, &Filter::All)
    }

    fn total_weight(&self, collection: Collection) -> ServiceResult<f64> {
        let documents =
            self.store
                .find(collection, &Filter::All, &Projection::fields([WEIGHT_FIELD]))?;
        let total: f64 = documents
            .iter()
            .filter_map(|document| document.body.get(WEIGHT_FIELD).and_then(Value::as_f64))
            .sum();

        debug!(
            "event=service_total_weight module=service status=ok collection={} documents={} total={}",
            collection,
            documents.len(),
            total
        );
        Ok(total)
    }

    fn resolve_owners_at_age(
        &self,
        owner_ids: &BTreeSet<DocumentId>,
        owner_age: i64,
    ) -> ServiceResult<Vec<OwnerWithPets>> {
        let owners: Vec<Owner> =
            self.find_typed(Collection::Owners, &Filter::id_in(owner_ids.iter().copied()))?;

        let mut resolved = Vec::new();
        for owner in owners.into_iter().filter(|owner| owner.is_aged(owner_age)) {
            let cats = self.find_typed(Collection::Cats, &Filter::id_in(owner.cats))?;
            let dogs = self.find_typed(Collection::Dogs, &Filter::id_in(owner.dogs))?;
            resolved.push(OwnerWithPets {
                id: owner.id,
                name: owner.name,
                age: owner.age,
                cats,
                dogs,
            });
        }
        Ok(resolved)
    }

    fn find_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> ServiceResult<Vec<T>> {
        self.store
            .find(collection, filter, &Projection::All)?
            .into_iter()
            .map(|document| decode(collection, document))
            .collect()
    }

    fn insert<P: Serialize, T: DeserializeOwned>(
        &self,
        collection: Collection,
        payload: &P,
    ) -> ServiceResult<T> {
        let body = encode_body(payload).map_err(StoreError::from)?;
        let document = self.store.insert(collection, body)?;
        decode(collection, document)
    }
}

fn decode<T: DeserializeOwned>(collection: Collection, document: Document) -> ServiceResult<T> {
    let id = document.id;
    document.decode().map_err(|err| ServiceError::InvalidData {
        collection,
        id,
        message: err.to_string(),
    })
}
