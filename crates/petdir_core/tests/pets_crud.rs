use petdir_core::db::open_db_in_memory;
use petdir_core::store::encode_body;
use petdir_core::{
    Collection, CreateCat, CreateDog, DocumentStore, Pet, PetType, PetsService, ServiceError,
    SqliteDocumentStore,
};
use serde_json::json;
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn add_cat_then_find_by_id_returns_equivalent_document() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let payload = CreateCat {
        name: "Tom".to_string(),
        age: Some(3),
        breed: Some("Siamese".to_string()),
        weight: Some(4.5),
    };
    let created = service.add_cat(&payload).unwrap();
    assert_eq!(created.name, "Tom");
    assert_eq!(created.breed.as_deref(), Some("Siamese"));

    let loaded = service.find_cat_by_id(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn add_dog_then_find_by_id_returns_equivalent_document() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let created = service
        .add_dog(&CreateDog::new("Rex").with_weight(20.0).wagging(true))
        .unwrap();
    let loaded = service.find_dog_by_id(created.id).unwrap();
    assert_eq!(loaded, created);
    assert!(loaded.wags_tail);
}

#[test]
fn identical_payloads_create_distinct_documents() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let first = service.add_cat(&CreateCat::new("Twin")).unwrap();
    let second = service.add_cat(&CreateCat::new("Twin")).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(service.find_all(Some(PetType::Cat)).unwrap().len(), 2);
}

#[test]
fn invalid_payloads_are_rejected_before_persistence() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let err = service
        .add_cat(&CreateCat::new("Heavy").with_weight(-2.0))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    let err = service.add_dog(&CreateDog::new(" ")).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert!(service.find_all(None).unwrap().is_empty());
}

#[test]
fn find_by_unknown_id_fails_with_not_found_message() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let dog = service.add_dog(&CreateDog::new("Rex")).unwrap();

    let cat_err = service.find_cat_by_id(Uuid::new_v4()).unwrap_err();
    assert!(cat_err.is_not_found());
    assert_eq!(cat_err.to_string(), "Cat with given id can not be found");

    // A dog id does not resolve in the cat collection.
    let cross_err = service.find_cat_by_id(dog.id).unwrap_err();
    assert!(cross_err.is_not_found());

    let dog_err = service.find_dog_by_id(Uuid::new_v4()).unwrap_err();
    assert_eq!(dog_err.to_string(), "Dog with given id can not be found");
}

#[test]
fn find_all_by_type_and_unfiltered_union() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let tom = service.add_cat(&CreateCat::new("Tom")).unwrap();
    let rex = service.add_dog(&CreateDog::new("Rex")).unwrap();
    let kitty = service.add_cat(&CreateCat::new("Kitty")).unwrap();

    let cats = service.find_all(Some(PetType::Cat)).unwrap();
    assert_eq!(
        cats.iter().map(Pet::id).collect::<Vec<_>>(),
        vec![tom.id, kitty.id]
    );
    assert!(cats.iter().all(|pet| pet.pet_type() == PetType::Cat));

    let dogs = service.find_all(Some(PetType::Dog)).unwrap();
    assert_eq!(dogs, vec![Pet::Dog(rex.clone())]);

    let all = service.find_all(None).unwrap();
    assert_eq!(
        all.iter().map(Pet::id).collect::<Vec<_>>(),
        vec![tom.id, kitty.id, rex.id]
    );
}

#[test]
fn repeated_find_all_returns_same_set() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    for name in ["a", "b", "c"] {
        service.add_cat(&CreateCat::new(name)).unwrap();
    }

    let first: HashSet<_> = service
        .find_all(Some(PetType::Cat))
        .unwrap()
        .iter()
        .map(Pet::id)
        .collect();
    let second: HashSet<_> = service
        .find_all(Some(PetType::Cat))
        .unwrap()
        .iter()
        .map(Pet::id)
        .collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn weights_sum_and_treat_missing_weight_as_zero() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    store
        .insert(
            Collection::Cats,
            encode_body(&json!({"name": "no weight"})).unwrap(),
        )
        .unwrap();
    store
        .insert(
            Collection::Cats,
            encode_body(&json!({"name": "garbled", "weight": "heavy"})).unwrap(),
        )
        .unwrap();
    let service = PetsService::new(store);

    assert_eq!(service.get_cats_weight().unwrap(), 0.0);
    assert_eq!(service.get_dogs_weight().unwrap(), 0.0);

    service
        .add_cat(&CreateCat::new("Tom").with_weight(4.5))
        .unwrap();
    assert_eq!(service.get_cats_weight().unwrap(), 4.5);

    service
        .add_cat(&CreateCat::new("Kitty").with_weight(2.25))
        .unwrap();
    assert_eq!(service.get_cats_weight().unwrap(), 6.75);

    service
        .add_dog(&CreateDog::new("Rex").with_weight(20.0))
        .unwrap();
    service.add_dog(&CreateDog::new("Fido")).unwrap();
    assert_eq!(service.get_dogs_weight().unwrap(), 20.0);
    assert_eq!(service.get_cats_weight().unwrap(), 6.75);
}

#[test]
fn happy_dogs_lists_only_tail_waggers_in_storage_order() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    service
        .add_dog(&CreateDog::new("Rex").wagging(true))
        .unwrap();
    service
        .add_dog(&CreateDog::new("Grumpy").wagging(false))
        .unwrap();
    service
        .add_dog(&CreateDog::new("Buddy").wagging(true))
        .unwrap();
    service
        .add_dog(&CreateDog::new("Rex").wagging(true))
        .unwrap();
    service.add_cat(&CreateCat::new("Purring")).unwrap();

    assert_eq!(
        service.get_happy_dogs().unwrap(),
        vec!["Rex".to_string(), "Buddy".to_string(), "Rex".to_string()]
    );
}

#[test]
fn happy_dogs_is_empty_without_dogs() {
    let conn = open_db_in_memory().unwrap();
    let service = PetsService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    assert!(service.get_happy_dogs().unwrap().is_empty());
}

#[test]
fn stored_pets_with_fractional_age_still_list_and_load() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let inserted = store
        .insert(
            Collection::Cats,
            encode_body(&json!({"name": "tom", "age": 1.5, "weight": 3})).unwrap(),
        )
        .unwrap();
    let service = PetsService::new(store);

    let cats = service.find_all(Some(PetType::Cat)).unwrap();
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].name(), "tom");
    assert_eq!(service.get_cats_weight().unwrap(), 3.0);

    let loaded = service.find_cat_by_id(inserted.id).unwrap();
    assert_eq!(loaded.age.and_then(|age| age.as_f64()), Some(1.5));
}

#[test]
fn happy_dogs_skips_waggers_without_a_name() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    store
        .insert(
            Collection::Dogs,
            encode_body(&json!({"wagsTail": true})).unwrap(),
        )
        .unwrap();
    store
        .insert(
            Collection::Dogs,
            encode_body(&json!({"name": 7, "wagsTail": true})).unwrap(),
        )
        .unwrap();
    let service = PetsService::new(store);
    service
        .add_dog(&CreateDog::new("Buddy").wagging(true))
        .unwrap();

    assert_eq!(service.get_happy_dogs().unwrap(), vec!["Buddy".to_string()]);
}
