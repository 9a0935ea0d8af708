use crate::{entity_builder, JsScriptEvaluator, ScriptSettings, SeedConfig};
use chrono::NaiveDate;
use seed_core::{
    define_entity, BuilderConfig, EntityBuilder, EntityBuildingError, EntityRef, EntityTypes,
    LookupError, ScriptError,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default, Debug)]
struct BasicTestEntity {
    string_property: String,
    integer_property: i32,
    date_property: Option<NaiveDate>,
}

define_entity!(BasicTestEntity, "BasicTestEntity", {
    string_property,
    integer_property,
    date_property,
});

#[derive(Default, Debug)]
struct AnotherTestEntity {
    description: String,
}

define_entity!(AnotherTestEntity, "AnotherTestEntity", { description });

#[derive(Default, Debug)]
struct TestEntityWithToOneRelationship {
    referenced_entity: Option<Rc<BasicTestEntity>>,
    test_entity_with_to_one_relationship: Option<Rc<TestEntityWithToOneRelationship>>,
}

define_entity!(TestEntityWithToOneRelationship, "TestEntityWithToOneRelationship", {
    referenced_entity,
    test_entity_with_to_one_relationship,
});

#[derive(Default, Debug)]
struct TestEntityWithToManyRelationship {
    to_many_relationship: Vec<Rc<BasicTestEntity>>,
}

define_entity!(TestEntityWithToManyRelationship, "TestEntityWithToManyRelationship", {
    to_many_relationship,
});

fn config() -> SeedConfig {
    SeedConfig {
        builder: BuilderConfig::default(),
        scripts: ScriptSettings::with_root(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata")),
    }
}

fn types() -> EntityTypes {
    let mut types = EntityTypes::new();
    types.register::<BasicTestEntity>().unwrap();
    types.register::<AnotherTestEntity>().unwrap();
    types.register::<TestEntityWithToOneRelationship>().unwrap();
    types.register::<TestEntityWithToManyRelationship>().unwrap();
    types
}

/// Builder with the shared definitions already loaded.
fn set_up() -> EntityBuilder<JsScriptEvaluator> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut builder = entity_builder(config(), types());
    builder
        .build_entities("testEntityDefinitions.js")
        .expect("shared definitions build");
    builder
}

fn assert_entity_of_type_was_built<T: 'static>(builder: &EntityBuilder<JsScriptEvaluator>, name: &str) {
    let entity = builder
        .entity_by_name_any(name)
        .unwrap_or_else(|error| panic!("entity {name} was not built: {error}"));
    assert!(entity.is::<T>(), "entity {name} has type {}", entity.type_name());
}

#[test]
fn gets_created_entity_by_name() {
    let builder = set_up();
    assert!(builder.entity_by_name::<BasicTestEntity>("basicEntity").is_ok());
}

#[test]
fn get_entity_by_name_fails_for_nonexisting_entity() {
    let builder = set_up();
    assert_eq!(
        builder.entity_by_name::<BasicTestEntity>("notExisting").err(),
        Some(LookupError::NotFound {
            name: "notExisting".into()
        })
    );
}

#[test]
fn get_entity_by_name_fails_if_requested_type_does_not_match() {
    let builder = set_up();
    assert!(matches!(
        builder.entity_by_name::<AnotherTestEntity>("basicEntity"),
        Err(LookupError::TypeMismatch { .. })
    ));
}

#[test]
fn creates_multiple_entities() {
    let builder = set_up();
    assert_entity_of_type_was_built::<BasicTestEntity>(&builder, "basicEntity");
    assert_entity_of_type_was_built::<BasicTestEntity>(&builder, "secondBasicEntity");
    assert_entity_of_type_was_built::<AnotherTestEntity>(&builder, "entityOfAnotherClass");
    assert_eq!(
        builder
            .entity_by_name::<AnotherTestEntity>("entityOfAnotherClass")
            .unwrap()
            .description,
        "another class"
    );
}

#[test]
fn sets_literal_properties() {
    let builder = set_up();
    let entity = builder
        .entity_by_name::<BasicTestEntity>("basicEntity")
        .unwrap();
    assert_eq!(entity.string_property, "a string value");
    assert_eq!(entity.integer_property, 5);
    assert_eq!(entity.date_property, NaiveDate::from_ymd_opt(2015, 11, 18));
}

#[test]
fn lookup_is_identity_stable() {
    let builder = set_up();
    let first = builder
        .entity_by_name::<BasicTestEntity>("basicEntity")
        .unwrap();
    let second = builder
        .entity_by_name::<BasicTestEntity>("basicEntity")
        .unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn builds_referenced_entity_in_place() {
    let builder = set_up();
    let entity = builder
        .entity_by_name::<TestEntityWithToOneRelationship>("entityWithToOneRelationship")
        .unwrap();
    assert_entity_of_type_was_built::<BasicTestEntity>(&builder, "referencedInstance");

    let referenced = builder
        .entity_by_name::<BasicTestEntity>("referencedInstance")
        .unwrap();
    assert!(Rc::ptr_eq(&referenced, entity.referenced_entity.as_ref().unwrap()));
    assert_eq!(referenced.string_property, "string in referenced entity");
    assert_eq!(referenced.integer_property, 222);
}

#[test]
fn builds_entities_with_arbitrary_nesting() {
    let builder = set_up();
    let entity = builder
        .entity_by_name::<TestEntityWithToOneRelationship>("deeplyNestedEntities")
        .unwrap();

    let nest1 = entity.test_entity_with_to_one_relationship.clone().unwrap();
    let nest2 = nest1.test_entity_with_to_one_relationship.clone().unwrap();
    let nest3 = nest2.referenced_entity.clone().unwrap();

    assert!(Rc::ptr_eq(
        &nest1,
        &builder
            .entity_by_name::<TestEntityWithToOneRelationship>("nest1")
            .unwrap()
    ));
    assert!(Rc::ptr_eq(
        &nest2,
        &builder
            .entity_by_name::<TestEntityWithToOneRelationship>("nest2")
            .unwrap()
    ));
    assert!(Rc::ptr_eq(
        &nest3,
        &builder.entity_by_name::<BasicTestEntity>("nest3").unwrap()
    ));
    assert_eq!(nest3.string_property, "deeply nested string");
}

#[test]
fn resolves_references() {
    let builder = set_up();
    let entity = builder
        .entity_by_name::<TestEntityWithToOneRelationship>("entityReferencingPreviouslyCreatedEntity")
        .unwrap();
    let second = builder
        .entity_by_name::<BasicTestEntity>("secondBasicEntity")
        .unwrap();
    assert!(Rc::ptr_eq(&second, entity.referenced_entity.as_ref().unwrap()));
}

#[test]
fn fails_if_referenced_entity_does_not_exist() {
    let mut builder = set_up();
    let error = builder
        .build_entities("failingBecauseOfMissingReferencedEntity.js")
        .unwrap_err();
    assert!(matches!(
        error,
        EntityBuildingError::UnresolvedReference { ref name, .. } if name == "thisEntityWasNeverDefined"
    ));
    assert!(builder
        .entity_by_name::<TestEntityWithToOneRelationship>("entityReferencingMissingEntity")
        .is_err());
}

#[test]
fn fails_if_an_entity_name_has_already_been_used() {
    let mut builder = set_up();
    assert!(matches!(
        builder.build_entities("failingBecauseOfReusedName.js"),
        Err(EntityBuildingError::DuplicateName(_))
    ));
    assert_eq!(
        builder
            .entity_by_name::<BasicTestEntity>("basicEntity")
            .unwrap()
            .string_property,
        "a string value"
    );
}

#[test]
fn reloading_the_same_script_fails() {
    let mut builder = set_up();
    assert!(matches!(
        builder.build_entities("testEntityDefinitions.js"),
        Err(EntityBuildingError::DuplicateName(_))
    ));
}

#[test]
fn forward_references_are_rejected() {
    let mut builder = set_up();
    assert!(matches!(
        builder.build_entities("forwardReference"),
        Err(EntityBuildingError::UnresolvedReference { .. })
    ));
}

#[test]
fn sets_collection_of_inline_entities() {
    let builder = set_up();
    let entity = builder
        .entity_by_name::<TestEntityWithToManyRelationship>("entityWithCollection")
        .unwrap();
    let collection = &entity.to_many_relationship;

    assert_eq!(collection.len(), 2);
    assert!(!Rc::ptr_eq(&collection[0], &collection[1]));
    assert!(collection.iter().all(|entity| entity.integer_property == 5));
}

#[test]
fn notifies_entity_created_listener_in_the_order_of_entity_creation() {
    let mut builder = set_up();
    builder.clear();

    let created = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&created);
    builder.add_entity_created_listener(move |entity: &EntityRef| {
        sink.borrow_mut().push(entity.clone())
    });
    builder
        .build_entities("testOrderOfEntityCreatedListenerNotifications.js")
        .unwrap();

    let created = created.borrow();
    assert_eq!(created.len(), 4);
    assert!(created[0].is::<BasicTestEntity>());
    assert!(created[1].is::<TestEntityWithToOneRelationship>());
    assert!(created[2].is::<AnotherTestEntity>());
    assert!(created[3].is::<TestEntityWithToOneRelationship>());

    let names: Vec<_> = created.iter().map(|entity| entity.name()).collect();
    assert_eq!(
        names,
        [Some("nestedChild"), Some("parent"), Some("another"), Some("last")]
    );
    assert!(created[0].ptr_eq(&builder.entity_by_name_any("nestedChild").unwrap()));
}

#[test]
fn clears_entities() {
    let mut builder = set_up();
    assert!(
        builder.entity_by_name::<BasicTestEntity>("basicEntity").is_ok(),
        "basicEntity was not available before calling clear"
    );

    builder.clear();
    assert!(matches!(
        builder.entity_by_name::<BasicTestEntity>("basicEntity"),
        Err(LookupError::NotFound { .. })
    ));

    builder
        .build_entities("testEntityDefinitions.js")
        .expect("names are reusable after clear");
}

#[test]
fn loads_resources_from_subdirectories() {
    let mut builder = set_up();
    builder.build_entities("nested/other").unwrap();
    assert_eq!(
        builder
            .entity_by_name::<AnotherTestEntity>("fromSubdirectory")
            .unwrap()
            .description,
        "loaded from a nested resource path"
    );
}

#[test]
fn builds_scripts_with_deeply_nested_definitions() {
    let mut builder = set_up();

    let mut source =
        r#"create("BasicTestEntity", "deepLeaf", { integer_property: 200 })"#.to_string();
    source = format!(
        r#"create("TestEntityWithToOneRelationship", "deep1", {{ referenced_entity: {source} }})"#
    );
    for level in 2..=200 {
        source = format!(
            r#"create("TestEntityWithToOneRelationship", "deep{level}", {{ test_entity_with_to_one_relationship: {source} }})"#
        );
    }

    let definitions = builder
        .evaluator_mut()
        .evaluate_source("deep", &source)
        .unwrap();
    assert_eq!(builder.build_definitions(&definitions).unwrap().created, 201);

    let mut current = builder
        .entity_by_name::<TestEntityWithToOneRelationship>("deep200")
        .unwrap();
    for _ in 1..200 {
        current = current.test_entity_with_to_one_relationship.clone().unwrap();
    }
    assert!(Rc::ptr_eq(
        &current,
        &builder
            .entity_by_name::<TestEntityWithToOneRelationship>("deep1")
            .unwrap()
    ));
    assert_eq!(current.referenced_entity.as_ref().unwrap().integer_property, 200);
}

#[test]
fn reused_definition_handles_share_one_entity() {
    let mut builder = set_up();
    let basic_before = builder.entities_of::<BasicTestEntity>().len();
    builder.build_entities("sharedDefinition").unwrap();

    let first = builder
        .entity_by_name::<TestEntityWithToOneRelationship>("firstOwner")
        .unwrap();
    let second = builder
        .entity_by_name::<TestEntityWithToOneRelationship>("secondOwner")
        .unwrap();
    let shared = builder
        .entity_by_name::<BasicTestEntity>("sharedChild")
        .unwrap();

    assert!(Rc::ptr_eq(&shared, first.referenced_entity.as_ref().unwrap()));
    assert!(Rc::ptr_eq(&shared, second.referenced_entity.as_ref().unwrap()));
    assert_eq!(builder.entities_of::<BasicTestEntity>().len(), basic_before + 1);
}

#[test]
fn script_failures_are_build_errors() {
    let mut builder = set_up();
    assert!(matches!(
        builder.build_entities("syntaxError.js"),
        Err(EntityBuildingError::Script(ScriptError::Evaluation { .. }))
    ));
    assert!(matches!(
        builder.build_entities("missing.js"),
        Err(EntityBuildingError::Script(ScriptError::ResourceNotFound { .. }))
    ));
    assert!(matches!(
        builder.build_entities("../Cargo.toml"),
        Err(EntityBuildingError::Script(ScriptError::InvalidResourceName { .. }))
    ));
}
