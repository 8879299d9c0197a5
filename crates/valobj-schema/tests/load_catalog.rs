//! Integration test: load the fixture catalogs from disk and drive
//! instances built from them through every standard codec.

use std::path::PathBuf;

use valobj_codec::standard_registry;
use valobj_core::{mapping, Format, Instance, ObjectError, Value};
use valobj_schema::{CatalogError, SchemaCatalog};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn catalog() -> SchemaCatalog {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut catalog = SchemaCatalog::new();
    catalog.load_path(fixture("records.yaml")).unwrap();
    catalog
}

#[test]
fn test_yaml_fixture_declares_every_record() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 9);
    assert_eq!(
        catalog.get("Person").unwrap().attributes(),
        vec!["name", "surname", "age"]
    );
}

#[test]
fn test_json_fixture_loads_alongside() {
    let mut catalog = catalog();
    let loaded = catalog.load_path(fixture("records.json")).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(catalog.len(), 11);

    let team = catalog.get("Team").unwrap();
    let t = Instance::from_text(
        &team,
        &standard_registry(),
        Format::Json,
        r#"{"title": "core", "members": [{"name": "ada", "coords": [1.5, 2.0]}]}"#,
    )
    .unwrap();
    assert_eq!(
        t.to_string(),
        r#"Team(title="core", members=[Member(name="ada", coords=(1.5, 2.0))], tags={})"#
    );
}

#[test]
fn test_person_from_catalog() {
    let person = catalog().get("Person").unwrap();
    let p = Instance::new(&person, mapping! { "name" => "John", "surname" => "Doe", "age" => 42 })
        .unwrap();
    assert_eq!(p.to_string(), r#"Person(name="John", surname="Doe", age=42)"#);
    let from_yaml = Instance::from_text(
        &person,
        &standard_registry(),
        Format::Yaml,
        "name: John\nsurname: Doe\nage: 42\n",
    )
    .unwrap();
    assert_eq!(from_yaml, p);
}

#[test]
fn test_catalog_types_round_trip_every_format() {
    let catalog = catalog();
    let codecs = standard_registry();
    let container = catalog.get("Container").unwrap();
    let boxed = catalog.get("Box").unwrap();

    let c = Instance::from_mapping(
        &container,
        mapping! {
            "a" => Value::Map(mapping! { "x" => 1 }),
            "b" => Value::Map(mapping! { "y" => "z" }),
        },
    )
    .unwrap();
    let b = Instance::new(&boxed, mapping! { "items" => Value::set([1, 2, 3]) }).unwrap();

    for format in Format::ALL {
        let text = c.to_text(&codecs, format).unwrap();
        assert_eq!(Instance::from_text(&container, &codecs, format, &text).unwrap(), c);
        let text = b.to_text(&codecs, format).unwrap();
        assert_eq!(Instance::from_text(&boxed, &codecs, format, &text).unwrap(), b);
    }
}

#[test]
fn test_defaults_from_fixture() {
    let record = catalog().get("DefaultValue").unwrap();
    let d = Instance::new(&record, mapping! {}).unwrap();
    assert_eq!(
        d.to_string(),
        r#"DefaultValue(int_var=1, float_var=1.0, str_var="1", tuple_var=(1, 2, 3))"#
    );
    let overridden = Instance::new(&record, mapping! { "int_var" => 7 }).unwrap();
    assert_eq!(overridden.get("int_var"), Some(&Value::Int(7)));
}

#[test]
fn test_policies_from_fixture() {
    let catalog = catalog();

    let partial = catalog.get("PartialValue").unwrap();
    let p = Instance::new(&partial, mapping! { "list_var" => Value::list([1, 2, 3]) }).unwrap();
    assert_eq!(p.to_string(), "PartialValue(list_var=[1, 2, 3])");
    assert!(p.is_frozen());

    let mutable = catalog.get("Mutable").unwrap();
    let mut m = Instance::new(&mutable, mapping! { "int_var" => 1, "float_var" => 2.0 }).unwrap();
    m.set("int_var", 2).unwrap();
    assert_eq!(m.to_string(), "Mutable(int_var=2, float_var=2.0)");

    let loose = catalog.get("Loose").unwrap();
    let l = Instance::new(&loose, mapping! { "anything" => "not an int" }).unwrap();
    assert_eq!(l.get("anything"), Some(&Value::from("not an int")));

    let person = catalog.get("Person").unwrap();
    assert!(matches!(
        Instance::new(&person, mapping! { "name" => "John", "surname" => "Doe", "age" => "42" }),
        Err(ObjectError::TypeMismatch { .. })
    ));
}

#[test]
fn test_bad_paths() {
    let mut catalog = SchemaCatalog::new();
    assert!(matches!(
        catalog.load_path(fixture("records.toml")),
        Err(CatalogError::UnsupportedExtension { .. })
    ));
    assert!(matches!(
        catalog.load_path(fixture("missing.yaml")),
        Err(CatalogError::Io(_))
    ));
    assert!(catalog.is_empty());
}
