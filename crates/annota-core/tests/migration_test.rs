//! Integration tests for loading serialized structs written by older schema
//! versions.

use annota_core::{
    make_metadata_object, Face, MetadataKind, MetadataObject, MigrationWarning, Person, Speech,
    Value,
};
use serde_json::json;

#[test]
fn test_person_0_1_drops_id() {
    let data = json!({"name": "Pepper", "id": 10, "version": "0.1"});
    let migrated = Person::from_dict(data.as_object().unwrap()).unwrap();
    assert_eq!(migrated, Person::named("Pepper").unwrap());
}

#[test]
fn test_face_0_2_keeps_only_current_fields() {
    let data = json!({
        "name": "gszwarc",
        "fid": 0,
        "age": 27,
        "expression": [0.14, 0.22],
        "facial_parts": [[[98, 53], 0.17]],
        "gender": "male",
        "smile": [0.39],
        "version": "0.2"
    });
    let migrated = make_metadata_object("Face", data.as_object()).unwrap();
    assert_eq!(migrated, Face::with("gszwarc", 27, "male").unwrap());
    assert_eq!(
        migrated.fields().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["name", "age", "gender"]
    );
}

#[test]
fn test_face_0_2_reports_lost_analysis() {
    let data = json!({
        "name": "x",
        "facial_parts": [[[1, 2], 0.5], [[3, 4], 0.25]],
        "version": "0.2"
    });
    let (_, warnings) =
        MetadataObject::from_dict_with_warnings(Face::schema(), data.as_object().unwrap()).unwrap();
    assert_eq!(
        warnings,
        vec![
            MigrationWarning::FieldConverted {
                field: "facial_parts".to_string(),
                count: 2
            },
            MigrationWarning::DataDiscarded {
                field: "facial_parts".to_string(),
                detail: "no longer part of Face; keep the original file if this data matters"
                    .to_string()
            },
        ]
    );
}

#[test]
fn test_face_0_2_rejects_malformed_facial_parts() {
    let data = json!({"name": "x", "facial_parts": [[["a"], 0.5]], "version": "0.2"});
    assert!(Face::from_dict(data.as_object().unwrap()).is_err());
}

#[test]
fn test_face_0_1_gets_default_gender() {
    let data = json!({"name": "x", "age": 40, "id": 1, "version": "0.1"});
    let migrated = Face::from_dict(data.as_object().unwrap()).unwrap();
    assert_eq!(
        migrated.get("gender").and_then(Value::as_enum).map(|m| m.name()),
        Some("male")
    );
}

#[test]
fn test_speech_0_1_drops_id() {
    let data = json!({"name": "Nao", "sentence": "hi", "id": 2, "version": "0.1"});
    assert_eq!(
        Speech::from_dict(data.as_object().unwrap()).unwrap(),
        Speech::said("Nao", "hi").unwrap()
    );
}

#[test]
fn test_newer_version_is_read_as_current() {
    let data = json!({"name": "Pepper", "version": "9.0"});
    assert_eq!(
        Person::from_dict(data.as_object().unwrap()).unwrap(),
        Person::named("Pepper").unwrap()
    );

    let data = json!({"name": "Pepper", "mood": "happy", "version": "9.0"});
    assert!(Person::from_dict(data.as_object().unwrap()).is_err());
}

#[test]
fn test_failed_migration_leaves_nothing_behind() {
    // The whole key set is computed before construction, so a failure is a
    // plain error with no partially built object.
    let data = json!({"name": "Pepper", "id": 10, "mood": "happy", "version": "0.1"});
    assert!(Person::from_dict(data.as_object().unwrap()).is_err());
}
