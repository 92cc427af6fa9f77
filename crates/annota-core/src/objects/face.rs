//! Faces and their historical facial parts.

use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{
    AttributeDescriptor, Bounds, Dict, DropFields, EnumChoices, MetadataKind, MetadataObject,
    MigrationResult, MigrationWarning, SchemaVersion, StructMigration, StructSchema, ValueType,
};
use crate::value::Value;

pub static GENDER: EnumChoices = EnumChoices::new("Gender", &[("female", 0), ("male", 1)]);

pub static FACIAL_PART_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("FacialPart", SchemaVersion::new(0, 1), "Landmark of a face")
        .attribute(AttributeDescriptor::vector(
            "coordinates",
            "Landmark position",
            ValueType::Integer(Bounds::unbounded()),
        ))
        .attribute(AttributeDescriptor::float("confidence", "Detection confidence").with_default(0.0))
        .build()
});

/// Marker for the `FacialPart` sub-struct (only found in old Face data).
pub struct FacialPart;

impl MetadataKind for FacialPart {
    fn schema() -> &'static StructSchema {
        &FACIAL_PART_SCHEMA
    }
}

pub static FACE_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    let float_vector = || ValueType::Float(Bounds::unbounded());
    StructSchema::builder("Face", SchemaVersion::new(0, 4), "Face appearing in the data")
        .attribute(AttributeDescriptor::string("name", "Person's name").with_default(""))
        .attribute(AttributeDescriptor::integer("age", "Person's age").with_default(0))
        .attribute_since(
            SchemaVersion::new(0, 2),
            AttributeDescriptor::enumeration("gender", "Person's gender", &GENDER).with_default("male"),
        )
        .deprecated(
            AttributeDescriptor::integer("id", "Face identifier"),
            None,
            SchemaVersion::new(0, 3),
        )
        .deprecated(
            AttributeDescriptor::vector("expression", "Expression scores", float_vector()),
            Some(SchemaVersion::new(0, 2)),
            SchemaVersion::new(0, 4),
        )
        .deprecated(
            AttributeDescriptor::vector(
                "facial_parts",
                "Facial landmarks",
                ValueType::Struct(FacialPart::schema),
            ),
            Some(SchemaVersion::new(0, 2)),
            SchemaVersion::new(0, 4),
        )
        .deprecated(
            AttributeDescriptor::vector("smile", "Smile scores", float_vector()),
            Some(SchemaVersion::new(0, 2)),
            SchemaVersion::new(0, 4),
        )
        .migration(DropFields {
            from: SchemaVersion::new(0, 1),
            to: SchemaVersion::new(0, 2),
            fields: &["id"],
            description: "Face identifiers are no longer stored",
        })
        .migration(StructureFacialParts)
        .migration(DiscardFaceAnalysis)
        .build()
});

/// Marker for the `Face` struct.
pub struct Face;

impl MetadataKind for Face {
    fn schema() -> &'static StructSchema {
        &FACE_SCHEMA
    }
}

impl Face {
    pub fn with(name: &str, age: i64, gender: &str) -> Result<MetadataObject> {
        Self::from_values(vec![name.into(), age.into(), gender.into()])
    }
}

/// 0.2 -> 0.3: drop the `fid` key and turn raw `[coordinates, confidence]`
/// pairs into `FacialPart` dicts.
struct StructureFacialParts;

impl StructMigration for StructureFacialParts {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(0, 2)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(0, 3)
    }

    fn description(&self) -> &str {
        "Facial parts become structured values"
    }

    fn migrate(&self, mut data: Dict) -> Result<MigrationResult> {
        let mut warnings = Vec::new();
        if data.remove("fid").is_some() {
            warnings.push(MigrationWarning::FieldRemoved {
                field: "fid".to_string(),
            });
        }

        if let Some(parts) = data.remove("facial_parts") {
            let entries = match parts {
                JsonValue::Array(entries) => entries,
                JsonValue::Null => Vec::new(),
                other => {
                    return Err(Error::Migration(format!(
                        "facial_parts must be a list, got {}",
                        other
                    )))
                }
            };
            let count = entries.len();
            let converted = entries
                .into_iter()
                .map(facial_part_from_raw)
                .collect::<Result<Vec<_>>>()?;
            data.insert("facial_parts".to_string(), JsonValue::Array(converted));
            if count > 0 {
                warnings.push(MigrationWarning::FieldConverted {
                    field: "facial_parts".to_string(),
                    count,
                });
            }
        }

        Ok(MigrationResult { data, warnings })
    }
}

fn facial_part_from_raw(entry: JsonValue) -> Result<JsonValue> {
    let part = match entry {
        JsonValue::Array(pair) if pair.len() == 2 => {
            let mut pair = pair.into_iter();
            let coordinates = pair.next().unwrap_or(JsonValue::Null);
            let confidence = pair.next().unwrap_or(JsonValue::Null);
            FacialPart::from_values(vec![Value::Raw(coordinates), Value::Raw(confidence)])
        }
        JsonValue::Object(map) => FacialPart::from_dict(&map),
        other => {
            return Err(Error::Migration(format!(
                "unrecognised facial part {}",
                other
            )))
        }
    }
    .map_err(|e| Error::Migration(format!("facial part: {}", e)))?;
    Ok(JsonValue::Object(part.to_dict()))
}

/// 0.3 -> 0.4: expression, facial parts and smile are no longer part of Face.
struct DiscardFaceAnalysis;

const DISCARDED_FIELDS: [&str; 3] = ["expression", "facial_parts", "smile"];

impl StructMigration for DiscardFaceAnalysis {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(0, 3)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(0, 4)
    }

    fn description(&self) -> &str {
        "Expression, facial parts and smile were removed from Face"
    }

    fn migrate(&self, mut data: Dict) -> Result<MigrationResult> {
        let warnings = DISCARDED_FIELDS
            .iter()
            .filter_map(|field| data.remove(*field).map(|value| (field, value)))
            .filter(|(_, value)| !is_empty_json(value))
            .map(|(field, _)| MigrationWarning::DataDiscarded {
                field: field.to_string(),
                detail: "no longer part of Face; keep the original file if this data matters"
                    .to_string(),
            })
            .collect();
        Ok(MigrationResult { data, warnings })
    }
}

fn is_empty_json(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    }
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::Face, Face::schema(), true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(value: JsonValue) -> Dict {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_default_face() {
        let f = Face::create();
        assert_eq!(f.get("gender").and_then(Value::as_enum).unwrap().name(), "male");
        assert_eq!(f.get("age"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_gender_must_be_known() {
        assert!(Face::with("a", 3, "robot").is_err());
        assert!(Face::with("a", 3, "female").is_ok());
    }

    #[test]
    fn test_face_0_1_drops_id() {
        let data = dict(json!({"name": "a", "age": 3, "id": 7, "version": "0.1"}));
        let f = Face::from_dict(&data).unwrap();
        assert_eq!(f, Face::with("a", 3, "male").unwrap());
    }

    #[test]
    fn test_face_0_2_full_history() {
        let data = dict(json!({
            "name": "gszwarc",
            "fid": 0,
            "age": 27,
            "expression": [0.14, 0.22],
            "facial_parts": [[[98, 53], 0.17]],
            "gender": "male",
            "smile": [0.39],
            "version": "0.2"
        }));
        let (f, warnings) = MetadataObject::from_dict_with_warnings(Face::schema(), &data).unwrap();
        assert_eq!(f, Face::with("gszwarc", 27, "male").unwrap());
        assert!(warnings.contains(&MigrationWarning::FieldConverted {
            field: "facial_parts".to_string(),
            count: 1
        }));
        let discarded = warnings
            .iter()
            .filter(|w| matches!(w, MigrationWarning::DataDiscarded { .. }))
            .count();
        assert_eq!(discarded, 3);
    }

    #[test]
    fn test_face_0_3_discards_analysis() {
        let data = dict(json!({"name": "a", "expression": [], "smile": [0.5], "version": "0.3"}));
        let (f, warnings) = MetadataObject::from_dict_with_warnings(Face::schema(), &data).unwrap();
        assert_eq!(f.get("name"), Some(&Value::from("a")));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_raw_facial_part_conversion() {
        let converted = facial_part_from_raw(json!([[98, 53], 0.17])).unwrap();
        assert_eq!(converted, json!({"coordinates": [98, 53], "confidence": 0.17}));

        let already = facial_part_from_raw(json!({"coordinates": [1, 2], "confidence": 1})).unwrap();
        assert_eq!(already, json!({"coordinates": [1, 2], "confidence": 1.0}));

        assert!(facial_part_from_raw(json!("nose")).is_err());
        assert!(facial_part_from_raw(json!([["x"], 0.1])).is_err());
    }
}
