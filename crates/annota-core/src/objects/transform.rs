//! Position and orientation of the sensor that produced a data item.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{AttributeDescriptor, MetadataKind, MetadataObject, SchemaVersion, StructSchema};
use crate::value::Value;

pub static TRANSLATION_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("Translation", SchemaVersion::new(0, 1), "Translation in meters")
        .attribute(AttributeDescriptor::float("x", "Translation along x").with_default(0.0))
        .attribute(AttributeDescriptor::float("y", "Translation along y").with_default(0.0))
        .attribute(AttributeDescriptor::float("z", "Translation along z").with_default(0.0))
        .build()
});

pub static ROTATION_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("Rotation", SchemaVersion::new(0, 1), "Rotation as a quaternion")
        .attribute(AttributeDescriptor::float("x", "Quaternion x").with_default(0.0))
        .attribute(AttributeDescriptor::float("y", "Quaternion y").with_default(0.0))
        .attribute(AttributeDescriptor::float("z", "Quaternion z").with_default(0.0))
        .attribute(AttributeDescriptor::float("w", "Quaternion w").with_default(1.0))
        .build()
});

pub static TRANSFORM_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("Transform", SchemaVersion::new(0, 1), "Rigid transform of the sensor")
        .attribute(AttributeDescriptor::structure("translation", "Translation part", Translation::schema))
        .attribute(AttributeDescriptor::structure("rotation", "Rotation part", Rotation::schema))
        .build()
});

/// Marker for the `Translation` sub-struct.
pub struct Translation;

impl MetadataKind for Translation {
    fn schema() -> &'static StructSchema {
        &TRANSLATION_SCHEMA
    }
}

/// Marker for the `Rotation` sub-struct.
pub struct Rotation;

impl MetadataKind for Rotation {
    fn schema() -> &'static StructSchema {
        &ROTATION_SCHEMA
    }
}

/// Marker for the `Transform` struct.
pub struct Transform;

impl MetadataKind for Transform {
    fn schema() -> &'static StructSchema {
        &TRANSFORM_SCHEMA
    }
}

impl Transform {
    /// Transform from a translation vector and an `(x, y, z, w)` quaternion.
    pub fn from_parts(translation: [f64; 3], rotation: [f64; 4]) -> Result<MetadataObject> {
        let translation =
            Translation::from_values(translation.iter().map(|c| Value::Float(*c)).collect())?;
        let rotation = Rotation::from_values(rotation.iter().map(|c| Value::Float(*c)).collect())?;
        Self::from_values(vec![translation.into(), rotation.into()])
    }
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::Transform, Transform::schema(), false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_by_default() {
        let t = Transform::create();
        assert_eq!(t, Transform::from_parts([0.0; 3], [0.0, 0.0, 0.0, 1.0]).unwrap());
        assert_eq!(
            serde_json::Value::Object(t.to_dict()),
            json!({
                "translation": {"x": 0.0, "y": 0.0, "z": 0.0},
                "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
            })
        );
    }

    #[test]
    fn test_nested_dict_decoding() {
        let data = json!({"translation": {"x": 1, "y": "2.5"}, "version": "0.1"});
        let t = Transform::from_dict(data.as_object().unwrap()).unwrap();
        let translation = t.get("translation").and_then(Value::as_struct).unwrap();
        assert_eq!(translation.get("x"), Some(&Value::Float(1.0)));
        assert_eq!(translation.get("y"), Some(&Value::Float(2.5)));
        assert_eq!(translation.get("z"), Some(&Value::Float(0.0)));
        assert_eq!(t.get("rotation"), Some(&Value::from(Rotation::create())));
    }
}
