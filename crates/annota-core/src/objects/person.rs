//! A person appearing in the data.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{
    AttributeDescriptor, DropFields, MetadataKind, MetadataObject, SchemaVersion, StructSchema,
};

pub static PERSON_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder(
        "Person",
        SchemaVersion::new(0, 2),
        "Person appearing in the data",
    )
    .attribute(AttributeDescriptor::string("name", "Person's name").with_default(""))
    .deprecated(
        AttributeDescriptor::integer("id", "Person's identifier"),
        None,
        SchemaVersion::new(0, 2),
    )
    .migration(DropFields {
        from: SchemaVersion::new(0, 1),
        to: SchemaVersion::new(0, 2),
        fields: &["id"],
        description: "Person identifiers are no longer stored",
    })
    .build()
});

/// Marker for the `Person` struct.
pub struct Person;

impl MetadataKind for Person {
    fn schema() -> &'static StructSchema {
        &PERSON_SCHEMA
    }
}

impl Person {
    pub fn named(name: &str) -> Result<MetadataObject> {
        Self::from_values(vec![name.into()])
    }
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::Person, Person::schema(), true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_default_person() {
        let p = Person::create();
        assert_eq!(p.get("name"), Some(&Value::from("")));
        assert_eq!(p.version().to_string(), "0.2");
    }

    #[test]
    fn test_old_person_drops_id() {
        let data = json!({"name": "Pepper", "id": 10, "version": "0.1"});
        let p = Person::from_dict(data.as_object().unwrap()).unwrap();
        assert_eq!(p, Person::named("Pepper").unwrap());
    }

    #[test]
    fn test_current_person_rejects_id() {
        let data = json!({"name": "Pepper", "id": 10, "version": "0.2"});
        assert!(Person::from_dict(data.as_object().unwrap()).is_err());
    }
}
