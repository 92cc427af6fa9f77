//! Something said in the data.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{
    AttributeDescriptor, DropFields, MetadataKind, MetadataObject, SchemaVersion, StructSchema,
};

pub static SPEECH_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("Speech", SchemaVersion::new(0, 2), "Sentence pronounced by someone")
        .attribute(AttributeDescriptor::string("name", "Speaker's name").with_default(""))
        .attribute(AttributeDescriptor::string("sentence", "Pronounced sentence").with_default(""))
        .deprecated(
            AttributeDescriptor::integer("id", "Speaker's identifier"),
            None,
            SchemaVersion::new(0, 2),
        )
        .migration(DropFields {
            from: SchemaVersion::new(0, 1),
            to: SchemaVersion::new(0, 2),
            fields: &["id"],
            description: "Speaker identifiers are no longer stored",
        })
        .build()
});

/// Marker for the `Speech` struct.
pub struct Speech;

impl MetadataKind for Speech {
    fn schema() -> &'static StructSchema {
        &SPEECH_SCHEMA
    }
}

impl Speech {
    pub fn said(name: &str, sentence: &str) -> Result<MetadataObject> {
        Self::from_values(vec![name.into(), sentence.into()])
    }
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::Speech, Speech::schema(), true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_old_speech_drops_id() {
        let data = json!({"name": "Pepper", "sentence": "hello", "id": 3, "version": "0.1"});
        let s = Speech::from_dict(data.as_object().unwrap()).unwrap();
        assert_eq!(s, Speech::said("Pepper", "hello").unwrap());
    }

    #[test]
    fn test_unstamped_speech_constructs_directly() {
        let data = json!({"sentence": "hi"});
        let s = Speech::from_dict(data.as_object().unwrap()).unwrap();
        assert_eq!(s, Speech::said("", "hi").unwrap());
    }
}
