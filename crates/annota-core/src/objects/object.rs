//! A physical object appearing in the data.

use once_cell::sync::Lazy;

use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{AttributeDescriptor, MetadataKind, SchemaVersion, StructSchema};

pub static OBJECT_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("Object", SchemaVersion::new(0, 1), "Object appearing in the data")
        .attribute(AttributeDescriptor::string("type", "Object category").with_default(""))
        .attribute(AttributeDescriptor::string("value", "Object name or content").with_default(""))
        .attribute(AttributeDescriptor::integer("id", "Object identifier").with_default(0))
        .build()
});

/// Marker for the `Object` struct.
pub struct Object;

impl MetadataKind for Object {
    fn schema() -> &'static StructSchema {
        &OBJECT_SCHEMA
    }
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::Object, Object::schema(), true);
}
