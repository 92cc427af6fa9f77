//! Free-form key/value property.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{AttributeDescriptor, MetadataKind, MetadataObject, SchemaVersion, StructSchema};
use crate::value::Value;

pub static PROPERTY_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("Property", SchemaVersion::new(0, 1), "Generic key/value property")
        .attribute(AttributeDescriptor::string("key", "Property name").with_default(Value::Null))
        .attribute(AttributeDescriptor::string("value", "Property value").with_default(""))
        .build()
});

/// Marker for the `Property` struct.
pub struct Property;

impl MetadataKind for Property {
    fn schema() -> &'static StructSchema {
        &PROPERTY_SCHEMA
    }
}

impl Property {
    pub fn pair(key: &str, value: &str) -> Result<MetadataObject> {
        Self::from_values(vec![key.into(), value.into()])
    }
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::Property, Property::schema(), true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_unset_by_default() {
        let p = Property::create();
        assert_eq!(p.get("key"), Some(&Value::Null));
        assert_eq!(p.get("value"), Some(&Value::from("")));
    }

    #[test]
    fn test_value_rendered_as_text() {
        let p = Property::construct(vec![], vec![("key", "fps".into()), ("value", 30.into())])
            .unwrap();
        assert_eq!(p, Property::pair("fps", "30").unwrap());
    }
}
