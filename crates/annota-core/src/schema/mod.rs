//! Versioned struct engine: attribute descriptors, schemas, instances and
//! forward migration of old serialized data.

pub mod attribute;
pub mod definition;
pub mod enums;
pub mod migration;
pub mod object;
pub mod version;
pub mod warning;


pub use attribute::{AttributeDescriptor, Bounds, SchemaRef, ValueType};
pub use definition::{DeprecatedAttribute, StructSchema, StructSchemaBuilder};
pub use enums::{EnumChoices, EnumMember, UNSPECIFIED};
pub use migration::{Dict, DropFields, MigrationResult, StructMigration};
pub use object::MetadataObject;
pub use version::SchemaVersion;
pub use warning::MigrationWarning;

use crate::error::Result;
use crate::value::Value;

/// A concrete struct type from the catalog.
///
/// Implemented by zero-sized marker types (`Person`, `Face`, ...) so callers
/// can write `Person::create()` or `Face::from_dict(&data)`.
pub trait MetadataKind {
    fn schema() -> &'static StructSchema;

    /// Default-constructed instance.
    fn create() -> MetadataObject {
        MetadataObject::new(Self::schema())
    }

    fn construct<K, I>(positional: Vec<Value>, keywords: I) -> Result<MetadataObject>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        MetadataObject::construct(Self::schema(), positional, keywords)
    }

    fn from_values(positional: Vec<Value>) -> Result<MetadataObject> {
        MetadataObject::from_values(Self::schema(), positional)
    }

    fn from_dict(data: &Dict) -> Result<MetadataObject> {
        MetadataObject::from_dict(Self::schema(), data)
    }

    fn is_instance(object: &MetadataObject) -> bool {
        object.type_name() == Self::schema().name()
    }
}
