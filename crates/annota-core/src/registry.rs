//! Closed set of metadata types and the factory building them.
//!
//! Each catalog module registers its type with an explicit call from
//! [`TypeRegistry::with_catalog`]; nothing is discovered at runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::objects;
use crate::schema::{Dict, MetadataObject, StructSchema};

/// Metadata types that can be stored on data items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MetadataType {
    Person,
    Face,
    Object,
    Speech,
    Context,
    TimeStamp,
    Transform,
    Property,
}

impl MetadataType {
    const ALL: [MetadataType; 8] = [
        MetadataType::Person,
        MetadataType::Face,
        MetadataType::Object,
        MetadataType::Speech,
        MetadataType::Context,
        MetadataType::TimeStamp,
        MetadataType::Transform,
        MetadataType::Property,
    ];

    /// Every member, in declaration order.
    pub fn all() -> &'static [MetadataType] {
        &Self::ALL
    }

    /// Struct name, e.g. "TimeStamp".
    pub fn name(&self) -> &'static str {
        match self {
            MetadataType::Person => "Person",
            MetadataType::Face => "Face",
            MetadataType::Object => "Object",
            MetadataType::Speech => "Speech",
            MetadataType::Context => "Context",
            MetadataType::TimeStamp => "TimeStamp",
            MetadataType::Transform => "Transform",
            MetadataType::Property => "Property",
        }
    }

    /// Upper-case member name, e.g. "TIMESTAMP".
    pub fn member_name(&self) -> &'static str {
        match self {
            MetadataType::Person => "PERSON",
            MetadataType::Face => "FACE",
            MetadataType::Object => "OBJECT",
            MetadataType::Speech => "SPEECH",
            MetadataType::Context => "CONTEXT",
            MetadataType::TimeStamp => "TIMESTAMP",
            MetadataType::Transform => "TRANSFORM",
            MetadataType::Property => "PROPERTY",
        }
    }

    /// Type of a catalog instance; `None` for nested-only structs.
    pub fn of(object: &MetadataObject) -> Option<MetadataType> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == object.type_name())
    }

    /// Schema registered for this type.
    pub fn schema(&self) -> Result<&'static StructSchema> {
        registry().get(*self).map(|entry| entry.schema)
    }

    /// Whether instances may be attached as annotations. Context, TimeStamp
    /// and Transform describe the data item itself.
    pub fn is_annotatable(&self) -> bool {
        registry()
            .get(*self)
            .map(|entry| entry.annotatable)
            .unwrap_or(false)
    }
}

impl fmt::Display for MetadataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetadataType {
    type Err = Error;

    /// Accepts the struct name ("TimeStamp") or the member name ("TIMESTAMP").
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s || t.member_name() == s)
            .ok_or_else(|| Error::UnknownMetadataType(s.to_string()))
    }
}

/// One registered type.
#[derive(Debug, Clone, Copy)]
pub struct RegisteredType {
    pub metadata_type: MetadataType,
    pub schema: &'static StructSchema,
    pub annotatable: bool,
}

/// Mapping from metadata type to its schema.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: BTreeMap<MetadataType, RegisteredType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the whole built-in catalog.
    pub fn with_catalog() -> Self {
        let mut registry = Self::new();
        objects::person::register(&mut registry);
        objects::face::register(&mut registry);
        objects::object::register(&mut registry);
        objects::speech::register(&mut registry);
        objects::context::register(&mut registry);
        objects::timestamp::register(&mut registry);
        objects::transform::register(&mut registry);
        objects::property::register(&mut registry);
        debug!(
            subsystem = "schema",
            component = "registry",
            entry_count = registry.entries.len(),
            "Metadata types registered"
        );
        registry
    }

    pub fn register(
        &mut self,
        metadata_type: MetadataType,
        schema: &'static StructSchema,
        annotatable: bool,
    ) {
        self.entries.insert(
            metadata_type,
            RegisteredType {
                metadata_type,
                schema,
                annotatable,
            },
        );
    }

    pub fn get(&self, metadata_type: MetadataType) -> Result<&RegisteredType> {
        self.entries
            .get(&metadata_type)
            .ok_or_else(|| Error::UnknownMetadataType(metadata_type.to_string()))
    }

    /// Registered entries, in [`MetadataType`] order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredType> {
        self.entries.values()
    }

    /// Build an instance: defaults when `data` is `None`, otherwise through
    /// `from_dict` (so old versions are migrated).
    pub fn make(&self, selector: impl TypeSelector, data: Option<&Dict>) -> Result<MetadataObject> {
        let entry = self.get(selector.resolve()?)?;
        match data {
            None => Ok(MetadataObject::new(entry.schema)),
            Some(data) => MetadataObject::from_dict(entry.schema, data),
        }
    }
}

static REGISTRY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::with_catalog);

/// Process-wide registry holding the built-in catalog.
pub fn registry() -> &'static TypeRegistry {
    &REGISTRY
}

/// Anything naming a metadata type.
pub trait TypeSelector {
    fn resolve(&self) -> Result<MetadataType>;
}

impl TypeSelector for MetadataType {
    fn resolve(&self) -> Result<MetadataType> {
        Ok(*self)
    }
}

impl TypeSelector for &str {
    fn resolve(&self) -> Result<MetadataType> {
        self.parse()
    }
}

impl TypeSelector for String {
    fn resolve(&self) -> Result<MetadataType> {
        self.parse()
    }
}

impl TypeSelector for &String {
    fn resolve(&self) -> Result<MetadataType> {
        self.parse()
    }
}

/// Build a metadata object of the selected type, optionally from a
/// serialized dictionary.
///
/// ```
/// use annota_core::{make_metadata_object, MetadataType};
///
/// let by_name = make_metadata_object("Person", None).unwrap();
/// let by_member = make_metadata_object(MetadataType::Person, None).unwrap();
/// assert_eq!(by_name, by_member);
/// assert!(make_metadata_object("NotAType", None).is_err());
/// ```
pub fn make_metadata_object(selector: impl TypeSelector, data: Option<&Dict>) -> Result<MetadataObject> {
    registry().make(selector, data)
}
