//! # annota-core
//!
//! Versioned metadata structs and the annotation codec for annota.
//!
//! Metadata objects (people, faces, speech, recording context, ...) are
//! typed, range-checked records whose schemas carry a version. Serialized
//! dictionaries from older versions are migrated forward on load. The codec
//! maps the annotation namespace of a data item to and from the in-memory
//! `annotator -> type -> [(object, location)]` structure.

pub mod codec;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod objects;
pub mod registry;
pub mod schema;
pub mod tree;
pub mod value;

// Re-export commonly used types at crate root
pub use codec::{
    coerce_location, load_annotations, parse_scalar, parse_scalars_in_list, save_annotations,
    Annotation, Annotations, Location,
};
pub use error::{Error, Result};
pub use objects::{
    Context, EnvironmentalDescription, EnvironmentalLightConditions, EnvironmentalSoundConditions,
    Face, FacialPart, Object, Person, Property, RecordingDevice, Rotation, SpatialLocation, Speech,
    TimeLocation, TimeStamp, Transform, Translation,
};
pub use registry::{make_metadata_object, registry, MetadataType, TypeRegistry, TypeSelector};
pub use schema::{
    AttributeDescriptor, Dict, EnumChoices, EnumMember, MetadataKind, MetadataObject,
    MigrationWarning, SchemaVersion, StructSchema,
};
pub use tree::Node;
pub use value::Value;
