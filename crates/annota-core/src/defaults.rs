//! Centralized default constants for annota.
//!
//! Namespace identifiers, reserved keys and file naming conventions shared by
//! the codec and the storage layer live here so the two never drift apart.

// =============================================================================
// NAMESPACES
// =============================================================================

/// URI of the namespace holding annotations.
pub const ANNOTATION_NS: &str = "http://annota.io/ns/annotations/1.0/";

/// Short prefix attached to keys written under [`ANNOTATION_NS`].
pub const ANNOTATION_PREFIX: &str = "annota";

/// URI of the namespace holding sensor metadata (data type, transform, timestamp).
pub const SENSOR_NS: &str = "http://annota.io/ns/sensor/1.0/";

/// Short prefix attached to keys written under [`SENSOR_NS`].
pub const SENSOR_PREFIX: &str = "sensor";

/// URI of the namespace holding dataset content and context.
pub const DATASET_NS: &str = "http://annota.io/ns/dataset/1.0/";

/// Short prefix attached to keys written under [`DATASET_NS`].
pub const DATASET_PREFIX: &str = "dataset";

/// Separator between a namespace prefix and the real key name.
pub const PREFIX_SEPARATOR: char = ':';

// =============================================================================
// SERIALIZED KEYS
// =============================================================================

/// Key stamped into every serialized struct by the codec.
pub const VERSION_KEY: &str = "version";

/// Key holding the serialized object inside an annotation entry.
pub const INFO_KEY: &str = "info";

/// Key holding the optional location inside an annotation entry.
pub const LOCATION_KEY: &str = "location";

// =============================================================================
// STORAGE
// =============================================================================

/// Suffix appended to a data file's name to locate its metadata sidecar.
pub const SIDECAR_SUFFIX: &str = ".xmp.json";

/// Name of the file marking a directory as a dataset.
pub const DATASET_METADATA_FILE: &str = "metadata.xmp.json";
