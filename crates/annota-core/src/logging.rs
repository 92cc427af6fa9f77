//! Structured logging field names for annota.
//!
//! Both crates emit `tracing` events with these field names and never install
//! a subscriber themselves; that is left to the embedding application.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Data discarded by a migration, malformed annotation bucket skipped |
//! | DEBUG | Load/save summaries, migration steps, backend reads and writes |
//! | TRACE | Per-annotation iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "schema", "codec", "store"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "migration", "registry", "sidecar", "dataset"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "from_dict", "load", "save", "persist"
pub const OPERATION: &str = "op";

// ─── Schema fields ─────────────────────────────────────────────────────────

/// Name of the struct type being built or migrated.
pub const STRUCT_NAME: &str = "struct_name";

/// Version stamped in incoming data.
pub const FROM_VERSION: &str = "from_version";

/// Current schema version the data is migrated to.
pub const TO_VERSION: &str = "to_version";

/// Attribute name involved in a validation or migration event.
pub const ATTRIBUTE: &str = "attribute";

// ─── Annotation fields ─────────────────────────────────────────────────────

/// Annotator identifier.
pub const ANNOTATOR: &str = "annotator";

/// Metadata type name (e.g. "Person").
pub const METADATA_TYPE: &str = "metadata_type";

/// Number of entries handled by a bulk operation.
pub const ENTRY_COUNT: &str = "entry_count";

// ─── Storage fields ────────────────────────────────────────────────────────

/// Filesystem path of a data file, sidecar or dataset.
pub const FILE_PATH: &str = "file_path";

/// Namespace URI touched by a backend operation.
pub const NAMESPACE: &str = "namespace";
