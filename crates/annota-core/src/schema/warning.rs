//! Warnings reported while migrating old serialized structs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal events raised by a migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MigrationWarning {
    /// An obsolete key was dropped; its value had no current counterpart.
    FieldRemoved { field: String },
    /// Raw entries of a field were converted into structured values.
    FieldConverted { field: String, count: usize },
    /// Data that may matter to the user was discarded.
    DataDiscarded { field: String, detail: String },
}

impl fmt::Display for MigrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationWarning::FieldRemoved { field } => write!(f, "removed field '{}'", field),
            MigrationWarning::FieldConverted { field, count } => {
                write!(f, "converted {} entries of '{}'", count, field)
            }
            MigrationWarning::DataDiscarded { field, detail } => {
                write!(f, "discarded '{}': {}", field, detail)
            }
        }
    }
}
