//! # annota-store
//!
//! Annotated data files and datasets for annota.
//!
//! This crate provides:
//! - Metadata backends (JSON sidecar, in-memory)
//! - `DataFile`: an image or audio file with annotations and sensor metadata
//! - `DataSet`: a folder of data files with a content summary and context
//!
//! ## Example
//!
//! ```rust,no_run
//! use annota_core::Person;
//! use annota_store::{DataFile, DataObject, OpenMode, StoreConfig};
//! use serde_json::json;
//!
//! # fn main() -> annota_store::Result<()> {
//! let config = StoreConfig::from_env();
//! let mut file = DataFile::open("photo.png", OpenMode::Write, &config)?;
//! file.add_annotation("alice", Person::named("Pepper")?, Some(json!([[0, 0], [64, 64]])))?;
//! file.close()?;
//! # Ok(())
//! # }
//! ```

pub mod annotation_set;
pub mod backend;
pub mod config;
pub mod content;
pub mod data_object;
pub mod dataset;
pub mod datatype;
pub mod error;
pub mod file;
pub mod location;

// Re-export commonly used types at crate root
pub use annotation_set::AnnotationSet;
pub use backend::{MemoryBackend, MetadataBackend, Namespace, SidecarBackend};
pub use config::StoreConfig;
pub use content::{AnnotationStatus, DataSetContent};
pub use data_object::{DataObject, OpenMode};
pub use dataset::{content_from_path, is_dataset, Child, DataSet};
pub use datatype::{is_supported, DataType};
pub use error::{Result, StoreError};
pub use file::DataFile;
