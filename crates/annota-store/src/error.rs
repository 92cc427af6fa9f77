//! Error types for annotated data files and datasets.

use thiserror::Error;

/// Result type alias using the store's error type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by data files, datasets and metadata backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Mutation attempted on an object opened in read mode
    #[error("Data object is open in read-only mode")]
    ReadOnly,

    /// Operation attempted after close
    #[error("Data object is closed")]
    Closed,

    /// Location rejected by the data object's validator
    #[error("Location is invalid")]
    InvalidLocation,

    /// Metadata type that cannot be attached as an annotation
    #[error("{0} cannot be used as an annotation")]
    NotAnnotatable(String),

    /// No annotation matched a removal request
    #[error("Annotation not found: {0}")]
    AnnotationNotFound(String),

    /// Value of the wrong metadata type handed to a typed setter
    #[error("Expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// File extension not handled
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    /// Data type change outside the allowed family
    #[error("Cannot change data type from {from} to {to}")]
    IncompatibleDataType { from: String, to: String },

    /// Data file missing
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Dataset path is not a folder
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Folder without dataset metadata opened in read mode
    #[error("Not a dataset: {0}")]
    NotADataset(String),

    /// Name not listed among a dataset's children
    #[error("{0} is not a child of this dataset")]
    NotAChild(String),

    /// Error from the metadata struct layer
    #[error("Metadata error: {0}")]
    Core(#[from] annota_core::Error),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sidecar (de)serialization failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
