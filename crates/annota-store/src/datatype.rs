//! Kinds of raw data a file can hold, and extension lookup.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

static IMAGE_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(png|jpe?g)$").unwrap());
static AUDIO_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.wav$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Audio,
    Image,
    #[serde(rename = "IMAGE_2D")]
    Image2D,
    #[serde(rename = "IMAGE_3D")]
    Image3D,
    ImageIr,
}

impl DataType {
    pub fn all() -> &'static [DataType] {
        &[
            DataType::Audio,
            DataType::Image,
            DataType::Image2D,
            DataType::Image3D,
            DataType::ImageIr,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Audio => "AUDIO",
            DataType::Image => "IMAGE",
            DataType::Image2D => "IMAGE_2D",
            DataType::Image3D => "IMAGE_3D",
            DataType::ImageIr => "IMAGE_IR",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, DataType::Audio)
    }

    /// Whether a file of this type may be re-typed as `other`.
    /// Image types only change into other image types.
    pub fn can_become(&self, other: DataType) -> bool {
        *self == other || (self.is_image() && other.is_image())
    }

    /// Data type implied by the file extension, if supported.
    pub fn for_path(path: &Path) -> Option<DataType> {
        let name = path.file_name()?.to_str()?;
        if IMAGE_FILE.is_match(name) {
            Some(DataType::Image)
        } else if AUDIO_FILE.is_match(name) {
            Some(DataType::Audio)
        } else {
            None
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| StoreError::UnsupportedDataType(s.to_string()))
    }
}

/// Whether `path` names a file this crate can open.
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    DataType::for_path(path.as_ref()).is_some()
}
