//! Store configuration.
//!
//! Configurable via environment variables:
//! - `ANNOTA_SIDECAR_SUFFIX`: suffix appended to a data file name to find
//!   its metadata (default: ".xmp.json")
//! - `ANNOTA_DATASET_METADATA_FILE`: file marking a folder as a dataset
//!   (default: "metadata.xmp.json")

use std::env;
use std::path::{Path, PathBuf};

use annota_core::defaults::{DATASET_METADATA_FILE, SIDECAR_SUFFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub sidecar_suffix: String,
    pub dataset_metadata_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sidecar_suffix: SIDECAR_SUFFIX.to_string(),
            dataset_metadata_file: DATASET_METADATA_FILE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            sidecar_suffix: env_or("ANNOTA_SIDECAR_SUFFIX", SIDECAR_SUFFIX),
            dataset_metadata_file: env_or("ANNOTA_DATASET_METADATA_FILE", DATASET_METADATA_FILE),
        }
    }

    /// Metadata sidecar of a data file: `photo.png` -> `photo.png.xmp.json`.
    pub fn sidecar_path(&self, data_path: &Path) -> PathBuf {
        let mut name = data_path.as_os_str().to_owned();
        name.push(&self.sidecar_suffix);
        PathBuf::from(name)
    }

    /// Metadata file of a dataset folder.
    pub fn dataset_metadata_path(&self, folder: &Path) -> PathBuf {
        folder.join(&self.dataset_metadata_file)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| default.to_string())
}
