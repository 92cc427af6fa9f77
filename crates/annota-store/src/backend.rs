//! Metadata storage backends.
//!
//! A backend holds one namespace tree per namespace URI. Trees are stored
//! with prefixed keys (`annota:alice`) and handed back as stored; readers
//! strip prefixes themselves.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use annota_core::defaults::{
    ANNOTATION_NS, ANNOTATION_PREFIX, DATASET_NS, DATASET_PREFIX, SENSOR_NS, SENSOR_PREFIX,
};
use annota_core::Node;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// A metadata namespace: URI plus the prefix attached to its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub uri: &'static str,
    pub prefix: &'static str,
}

pub const ANNOTATIONS: Namespace = Namespace {
    uri: ANNOTATION_NS,
    prefix: ANNOTATION_PREFIX,
};

pub const SENSOR: Namespace = Namespace {
    uri: SENSOR_NS,
    prefix: SENSOR_PREFIX,
};

pub const DATASET: Namespace = Namespace {
    uri: DATASET_NS,
    prefix: DATASET_PREFIX,
};

type Namespaces = BTreeMap<String, Node>;

/// Storage for the namespace trees of one data object.
pub trait MetadataBackend: Send {
    /// Stored tree of a namespace, keys still prefixed.
    fn namespace(&self, ns: Namespace) -> Option<&Node>;

    /// Replace a namespace. Keys without a prefix receive `ns.prefix`.
    /// An empty tree removes the namespace.
    fn set_namespace(&mut self, ns: Namespace, tree: Node);

    fn remove_namespace(&mut self, ns: Namespace);

    /// Write pending changes. Fails with `ReadOnly` on a read backend.
    fn persist(&mut self) -> Result<()>;

    /// Drop pending changes and return to the last persisted state.
    fn reload(&mut self) -> Result<()>;

    fn is_writable(&self) -> bool;
}

fn put(namespaces: &mut Namespaces, ns: Namespace, tree: Node) {
    if tree.is_empty() {
        namespaces.remove(ns.uri);
    } else {
        namespaces.insert(ns.uri.to_string(), tree.with_prefix(ns.prefix));
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Backend kept entirely in memory. `persist` snapshots the current trees,
/// `reload` restores the snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    current: Namespaces,
    saved: Namespaces,
    writable: bool,
}

impl MemoryBackend {
    pub fn new(writable: bool) -> Self {
        Self {
            writable,
            ..Default::default()
        }
    }

    /// Backend starting from already persisted trees, keyed by namespace URI.
    pub fn with_saved(saved: BTreeMap<String, Node>, writable: bool) -> Self {
        Self {
            current: saved.clone(),
            saved,
            writable,
        }
    }

    /// Last persisted trees.
    pub fn saved(&self) -> &BTreeMap<String, Node> {
        &self.saved
    }
}

impl MetadataBackend for MemoryBackend {
    fn namespace(&self, ns: Namespace) -> Option<&Node> {
        self.current.get(ns.uri)
    }

    fn set_namespace(&mut self, ns: Namespace, tree: Node) {
        put(&mut self.current, ns, tree);
    }

    fn remove_namespace(&mut self, ns: Namespace) {
        self.current.remove(ns.uri);
    }

    fn persist(&mut self) -> Result<()> {
        if !self.writable {
            return Err(StoreError::ReadOnly);
        }
        self.saved = self.current.clone();
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.current = self.saved.clone();
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.writable
    }
}

// =============================================================================
// JSON SIDECAR
// =============================================================================

/// Backend storing all namespaces of a data object in one JSON sidecar
/// file: `{ "<namespace uri>": <tree>, ... }`.
#[derive(Debug)]
pub struct SidecarBackend {
    path: PathBuf,
    namespaces: Namespaces,
    writable: bool,
}

impl SidecarBackend {
    /// Open the sidecar at `path`. A missing file reads as empty; it is
    /// only created on the first `persist`.
    pub fn open(path: impl Into<PathBuf>, writable: bool) -> Result<Self> {
        let path = path.into();
        let namespaces = read_sidecar(&path)?;
        debug!(
            subsystem = "store",
            component = "sidecar",
            op = "open",
            file_path = %path.display(),
            writable,
            namespace_count = namespaces.len(),
            "Sidecar opened"
        );
        Ok(Self {
            path,
            namespaces,
            writable,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_sidecar(path: &Path) -> Result<Namespaces> {
    if !path.exists() {
        return Ok(Namespaces::new());
    }
    let bytes = fs::read(path).map_err(|e| {
        warn!(file_path = %path.display(), error = %e, "sidecar: read failed");
        e
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Namespaces::new());
    }
    Ok(serde_json::from_slice(&bytes)?)
}

impl MetadataBackend for SidecarBackend {
    fn namespace(&self, ns: Namespace) -> Option<&Node> {
        self.namespaces.get(ns.uri)
    }

    fn set_namespace(&mut self, ns: Namespace, tree: Node) {
        put(&mut self.namespaces, ns, tree);
    }

    fn remove_namespace(&mut self, ns: Namespace) {
        self.namespaces.remove(ns.uri);
    }

    fn persist(&mut self) -> Result<()> {
        if !self.writable {
            return Err(StoreError::ReadOnly);
        }
        let data = serde_json::to_vec_pretty(&self.namespaces)?;

        // Atomic write: temp file + rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &data).map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "sidecar: write failed");
            e
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            warn!(from = %temp_path.display(), to = %self.path.display(), error = %e, "sidecar: rename failed");
            e
        })?;

        debug!(
            subsystem = "store",
            component = "sidecar",
            op = "persist",
            file_path = %self.path.display(),
            size = data.len(),
            "Sidecar written"
        );
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.namespaces = read_sidecar(&self.path)?;
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.writable
    }
}
