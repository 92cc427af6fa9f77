//! A single annotated data file (image or audio) with its metadata sidecar.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use annota_core::{
    load_annotations, save_annotations, Location, MetadataKind, MetadataObject, Node, TimeStamp,
    Transform,
};
use tracing::{debug, warn};

use crate::annotation_set::AnnotationSet;
use crate::backend::{MetadataBackend, SidecarBackend, ANNOTATIONS, SENSOR};
use crate::config::StoreConfig;
use crate::data_object::{struct_from_node, struct_to_node, DataObject, OpenMode};
use crate::datatype::DataType;
use crate::error::{Result, StoreError};
use crate::location::validator_for;

const DATA_TYPE_KEY: &str = "data_type";
const TRANSFORM_KEY: &str = "transform";
const TIMESTAMP_KEY: &str = "timestamp";

/// An open data file.
///
/// Metadata is read once on open and kept in memory. In write mode it is
/// written back on [`close`](DataFile::close), or on drop if never closed.
pub struct DataFile {
    path: PathBuf,
    mode: OpenMode,
    backend: Box<dyn MetadataBackend>,
    annotations: AnnotationSet,
    data_type: DataType,
    transform: MetadataObject,
    timestamp: MetadataObject,
    closed: bool,
}

impl std::fmt::Debug for DataFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFile")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("data_type", &self.data_type)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl DataFile {
    /// Open an existing file; its metadata lives in the sidecar named by
    /// `config`.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::NotAFile(path.display().to_string()));
        }
        let backend = SidecarBackend::open(config.sidecar_path(path), mode.is_writable())?;
        Self::with_backend(path, mode, Box::new(backend))
    }

    /// Open `path` with metadata held by `backend`. The file itself is not
    /// touched, only its extension is used.
    pub fn with_backend(
        path: impl Into<PathBuf>,
        mode: OpenMode,
        backend: Box<dyn MetadataBackend>,
    ) -> Result<Self> {
        let path = path.into();
        let data_type = DataType::for_path(&path)
            .ok_or_else(|| StoreError::UnsupportedDataType(path.display().to_string()))?;
        let mut file = Self {
            path,
            mode,
            backend,
            annotations: AnnotationSet::new(),
            data_type,
            transform: Transform::create(),
            timestamp: TimeStamp::create(),
            closed: false,
        };
        file.load_metadata()?;
        debug!(
            subsystem = "store",
            component = "file",
            op = "open",
            file_path = %file.path.display(),
            mode = %mode,
            entry_count = file.annotations.len(),
            "Data file opened"
        );
        Ok(file)
    }

    fn load_metadata(&mut self) -> Result<()> {
        let annotations = load_annotations(self.backend.namespace(ANNOTATIONS))?;

        let sensor = self
            .backend
            .namespace(SENSOR)
            .map(|tree| tree.clone().strip_prefixes())
            .unwrap_or_default();
        let data_type = match sensor.get(DATA_TYPE_KEY).and_then(Node::as_text) {
            Some(name) => name.parse::<DataType>()?,
            None => DataType::for_path(&self.path)
                .ok_or_else(|| StoreError::UnsupportedDataType(self.path.display().to_string()))?,
        };
        let transform = match sensor.get(TRANSFORM_KEY) {
            Some(node) => struct_from_node(Transform::schema(), node)?,
            None => Transform::create(),
        };
        let timestamp = match sensor.get(TIMESTAMP_KEY) {
            Some(node) => struct_from_node(TimeStamp::schema(), node)?,
            None => TimeStamp::create(),
        };

        self.annotations = AnnotationSet::from_annotations(annotations);
        self.data_type = data_type;
        self.transform = transform;
        self.timestamp = timestamp;
        Ok(())
    }

    fn save_metadata(&mut self) {
        let mut annotations = Node::empty_map();
        save_annotations(&mut annotations, self.annotations.as_annotations());
        self.backend.set_namespace(ANNOTATIONS, annotations);

        let sensor = BTreeMap::from([
            (DATA_TYPE_KEY.to_string(), Node::Text(self.data_type.name().to_string())),
            (TRANSFORM_KEY.to_string(), struct_to_node(&self.transform)),
            (TIMESTAMP_KEY.to_string(), struct_to_node(&self.timestamp)),
        ]);
        self.backend.set_namespace(SENSOR, Node::Map(sensor));
    }

    /// Write metadata back (write mode only) and release the file.
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.mode.is_writable() {
            self.save_metadata();
            self.backend.persist()?;
        }
        self.closed = true;
        debug!(
            subsystem = "store",
            component = "file",
            op = "close",
            file_path = %self.path.display(),
            "Data file closed"
        );
        Ok(())
    }

    /// Discard unsaved changes and read the stored metadata again.
    pub fn reload_metadata(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.backend.reload()?;
        self.load_metadata()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Re-type the file, within the image family only.
    pub fn set_data_type(&mut self, data_type: DataType) -> Result<()> {
        self.ensure_writable()?;
        if !self.data_type.can_become(data_type) {
            return Err(StoreError::IncompatibleDataType {
                from: self.data_type.to_string(),
                to: data_type.to_string(),
            });
        }
        self.data_type = data_type;
        Ok(())
    }

    /// Sensor pose; identity when never set.
    pub fn transform(&self) -> Result<MetadataObject> {
        self.ensure_open()?;
        Ok(self.transform.clone())
    }

    pub fn set_transform(&mut self, transform: MetadataObject) -> Result<()> {
        self.ensure_writable()?;
        expect_kind::<Transform>(&transform)?;
        self.transform = transform;
        Ok(())
    }

    /// Acquisition time; the epoch when never set.
    pub fn timestamp(&self) -> Result<MetadataObject> {
        self.ensure_open()?;
        Ok(self.timestamp.clone())
    }

    pub fn set_timestamp(&mut self, timestamp: MetadataObject) -> Result<()> {
        self.ensure_writable()?;
        expect_kind::<TimeStamp>(&timestamp)?;
        self.timestamp = timestamp;
        Ok(())
    }
}

pub(crate) fn expect_kind<K: MetadataKind>(object: &MetadataObject) -> Result<()> {
    if K::is_instance(object) {
        Ok(())
    } else {
        Err(StoreError::TypeMismatch {
            expected: K::schema().name().to_string(),
            got: object.type_name().to_string(),
        })
    }
}

impl DataObject for DataFile {
    fn annotation_set(&self) -> &AnnotationSet {
        &self.annotations
    }

    fn annotation_set_mut(&mut self) -> &mut AnnotationSet {
        &mut self.annotations
    }

    fn is_read_only(&self) -> bool {
        !self.mode.is_writable()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn is_location_valid(&self, location: Option<&Location>) -> bool {
        validator_for(self.data_type)(location)
    }
}

impl Drop for DataFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(
                subsystem = "store",
                component = "file",
                file_path = %self.path.display(),
                error = %e,
                "Failed to close data file"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use annota_core::Person;
    use serde_json::json;

    fn memory_file(mode: OpenMode) -> DataFile {
        DataFile::with_backend("photo.png", mode, Box::new(MemoryBackend::new(mode.is_writable())))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let file = memory_file(OpenMode::Read);
        assert_eq!(file.data_type(), DataType::Image);
        assert_eq!(file.transform().unwrap(), Transform::create());
        assert_eq!(file.timestamp().unwrap(), TimeStamp::at(0, 0).unwrap());
        assert!(file.annotations().unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = DataFile::with_backend("notes.txt", OpenMode::Read, Box::new(MemoryBackend::new(false)))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedDataType(_)));
    }

    #[test]
    fn test_image_location_checked() {
        let mut file = memory_file(OpenMode::Write);
        let pepper = Person::named("Pepper").unwrap();
        file.add_annotation("alice", pepper.clone(), Some(json!([[0, 0], [10, 10]])))
            .unwrap();
        let err = file
            .add_annotation("alice", pepper, Some(json!([0, 10])))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidLocation));
        assert_eq!(err.to_string(), "Location is invalid");
    }

    #[test]
    fn test_sensor_structs_not_annotatable() {
        let mut file = memory_file(OpenMode::Write);
        let err = file
            .add_annotation("alice", TimeStamp::at(1, 0).unwrap(), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAnnotatable(name) if name == "TimeStamp"));
    }

    #[test]
    fn test_typed_setters() {
        let mut file = memory_file(OpenMode::Write);
        let err = file.set_transform(Person::named("Pepper").unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
        file.set_timestamp(TimeStamp::at(1_600_000_000, 5).unwrap()).unwrap();
        assert_eq!(file.timestamp().unwrap(), TimeStamp::at(1_600_000_000, 5).unwrap());
    }

    #[test]
    fn test_set_data_type() {
        let mut file = memory_file(OpenMode::Write);
        file.set_data_type(DataType::ImageIr).unwrap();
        assert_eq!(file.data_type(), DataType::ImageIr);
        let err = file.set_data_type(DataType::Audio).unwrap_err();
        assert!(matches!(err, StoreError::IncompatibleDataType { .. }));
    }

    #[test]
    fn test_read_only_rejects_setters() {
        let mut file = memory_file(OpenMode::Read);
        assert!(matches!(
            file.set_timestamp(TimeStamp::at(1, 0).unwrap()),
            Err(StoreError::ReadOnly)
        ));
        assert!(matches!(
            file.set_data_type(DataType::Image2D),
            Err(StoreError::ReadOnly)
        ));
    }

    #[test]
    fn test_closed_rejects_reads() {
        let mut file = memory_file(OpenMode::Read);
        file.close().unwrap();
        file.close().unwrap();
        assert!(file.is_closed());
        assert!(matches!(file.annotations(), Err(StoreError::Closed)));
        assert!(matches!(file.transform(), Err(StoreError::Closed)));
    }
}
