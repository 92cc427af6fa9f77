//! Datasets: folders of data files (and nested datasets) marked by a
//! dataset metadata file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use annota_core::{
    load_annotations, save_annotations, Context, Location, MetadataKind, MetadataObject,
    MetadataType, Node,
};
use tracing::{debug, warn};

use crate::annotation_set::AnnotationSet;
use crate::backend::{MetadataBackend, SidecarBackend, ANNOTATIONS, DATASET};
use crate::config::StoreConfig;
use crate::content::{AnnotationStatus, DataSetContent};
use crate::data_object::{struct_from_node, struct_to_node, DataObject, OpenMode};
use crate::datatype::is_supported;
use crate::error::{Result, StoreError};
use crate::file::{expect_kind, DataFile};
use crate::location::whole_item_location;

const CONTENT_KEY: &str = "content";
const CONTEXT_KEY: &str = "context";

/// Whether `path` is a folder holding a dataset metadata file.
pub fn is_dataset(path: impl AsRef<Path>, config: &StoreConfig) -> bool {
    let path = path.as_ref();
    path.is_dir() && config.dataset_metadata_path(path).is_file()
}

/// Content summary of the dataset at `path`, read without keeping it open.
pub fn content_from_path(path: impl AsRef<Path>, config: &StoreConfig) -> Result<DataSetContent> {
    let dataset = DataSet::open(path, OpenMode::Read, config)?;
    Ok(dataset.content().clone())
}

/// A child opened through [`DataSet::open_child`].
#[derive(Debug)]
pub enum Child {
    File(DataFile),
    DataSet(DataSet),
}

/// An open dataset.
///
/// Annotations on a dataset apply to the dataset as a whole, so only
/// `None` locations are accepted.
pub struct DataSet {
    path: PathBuf,
    mode: OpenMode,
    config: StoreConfig,
    backend: Box<dyn MetadataBackend>,
    annotations: AnnotationSet,
    content: DataSetContent,
    context: MetadataObject,
    closed: bool,
}

impl std::fmt::Debug for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl DataSet {
    /// Open the dataset in folder `path`.
    ///
    /// Read mode requires an existing dataset. Write mode turns any folder
    /// into one by creating its metadata file; existing metadata is kept.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(StoreError::NotADirectory(path.display().to_string()));
        }
        let metadata_path = config.dataset_metadata_path(path);
        let exists = metadata_path.is_file();
        if !exists && !mode.is_writable() {
            return Err(StoreError::NotADataset(path.display().to_string()));
        }

        let mut backend = SidecarBackend::open(metadata_path, mode.is_writable())?;
        if !exists {
            backend.persist()?;
            debug!(
                subsystem = "store",
                component = "dataset",
                op = "create",
                file_path = %path.display(),
                "Dataset created"
            );
        }

        let mut dataset = Self {
            path: path.to_path_buf(),
            mode,
            config: config.clone(),
            backend: Box::new(backend),
            annotations: AnnotationSet::new(),
            content: DataSetContent::new(),
            context: Context::create(),
            closed: false,
        };
        dataset.load_metadata()?;
        Ok(dataset)
    }

    fn load_metadata(&mut self) -> Result<()> {
        let annotations = load_annotations(self.backend.namespace(ANNOTATIONS))?;
        let tree = self
            .backend
            .namespace(DATASET)
            .map(|tree| tree.clone().strip_prefixes())
            .unwrap_or_default();
        self.context = match tree.get(CONTEXT_KEY) {
            Some(node) => struct_from_node(Context::schema(), node)?,
            None => Context::create(),
        };
        self.annotations = AnnotationSet::from_annotations(annotations);
        match tree.get(CONTENT_KEY) {
            Some(node) => self.content = DataSetContent::from_node(node),
            None => {
                self.content = DataSetContent::new();
                self.examine_content()?;
            }
        }
        Ok(())
    }

    fn save_metadata(&mut self) {
        let mut annotations = Node::empty_map();
        save_annotations(&mut annotations, self.annotations.as_annotations());
        self.backend.set_namespace(ANNOTATIONS, annotations);

        let tree = BTreeMap::from([
            (CONTENT_KEY.to_string(), self.content.to_node()),
            (CONTEXT_KEY.to_string(), struct_to_node(&self.context)),
        ]);
        self.backend.set_namespace(DATASET, Node::Map(tree));
    }

    /// Write metadata back (write mode only) and release the dataset.
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
            component = "dataset",
            op = "close",
            file_path = %self.path.display(),
            "Dataset closed"
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

    /// Names of supported files and sub-datasets in the folder, sorted.
    pub fn children(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let path = entry.path();
            let is_child = if path.is_dir() {
                is_dataset(&path, &self.config)
            } else {
                is_supported(&path)
            };
            if is_child {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Open a child listed by [`children`](Self::children).
    pub fn open_child(&self, name: &str, mode: OpenMode) -> Result<Child> {
        if !self.children()?.iter().any(|child| child == name) {
            return Err(StoreError::NotAChild(name.to_string()));
        }
        let path = self.path.join(name);
        if path.is_dir() {
            Ok(Child::DataSet(DataSet::open(path, mode, &self.config)?))
        } else {
            Ok(Child::File(DataFile::open(path, mode, &self.config)?))
        }
    }

    pub fn content(&self) -> &DataSetContent {
        &self.content
    }

    /// Rebuild the content summary from the child files.
    ///
    /// Every annotation found is listed as `Partial`; `Total` statuses set
    /// before are kept.
    pub fn examine_content(&mut self) -> Result<()> {
        self.ensure_open()?;
        let mut content = DataSetContent::new();
        for name in self.children()? {
            let path = self.path.join(&name);
            if path.is_dir() {
                continue;
            }
            let file = DataFile::open(&path, OpenMode::Read, &self.config)?;
            content.add_file(file.data_type());
            for (annotator, per_type) in file.annotation_set().as_annotations() {
                for type_name in per_type.keys() {
                    match type_name.parse::<MetadataType>() {
                        Ok(metadata_type) => {
                            content.set_status(annotator, metadata_type, AnnotationStatus::Partial)
                        }
                        Err(e) => warn!(
                            subsystem = "store",
                            component = "dataset",
                            file_path = %path.display(),
                            error = %e,
                            "Skipping annotations of unknown type"
                        ),
                    }
                }
            }
        }
        content.keep_total_from(&self.content);
        self.content = content;
        debug!(
            subsystem = "store",
            component = "dataset",
            op = "examine_content",
            file_path = %self.path.display(),
            "Dataset content examined"
        );
        Ok(())
    }

    /// Record how completely `annotator` covered `metadata_type`.
    pub fn set_annotation_status(
        &mut self,
        annotator: &str,
        metadata_type: MetadataType,
        status: AnnotationStatus,
    ) -> Result<()> {
        self.ensure_writable()?;
        self.content.set_status(annotator, metadata_type, status);
        Ok(())
    }

    /// Recording context shared by the whole dataset.
    pub fn context(&self) -> Result<MetadataObject> {
        self.ensure_open()?;
        Ok(self.context.clone())
    }

    pub fn set_context(&mut self, context: MetadataObject) -> Result<()> {
        self.ensure_writable()?;
        expect_kind::<Context>(&context)?;
        self.context = context;
        Ok(())
    }
}

impl DataObject for DataSet {
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
        whole_item_location(location)
    }
}

impl Drop for DataSet {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(
                subsystem = "store",
                component = "dataset",
                file_path = %self.path.display(),
                error = %e,
                "Failed to close dataset"
            );
        }
    }
}
