//! Summary of what a dataset holds: which data types are present, and how
//! completely each annotator covered each metadata type.

use std::collections::BTreeMap;
use std::fmt;

use annota_core::{MetadataType, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datatype::DataType;

const FILES_KEY: &str = "files_info";
const METADATA_KEY: &str = "metadata_info";

/// Whether an annotator labelled every occurrence of a metadata type in the
/// dataset. Only a person can assert `Total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationStatus {
    #[default]
    Partial,
    Total,
}

impl fmt::Display for AnnotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnnotationStatus::Partial => "PARTIAL",
            AnnotationStatus::Total => "TOTAL",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSetContent {
    statuses: BTreeMap<String, BTreeMap<MetadataType, AnnotationStatus>>,
    file_types: BTreeMap<DataType, usize>,
}

impl DataSetContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, annotator: &str, metadata_type: MetadataType) -> Option<AnnotationStatus> {
        self.statuses
            .get(annotator)
            .and_then(|per_type| per_type.get(&metadata_type))
            .copied()
    }

    pub fn set_status(&mut self, annotator: &str, metadata_type: MetadataType, status: AnnotationStatus) {
        self.statuses
            .entry(annotator.to_string())
            .or_default()
            .insert(metadata_type, status);
    }

    /// Annotators with at least one `Total` annotation type.
    pub fn annotators(&self) -> Vec<String> {
        self.statuses
            .iter()
            .filter(|(_, per_type)| per_type.values().any(|s| *s == AnnotationStatus::Total))
            .map(|(annotator, _)| annotator.clone())
            .collect()
    }

    /// Metadata types fully annotated by at least one annotator.
    pub fn annotation_types(&self) -> Vec<MetadataType> {
        let mut types: Vec<MetadataType> = self
            .statuses
            .values()
            .flat_map(|per_type| per_type.iter())
            .filter(|(_, status)| **status == AnnotationStatus::Total)
            .map(|(metadata_type, _)| *metadata_type)
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// `(annotator, type)` pairs not marked `Total`.
    pub fn partial_annotations(&self) -> Vec<(String, MetadataType)> {
        self.statuses
            .iter()
            .flat_map(|(annotator, per_type)| {
                per_type
                    .iter()
                    .filter(|(_, status)| **status == AnnotationStatus::Partial)
                    .map(move |(metadata_type, _)| (annotator.clone(), *metadata_type))
            })
            .collect()
    }

    pub fn file_types(&self) -> Vec<DataType> {
        self.file_types.keys().copied().collect()
    }

    pub fn file_count(&self, data_type: DataType) -> usize {
        self.file_types.get(&data_type).copied().unwrap_or(0)
    }

    pub(crate) fn add_file(&mut self, data_type: DataType) {
        *self.file_types.entry(data_type).or_insert(0) += 1;
    }

    /// Carry over every `Total` status of `previous`.
    pub(crate) fn keep_total_from(&mut self, previous: &DataSetContent) {
        for (annotator, per_type) in &previous.statuses {
            for (metadata_type, status) in per_type {
                if *status == AnnotationStatus::Total {
                    self.set_status(annotator, *metadata_type, AnnotationStatus::Total);
                }
            }
        }
    }

    pub fn to_node(&self) -> Node {
        let files = self
            .file_types
            .iter()
            .map(|(data_type, count)| (data_type.name().to_string(), Node::Text(count.to_string())))
            .collect();
        let metadata = self
            .statuses
            .iter()
            .map(|(annotator, per_type)| {
                let per_type = per_type
                    .iter()
                    .map(|(t, s)| (t.name().to_string(), Node::Text(s.to_string())))
                    .collect();
                (annotator.clone(), Node::Map(per_type))
            })
            .collect();
        Node::Map(BTreeMap::from([
            (FILES_KEY.to_string(), Node::Map(files)),
            (METADATA_KEY.to_string(), Node::Map(metadata)),
        ]))
    }

    /// Read back a stripped tree written by [`to_node`](Self::to_node).
    /// Unknown type names and unreadable counts are skipped; any status
    /// other than `TOTAL` reads as `Partial`.
    pub fn from_node(node: &Node) -> Self {
        let mut content = Self::new();
        if let Some(files) = node.get(FILES_KEY).and_then(Node::as_map) {
            for (name, count) in files {
                let data_type = name.parse::<DataType>().ok();
                let count = count.as_text().and_then(|c| c.parse::<usize>().ok());
                match (data_type, count) {
                    (Some(data_type), Some(count)) => {
                        content.file_types.insert(data_type, count);
                    }
                    _ => debug!(
                        subsystem = "store",
                        component = "dataset",
                        entry = %name,
                        "Skipping unreadable file type count"
                    ),
                }
            }
        }
        if let Some(metadata) = node.get(METADATA_KEY).and_then(Node::as_map) {
            for (annotator, per_type) in metadata {
                let Some(per_type) = per_type.as_map() else {
                    continue;
                };
                for (type_name, status) in per_type {
                    let Ok(metadata_type) = type_name.parse::<MetadataType>() else {
                        continue;
                    };
                    let status = match status.as_text() {
                        Some("TOTAL") => AnnotationStatus::Total,
                        _ => AnnotationStatus::Partial,
                    };
                    content.set_status(annotator, metadata_type, status);
                }
            }
        }
        content
    }
}
