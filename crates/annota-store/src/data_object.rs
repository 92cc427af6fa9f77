//! Behaviour shared by annotated data files and datasets.

use std::fmt;
use std::str::FromStr;

use annota_core::defaults::VERSION_KEY;
use annota_core::{
    Annotation, Annotations, Location, MetadataObject, MetadataType, Node, StructSchema,
    TypeSelector,
};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::annotation_set::AnnotationSet;
use crate::error::{Result, StoreError};

/// How a data object is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    #[default]
    Read,
    Write,
}

impl OpenMode {
    pub fn is_writable(&self) -> bool {
        matches!(self, OpenMode::Write)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
        })
    }
}

impl FromStr for OpenMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "r" => Ok(OpenMode::Read),
            "w" => Ok(OpenMode::Write),
            other => Err(format!("Invalid open mode: {}", other)),
        }
    }
}

/// An open object carrying annotations: a data file or a dataset.
///
/// Implementors give access to their annotation set and decide which
/// locations they accept; the annotation operations are provided.
pub trait DataObject {
    fn annotation_set(&self) -> &AnnotationSet;

    fn annotation_set_mut(&mut self) -> &mut AnnotationSet;

    fn is_read_only(&self) -> bool;

    fn is_closed(&self) -> bool;

    fn is_location_valid(&self, location: Option<&Location>) -> bool;

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        self.ensure_open()?;
        if self.is_read_only() {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    /// Copy of every annotation.
    fn annotations(&self) -> Result<Annotations> {
        self.ensure_open()?;
        Ok(self.annotation_set().snapshot())
    }

    fn annotators(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        Ok(self.annotation_set().annotators())
    }

    /// Annotations of one type by one annotator.
    fn get_annotations(
        &self,
        annotator: &str,
        metadata_type: impl TypeSelector,
    ) -> Result<Vec<Annotation>>
    where
        Self: Sized,
    {
        self.ensure_open()?;
        let metadata_type = metadata_type.resolve()?;
        Ok(self.annotation_set().get(annotator, metadata_type.name()))
    }

    fn add_annotation(
        &mut self,
        annotator: &str,
        object: MetadataObject,
        location: Option<Location>,
    ) -> Result<()> {
        self.ensure_writable()?;
        check_annotation(&*self, &object, location.as_ref())?;
        debug!(
            subsystem = "store",
            op = "add_annotation",
            annotator,
            metadata_type = object.type_name(),
            "Annotation added"
        );
        self.annotation_set_mut().add(annotator, object, location);
        Ok(())
    }

    /// Remove one annotation equal to `object`. See [`AnnotationSet::remove`]
    /// for how `location` selects the entry.
    fn remove_annotation(
        &mut self,
        annotator: &str,
        object: &MetadataObject,
        location: Option<&Location>,
    ) -> Result<()> {
        self.ensure_writable()?;
        self.annotation_set_mut().remove(annotator, object, location)?;
        debug!(
            subsystem = "store",
            op = "remove_annotation",
            annotator,
            metadata_type = object.type_name(),
            "Annotation removed"
        );
        Ok(())
    }

    /// Replace every annotation. Nothing changes unless all entries are valid.
    fn set_annotations(&mut self, annotations: Annotations) -> Result<()> {
        self.ensure_writable()?;
        for per_type in annotations.values() {
            for (type_name, bucket) in per_type {
                for annotation in bucket {
                    if annotation.object.type_name() != type_name {
                        return Err(StoreError::TypeMismatch {
                            expected: type_name.clone(),
                            got: annotation.object.type_name().to_string(),
                        });
                    }
                    check_annotation(&*self, &annotation.object, annotation.location.as_ref())?;
                }
            }
        }
        self.annotation_set_mut().replace(annotations);
        Ok(())
    }
}

fn check_annotation<D: DataObject + ?Sized>(
    data_object: &D,
    object: &MetadataObject,
    location: Option<&Location>,
) -> Result<()> {
    match MetadataType::of(object) {
        Some(metadata_type) if metadata_type.is_annotatable() => {}
        _ => return Err(StoreError::NotAnnotatable(object.type_name().to_string())),
    }
    if !data_object.is_location_valid(location) {
        return Err(StoreError::InvalidLocation);
    }
    Ok(())
}

/// Tree form of a struct, version stamped.
pub(crate) fn struct_to_node(object: &MetadataObject) -> Node {
    let mut data = object.to_dict();
    data.insert(
        VERSION_KEY.to_string(),
        JsonValue::String(object.version().to_string()),
    );
    Node::from_json(&JsonValue::Object(data)).unwrap_or_default()
}

/// Rebuild a struct of `schema` from its tree form, migrating older versions.
pub(crate) fn struct_from_node(schema: &'static StructSchema, node: &Node) -> Result<MetadataObject> {
    match node.to_json() {
        JsonValue::Object(data) => Ok(MetadataObject::from_dict(schema, &data)?),
        _ => Err(annota_core::Error::Codec(format!("{} entry is not a map", schema.name())).into()),
    }
}
