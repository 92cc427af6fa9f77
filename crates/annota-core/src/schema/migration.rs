//! Forward migration of serialized structs stamped with an older version.
//!
//! Every schema carries an ordered list of [`StructMigration`] steps. Data
//! stamped `v` runs each step whose `from_version >= v`, then any remaining
//! key naming a deprecated attribute removed after `v` is stripped. The full
//! key set is computed here before any constructor runs.

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use super::definition::StructSchema;
use super::version::SchemaVersion;
use super::warning::MigrationWarning;
use crate::error::Result;

/// Serialized struct body (attribute name to JSON value).
pub type Dict = Map<String, JsonValue>;

/// Result of a successful migration.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationResult {
    pub data: Dict,
    pub warnings: Vec<MigrationWarning>,
}

/// One step of a struct's version history.
#[allow(clippy::wrong_self_convention)]
pub trait StructMigration: Send + Sync {
    /// Version of the data this step expects.
    fn from_version(&self) -> SchemaVersion;

    /// Version of the data this step produces.
    fn to_version(&self) -> SchemaVersion;

    /// Human-readable description of the step.
    fn description(&self) -> &str;

    /// Transform the data.
    fn migrate(&self, data: Dict) -> Result<MigrationResult>;
}

/// Step that drops keys without looking at their values.
pub struct DropFields {
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    pub fields: &'static [&'static str],
    pub description: &'static str,
}

impl StructMigration for DropFields {
    fn from_version(&self) -> SchemaVersion {
        self.from
    }

    fn to_version(&self) -> SchemaVersion {
        self.to
    }

    fn description(&self) -> &str {
        self.description
    }

    fn migrate(&self, mut data: Dict) -> Result<MigrationResult> {
        let warnings = self
            .fields
            .iter()
            .filter(|field| data.remove(**field).is_some())
            .map(|field| MigrationWarning::FieldRemoved {
                field: field.to_string(),
            })
            .collect();
        Ok(MigrationResult { data, warnings })
    }
}

/// Bring `data`, stamped `data_version`, up to `schema`'s current version.
pub fn migrate(
    schema: &StructSchema,
    data: Dict,
    data_version: SchemaVersion,
) -> Result<MigrationResult> {
    let mut current = data;
    let mut warnings = Vec::new();

    for step in schema
        .migrations()
        .iter()
        .filter(|step| step.from_version() >= data_version)
    {
        debug!(
            subsystem = "schema",
            component = "migration",
            struct_name = schema.name(),
            from_version = %step.from_version(),
            to_version = %step.to_version(),
            "{}",
            step.description()
        );
        let result = step.migrate(current)?;
        current = result.data;
        warnings.extend(result.warnings);
    }

    for deprecated in schema.deprecated() {
        let name = deprecated.descriptor.name();
        if deprecated.removed > data_version
            && schema.attribute(name).is_none()
            && current.remove(name).is_some()
        {
            warnings.push(MigrationWarning::FieldRemoved {
                field: name.to_string(),
            });
        }
    }

    for warning in &warnings {
        match warning {
            MigrationWarning::DataDiscarded { .. } => warn!(
                subsystem = "schema",
                component = "migration",
                struct_name = schema.name(),
                from_version = %data_version,
                to_version = %schema.version(),
                "{}",
                warning
            ),
            _ => debug!(
                subsystem = "schema",
                component = "migration",
                struct_name = schema.name(),
                from_version = %data_version,
                "{}",
                warning
            ),
        }
    }

    Ok(MigrationResult {
        data: current,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDescriptor, StructSchema};
    use serde_json::json;

    fn dict(value: JsonValue) -> Dict {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn sample_schema() -> StructSchema {
        StructSchema::builder("Sample", SchemaVersion::new(0, 3), "Test struct")
            .attribute(AttributeDescriptor::string("name", "Name").with_default(""))
            .deprecated(
                AttributeDescriptor::integer("id", "Old id"),
                None,
                SchemaVersion::new(0, 2),
            )
            .deprecated(
                AttributeDescriptor::integer("legacy", "Old field"),
                Some(SchemaVersion::new(0, 2)),
                SchemaVersion::new(0, 3),
            )
            .migration(DropFields {
                from: SchemaVersion::new(0, 2),
                to: SchemaVersion::new(0, 3),
                fields: &["alias"],
                description: "drop alias",
            })
            .build()
    }

    #[test]
    fn test_drop_fields_reports_only_present_keys() {
        let step = DropFields {
            from: SchemaVersion::new(0, 1),
            to: SchemaVersion::new(0, 2),
            fields: &["id", "missing"],
            description: "drop id",
        };
        let result = step.migrate(dict(json!({"id": 1, "name": "a"}))).unwrap();
        assert_eq!(result.data, dict(json!({"name": "a"})));
        assert_eq!(
            result.warnings,
            vec![MigrationWarning::FieldRemoved {
                field: "id".to_string()
            }]
        );
    }

    #[test]
    fn test_steps_before_data_version_are_skipped() {
        let schema = sample_schema();
        // Stamped 0.3 would never migrate; stamped 0.2 runs the 0.2 step.
        let result = migrate(
            &schema,
            dict(json!({"name": "a", "alias": "b", "legacy": 1})),
            SchemaVersion::new(0, 2),
        )
        .unwrap();
        assert_eq!(result.data, dict(json!({"name": "a"})));
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_deprecated_fields_stripped_at_removal_boundary() {
        let schema = sample_schema();
        let result = migrate(
            &schema,
            dict(json!({"name": "a", "id": 3})),
            SchemaVersion::new(0, 1),
        )
        .unwrap();
        assert_eq!(result.data, dict(json!({"name": "a"})));

        // `id` was already gone at 0.2, so data stamped 0.2 keeps it and the
        // constructor gets to reject it.
        let result = migrate(
            &schema,
            dict(json!({"name": "a", "id": 3})),
            SchemaVersion::new(0, 2),
        )
        .unwrap();
        assert!(result.data.contains_key("id"));
    }
}
