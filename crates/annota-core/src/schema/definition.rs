//! Struct schemas: the static description of a versioned struct type.

use std::collections::HashSet;
use std::fmt;

use super::attribute::AttributeDescriptor;
use super::migration::StructMigration;
use super::version::SchemaVersion;
use crate::error::{Error, Result};

/// An attribute that existed in an earlier version of a struct.
///
/// Never present on a live instance; kept only so migrations can recognise
/// and strip its key from old data.
#[derive(Debug, Clone)]
pub struct DeprecatedAttribute {
    pub descriptor: AttributeDescriptor,
    /// Version that introduced the attribute; `None` when present from the start.
    pub introduced: Option<SchemaVersion>,
    /// First version without the attribute.
    pub removed: SchemaVersion,
}

/// Static description of a versioned struct type.
pub struct StructSchema {
    name: &'static str,
    version: SchemaVersion,
    description: &'static str,
    attributes: Vec<AttributeDescriptor>,
    since: Vec<Option<SchemaVersion>>,
    deprecated: Vec<DeprecatedAttribute>,
    migrations: Vec<Box<dyn StructMigration>>,
}

impl StructSchema {
    pub fn builder(
        name: &'static str,
        version: SchemaVersion,
        description: &'static str,
    ) -> StructSchemaBuilder {
        StructSchemaBuilder {
            schema: StructSchema {
                name,
                version,
                description,
                attributes: Vec::new(),
                since: Vec::new(),
                deprecated: Vec::new(),
                migrations: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Current attributes, in declaration order.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    /// Version in which a current attribute appeared (`None` = always present).
    pub fn since(&self, name: &str) -> Option<SchemaVersion> {
        self.index_of(name).and_then(|i| self.since[i])
    }

    pub fn deprecated(&self) -> &[DeprecatedAttribute] {
        &self.deprecated
    }

    pub fn migrations(&self) -> &[Box<dyn StructMigration>] {
        &self.migrations
    }

    /// Verify the schema is internally consistent.
    ///
    /// Checked once per schema by the registry tests rather than on every
    /// construction.
    pub fn check_definition(&self) -> Result<()> {
        let fail = |reason: String| -> Result<()> {
            Err(Error::Construction(format!("{}: {}", self.name, reason)))
        };

        let mut seen = HashSet::new();
        for attr in &self.attributes {
            if !seen.insert(attr.name()) {
                return fail(format!("duplicate attribute '{}'", attr.name()));
            }
            attr.check_default()?;
        }

        let tags = self
            .since
            .iter()
            .flatten()
            .chain(self.deprecated.iter().flat_map(|d| d.introduced.iter()))
            .chain(self.deprecated.iter().map(|d| &d.removed));
        for tag in tags {
            if *tag > self.version {
                return fail(format!("version tag {} newer than {}", tag, self.version));
            }
        }

        for dep in &self.deprecated {
            if let Some(introduced) = dep.introduced {
                if introduced >= dep.removed {
                    return fail(format!(
                        "'{}' removed in {} before being introduced in {}",
                        dep.descriptor.name(),
                        dep.removed,
                        introduced
                    ));
                }
            }
            if let Some(i) = self.index_of(dep.descriptor.name()) {
                let current_since = self.since[i];
                if current_since.map_or(true, |since| since < dep.removed) {
                    return fail(format!(
                        "'{}' is current and deprecated over overlapping versions",
                        dep.descriptor.name()
                    ));
                }
            }
        }

        let mut previous: Option<SchemaVersion> = None;
        for step in &self.migrations {
            if step.from_version() >= step.to_version() || step.to_version() > self.version {
                return fail(format!(
                    "invalid migration step {} -> {}",
                    step.from_version(),
                    step.to_version()
                ));
            }
            if previous.is_some_and(|p| p >= step.from_version()) {
                return fail("migration steps out of order".to_string());
            }
            previous = Some(step.from_version());
        }

        Ok(())
    }
}

impl fmt::Debug for StructSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructSchema")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field(
                "attributes",
                &self.attributes.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("migrations", &self.migrations.len())
            .finish()
    }
}

/// Builder for [`StructSchema`].
pub struct StructSchemaBuilder {
    schema: StructSchema,
}

impl StructSchemaBuilder {
    /// Add a current attribute present since the first version.
    pub fn attribute(mut self, descriptor: AttributeDescriptor) -> Self {
        self.schema.attributes.push(descriptor);
        self.schema.since.push(None);
        self
    }

    /// Add a current attribute introduced in `version`.
    pub fn attribute_since(mut self, version: SchemaVersion, descriptor: AttributeDescriptor) -> Self {
        self.schema.attributes.push(descriptor);
        self.schema.since.push(Some(version));
        self
    }

    pub fn deprecated(
        mut self,
        descriptor: AttributeDescriptor,
        introduced: Option<SchemaVersion>,
        removed: SchemaVersion,
    ) -> Self {
        self.schema.deprecated.push(DeprecatedAttribute {
            descriptor,
            introduced,
            removed,
        });
        self
    }

    pub fn migration(mut self, step: impl StructMigration + 'static) -> Self {
        self.schema.migrations.push(Box::new(step));
        self
    }

    pub fn build(mut self) -> StructSchema {
        self.schema
            .migrations
            .sort_by_key(|step| step.from_version());
        self.schema
    }
}
