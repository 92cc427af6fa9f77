//! Struct instances: one validated value per current attribute.

use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

use super::attribute::encode_value;
use super::definition::StructSchema;
use super::migration::{self, Dict};
use super::version::SchemaVersion;
use super::warning::MigrationWarning;
use crate::defaults::VERSION_KEY;
use crate::error::{Error, Result};
use crate::value::Value;

/// One instance of a versioned struct.
#[derive(Clone)]
pub struct MetadataObject {
    schema: &'static StructSchema,
    values: Vec<Value>,
}

impl MetadataObject {
    /// Instance holding every attribute's default.
    pub fn new(schema: &'static StructSchema) -> Self {
        MetadataObject {
            schema,
            values: schema.attributes().iter().map(|a| a.default_value()).collect(),
        }
    }

    /// Build an instance from positional and keyword values.
    ///
    /// A single positional value that is already an instance of `schema` is
    /// copied. Otherwise positional values bind to attributes in declaration
    /// order, keywords bind by name, and everything left takes its default.
    pub fn construct<K, I>(
        schema: &'static StructSchema,
        positional: Vec<Value>,
        keywords: I,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut keywords = keywords.into_iter().peekable();

        if positional.len() == 1 && keywords.peek().is_none() {
            if let Value::Struct(obj) = &positional[0] {
                if obj.type_name() == schema.name() {
                    return Ok((**obj).clone());
                }
            }
        }

        let attributes = schema.attributes();
        if positional.len() > attributes.len() {
            return Err(Error::Construction(format!(
                "{} takes at most {} positional values but {} were given",
                schema.name(),
                attributes.len(),
                positional.len()
            )));
        }

        let mut bound: Vec<Option<Value>> = vec![None; attributes.len()];
        for (i, value) in positional.into_iter().enumerate() {
            bound[i] = Some(attributes[i].validate(value)?);
        }

        for (key, value) in keywords {
            let key = key.as_ref();
            let index = schema.index_of(key).ok_or_else(|| {
                Error::Construction(format!(
                    "{} got an unexpected keyword '{}'",
                    schema.name(),
                    key
                ))
            })?;
            if bound[index].is_some() {
                return Err(Error::Construction(format!(
                    "{} got multiple values for '{}'",
                    schema.name(),
                    key
                )));
            }
            bound[index] = Some(attributes[index].validate(value)?);
        }

        let values = bound
            .into_iter()
            .zip(attributes)
            .map(|(value, attr)| value.unwrap_or_else(|| attr.default_value()))
            .collect();

        Ok(MetadataObject { schema, values })
    }

    /// [`construct`](Self::construct) with positional values only.
    pub fn from_values(schema: &'static StructSchema, positional: Vec<Value>) -> Result<Self> {
        Self::construct(schema, positional, std::iter::empty::<(&str, Value)>())
    }

    /// Rebuild an instance from its serialized dictionary.
    ///
    /// A `"version"` key older than the schema routes through the schema's
    /// migrations first; a missing or equal one constructs directly.
    pub fn from_dict(schema: &'static StructSchema, data: &Dict) -> Result<Self> {
        Self::from_dict_with_warnings(schema, data).map(|(obj, _)| obj)
    }

    /// Like [`from_dict`](Self::from_dict), also returning what the
    /// migration dropped or converted.
    pub fn from_dict_with_warnings(
        schema: &'static StructSchema,
        data: &Dict,
    ) -> Result<(Self, Vec<MigrationWarning>)> {
        let mut data = data.clone();
        let stamp = data.remove(VERSION_KEY).map(parse_stamp).transpose()?;

        let (data, warnings) = match stamp {
            Some(version) => match version.cmp(&schema.version()) {
                Ordering::Less => {
                    let result = migration::migrate(schema, data, version)?;
                    (result.data, result.warnings)
                }
                Ordering::Equal => (data, Vec::new()),
                Ordering::Greater => {
                    warn!(
                        subsystem = "schema",
                        component = "object",
                        op = "from_dict",
                        struct_name = schema.name(),
                        from_version = %version,
                        to_version = %schema.version(),
                        "Data is newer than the known schema"
                    );
                    (data, Vec::new())
                }
            },
            None => (data, Vec::new()),
        };

        let object = Self::construct(
            schema,
            Vec::new(),
            data.into_iter().map(|(k, v)| (k, Value::Raw(v))),
        )?;
        Ok((object, warnings))
    }

    /// Serialized dictionary of the current attributes. The version stamp is
    /// left to the caller.
    pub fn to_dict(&self) -> Dict {
        self.fields()
            .map(|(name, value)| (name.to_string(), encode_value(value)))
            .collect::<Map<String, JsonValue>>()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Reassign one attribute. The value is validated first; on error the
    /// instance is left unchanged.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.schema.index_of(name).ok_or_else(|| {
            Error::Construction(format!(
                "{} has no attribute '{}'",
                self.schema.name(),
                name
            ))
        })?;
        self.values[index] = self.schema.attributes()[index].validate(value)?;
        Ok(())
    }

    /// `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.schema
            .attributes()
            .iter()
            .map(|a| a.name())
            .zip(self.values.iter())
    }

    pub fn schema(&self) -> &'static StructSchema {
        self.schema
    }

    pub fn type_name(&self) -> &'static str {
        self.schema.name()
    }

    pub fn version(&self) -> SchemaVersion {
        self.schema.version()
    }
}

fn parse_stamp(stamp: JsonValue) -> Result<SchemaVersion> {
    match stamp {
        JsonValue::String(s) => SchemaVersion::parse(&s),
        JsonValue::Number(n) => SchemaVersion::parse(&n.to_string()),
        other => Err(Error::InvalidVersion(other.to_string())),
    }
}

impl PartialEq for MetadataObject {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.values == other.values
    }
}

impl fmt::Debug for MetadataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.type_name());
        for (name, value) in self.fields() {
            out.field(name, value);
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeDescriptor;
    use once_cell::sync::Lazy;
    use serde_json::json;

    static POINT: Lazy<StructSchema> = Lazy::new(|| {
        StructSchema::builder("Point", SchemaVersion::new(0, 1), "A labelled point")
            .attribute(AttributeDescriptor::float("x", "X").with_default(0.0))
            .attribute(AttributeDescriptor::float("y", "Y").with_default(0.0))
            .attribute(AttributeDescriptor::string("label", "Label"))
            .build()
    });

    fn no_keywords() -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    #[test]
    fn test_positional_then_keyword_binding() {
        let p = MetadataObject::construct(&POINT, vec![1.into()], vec![("label", "a".into())])
            .unwrap();
        assert_eq!(p.get("x"), Some(&Value::Float(1.0)));
        assert_eq!(p.get("y"), Some(&Value::Float(0.0)));
        assert_eq!(p.get("label"), Some(&Value::from("a")));
    }

    #[test]
    fn test_too_many_positionals() {
        let err = MetadataObject::construct(
            &POINT,
            vec![1.into(), 2.into(), "a".into(), 4.into()],
            no_keywords(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
    }

    #[test]
    fn test_keyword_already_bound_positionally() {
        let err = MetadataObject::construct(&POINT, vec![1.into()], vec![("x", 2.into())])
            .unwrap_err();
        assert!(err.to_string().contains("multiple values"));
    }

    #[test]
    fn test_copy_construction() {
        let p = MetadataObject::construct(&POINT, vec![1.into(), 2.into()], no_keywords()).unwrap();
        let copy = MetadataObject::construct(&POINT, vec![p.clone().into()], no_keywords()).unwrap();
        assert_eq!(copy, p);
    }

    #[test]
    fn test_set_revalidates() {
        let mut p = MetadataObject::new(&POINT);
        assert!(p.set("x", vec![1]).is_err());
        assert_eq!(p.get("x"), Some(&Value::Float(0.0)));
        p.set("x", 3).unwrap();
        assert_eq!(p.get("x"), Some(&Value::Float(3.0)));
        assert!(p.set("z", 1).is_err());
    }

    #[test]
    fn test_dict_round_trip_keeps_null() {
        let p = MetadataObject::new(&POINT);
        let dict = p.to_dict();
        assert_eq!(dict.get("label"), Some(&JsonValue::Null));
        assert!(!dict.contains_key(VERSION_KEY));
        assert_eq!(MetadataObject::from_dict(&POINT, &dict).unwrap(), p);
    }

    #[test]
    fn test_from_dict_version_handling() {
        let data = json!({"x": 1.5, "version": "0.1"});
        let p = MetadataObject::from_dict(&POINT, data.as_object().unwrap()).unwrap();
        assert_eq!(p.get("x"), Some(&Value::Float(1.5)));

        let newer = json!({"x": 1.5, "version": "0.9"});
        assert!(MetadataObject::from_dict(&POINT, newer.as_object().unwrap()).is_ok());

        let bad = json!({"x": 1.5, "version": "one"});
        let err = MetadataObject::from_dict(&POINT, bad.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidVersion(_)));

        let unknown = json!({"z": 1});
        let err = MetadataObject::from_dict(&POINT, unknown.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
    }

    #[test]
    fn test_debug_lists_fields() {
        let p = MetadataObject::new(&POINT);
        let rendered = format!("{:?}", p);
        assert!(rendered.starts_with("Point {"));
        assert!(rendered.contains("label: Null"));
    }
}
