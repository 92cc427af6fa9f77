//! Attribute descriptors: the typed, range-constrained fields of a struct.

use serde_json::{Number, Value as JsonValue};
use std::fmt;

use super::definition::StructSchema;
use super::enums::EnumChoices;
use super::object::MetadataObject;
use crate::error::{Error, Result};
use crate::value::Value;

/// Lazily resolved schema of a nested struct attribute.
pub type SchemaRef = fn() -> &'static StructSchema;

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub const fn unbounded() -> Self {
        Bounds {
            min: None,
            max: None,
        }
    }

    pub const fn new(min: Option<T>, max: Option<T>) -> Self {
        Bounds { min, max }
    }
}

impl<T: PartialOrd + Copy + fmt::Display> Bounds<T> {
    fn check(&self, attribute: &str, value: T) -> Result<()> {
        if let Some(min) = self.min {
            if value < min {
                return Err(Error::validation(
                    attribute,
                    format!("value {} below minimum {}", value, min),
                ));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(Error::validation(
                    attribute,
                    format!("value {} above maximum {}", value, max),
                ));
            }
        }
        Ok(())
    }
}

/// Semantic type of an attribute.
#[derive(Debug, Clone)]
pub enum ValueType {
    Integer(Bounds<i64>),
    Float(Bounds<f64>),
    String,
    Enum(&'static EnumChoices),
    Vector(Box<ValueType>),
    Struct(SchemaRef),
}

impl ValueType {
    fn label(&self) -> String {
        match self {
            ValueType::Integer(_) => "integer".to_string(),
            ValueType::Float(_) => "float".to_string(),
            ValueType::String => "string".to_string(),
            ValueType::Enum(choices) => format!("enum {}", choices.name),
            ValueType::Vector(inner) => format!("vector of {}", inner.label()),
            ValueType::Struct(schema) => format!("struct {}", schema().name()),
        }
    }
}

/// One named field of a struct schema.
///
/// Descriptors are built once per schema and shared by every instance.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    name: &'static str,
    description: &'static str,
    value_type: ValueType,
    default: Option<Value>,
}

impl AttributeDescriptor {
    fn of(name: &'static str, description: &'static str, value_type: ValueType) -> Self {
        AttributeDescriptor {
            name,
            description,
            value_type,
            default: None,
        }
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::of(name, description, ValueType::Integer(Bounds::unbounded()))
    }

    pub fn float(name: &'static str, description: &'static str) -> Self {
        Self::of(name, description, ValueType::Float(Bounds::unbounded()))
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::of(name, description, ValueType::String)
    }

    pub fn enumeration(
        name: &'static str,
        description: &'static str,
        choices: &'static EnumChoices,
    ) -> Self {
        Self::of(name, description, ValueType::Enum(choices))
    }

    pub fn vector(name: &'static str, description: &'static str, element: ValueType) -> Self {
        Self::of(name, description, ValueType::Vector(Box::new(element)))
    }

    pub fn structure(name: &'static str, description: &'static str, schema: SchemaRef) -> Self {
        Self::of(name, description, ValueType::Struct(schema))
    }

    /// Declare an explicit default. `Value::Null` marks the field as
    /// optional ("not measured").
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restrict an integer attribute to an inclusive range.
    pub fn with_int_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let ValueType::Integer(_) = self.value_type {
            self.value_type = ValueType::Integer(Bounds::new(min, max));
        }
        self
    }

    /// Restrict a float attribute to an inclusive range.
    pub fn with_float_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if let ValueType::Float(_) = self.value_type {
            self.value_type = ValueType::Float(Bounds::new(min, max));
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn declared_default(&self) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match &self.value_type {
            ValueType::Vector(_) => Value::List(Vec::new()),
            ValueType::Struct(schema) => Value::Struct(Box::new(MetadataObject::new(schema()))),
            ValueType::Enum(choices) => choices.fallback().map(Value::Enum).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Whether `Value::Null` is an acceptable value.
    pub fn is_nullable(&self) -> bool {
        match self.value_type {
            ValueType::Vector(_) | ValueType::Struct(_) => false,
            _ => self.declared_default().is_null(),
        }
    }

    /// A fresh copy of the default value, never shared between instances.
    pub fn default_value(&self) -> Value {
        let declared = self.declared_default();
        self.validate(declared.clone()).unwrap_or(declared)
    }

    /// Validate `value`, applying the documented coercions.
    ///
    /// * floats accept integers; infinities and NaN are rejected
    /// * integers and floats accept decimal text
    /// * strings accept integers and floats, rendered as text
    /// * enums accept a member name or integer value
    /// * structs accept a JSON object, decoded through `from_dict`
    pub fn validate(&self, value: impl Into<Value>) -> Result<Value> {
        coerce(self.name, &self.value_type, self.is_nullable(), value.into())
    }

    /// Plain JSON representation of a validated value.
    pub fn encode(&self, value: &Value) -> JsonValue {
        encode_value(value)
    }

    /// Inverse of [`encode`](Self::encode).
    pub fn decode(&self, json: JsonValue) -> Result<Value> {
        self.validate(Value::Raw(json))
    }

    /// Check that the declared default satisfies this descriptor.
    pub fn check_default(&self) -> Result<()> {
        self.validate(self.declared_default()).map(|_| ())
    }
}

fn mismatch(attribute: &str, expected: &ValueType, got: &Value) -> Error {
    Error::validation(
        attribute,
        format!("expected {}, got {}", expected.label(), got.kind()),
    )
}

fn coerce(attribute: &str, ty: &ValueType, nullable: bool, value: Value) -> Result<Value> {
    let value = match value {
        Value::Raw(json) => return coerce_json(attribute, ty, nullable, json),
        Value::Null if nullable => return Ok(Value::Null),
        Value::Null => return Err(Error::validation(attribute, "value is required")),
        other => other,
    };

    match ty {
        ValueType::Integer(bounds) => {
            let i = match &value {
                Value::Int(i) => *i,
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| Error::validation(attribute, format!("'{}' is not an integer", s)))?,
                _ => return Err(mismatch(attribute, ty, &value)),
            };
            bounds.check(attribute, i)?;
            Ok(Value::Int(i))
        }
        ValueType::Float(bounds) => {
            let f = match &value {
                Value::Float(f) => *f,
                Value::Int(i) => *i as f64,
                Value::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| Error::validation(attribute, format!("'{}' is not a number", s)))?,
                _ => return Err(mismatch(attribute, ty, &value)),
            };
            if !f.is_finite() {
                return Err(Error::validation(attribute, format!("{} is not a finite number", f)));
            }
            bounds.check(attribute, f)?;
            Ok(Value::Float(f))
        }
        ValueType::String => match value {
            Value::Str(s) => Ok(Value::Str(s)),
            Value::Int(i) => Ok(Value::Str(i.to_string())),
            Value::Float(f) => Ok(Value::Str(f.to_string())),
            other => Err(mismatch(attribute, ty, &other)),
        },
        ValueType::Enum(choices) => {
            let member = match &value {
                Value::Enum(m) if m.choices().name == choices.name => Some(*m),
                Value::Str(s) => choices.by_name(s),
                Value::Int(i) => choices.by_value(*i),
                _ => return Err(mismatch(attribute, ty, &value)),
            };
            member.map(Value::Enum).ok_or_else(|| {
                Error::validation(
                    attribute,
                    format!("{:?} is not a member of {}", value, choices.name),
                )
            })
        }
        ValueType::Vector(element) => match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| coerce(attribute, element, false, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(mismatch(attribute, ty, &other)),
        },
        ValueType::Struct(schema) => match value {
            Value::Struct(obj) if obj.type_name() == schema().name() => Ok(Value::Struct(obj)),
            other => Err(mismatch(attribute, ty, &other)),
        },
    }
}

fn coerce_json(attribute: &str, ty: &ValueType, nullable: bool, json: JsonValue) -> Result<Value> {
    let value = match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => {
            return Err(Error::validation(
                attribute,
                format!("booleans are not supported (got {})", b),
            ))
        }
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::Str(s),
        JsonValue::Array(items) => Value::List(items.into_iter().map(Value::Raw).collect()),
        JsonValue::Object(map) => match ty {
            ValueType::Struct(schema) => {
                Value::Struct(Box::new(MetadataObject::from_dict(schema(), &map)?))
            }
            _ => {
                return Err(Error::validation(
                    attribute,
                    format!("expected {}, got object", ty.label()),
                ))
            }
        },
    };
    coerce(attribute, ty, nullable, value)
}

/// JSON form of a value: enums by member name, structs as nested dicts,
/// non-finite floats as null.
pub(crate) fn encode_value(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::Enum(m) => JsonValue::String(m.name().to_string()),
        Value::List(items) => JsonValue::Array(items.iter().map(encode_value).collect()),
        Value::Struct(obj) => JsonValue::Object(obj.to_dict()),
        Value::Raw(json) => json.clone(),
    }
}
