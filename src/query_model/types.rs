//! Type metadata shared by the query model and the SQL statement model.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A mapped entity type, optionally derived from a base entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub base: Option<Box<EntityType>>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        EntityType {
            name: name.into(),
            base: None,
        }
    }

    pub fn derived(name: impl Into<String>, base: EntityType) -> Self {
        EntityType {
            name: name.into(),
            base: Some(Box::new(base)),
        }
    }

    /// True if `self` is `other` or inherits from it.
    pub fn is_subtype_of(&self, other: &EntityType) -> bool {
        self == other
            || self
                .base
                .as_deref()
                .is_some_and(|base| base.is_subtype_of(other))
    }
}

/// Static type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Double,
    String,
    Char,
    DateTime,
    Nullable(Box<DataType>),
    Entity(EntityType),
    Sequence(Box<DataType>),
    Grouping {
        key: Box<DataType>,
        element: Box<DataType>,
    },
    /// Anonymous types, tuples and key/value pairs.
    Record {
        type_name: String,
        members: Vec<(String, DataType)>,
    },
    Object,
}

impl DataType {
    pub fn entity(name: impl Into<String>) -> Self {
        DataType::Entity(EntityType::new(name))
    }

    pub fn sequence_of(item: DataType) -> Self {
        DataType::Sequence(Box::new(item))
    }

    pub fn nullable(inner: DataType) -> Self {
        match inner {
            DataType::Nullable(_) => inner,
            other => DataType::Nullable(Box::new(other)),
        }
    }

    pub fn record(type_name: impl Into<String>, members: Vec<(String, DataType)>) -> Self {
        DataType::Record {
            type_name: type_name.into(),
            members,
        }
    }

    pub fn key_value_pair(key: DataType, value: DataType) -> Self {
        DataType::record(
            "KeyValuePair",
            vec![("Key".to_string(), key), ("Value".to_string(), value)],
        )
    }

    pub fn non_nullable(&self) -> &DataType {
        match self {
            DataType::Nullable(inner) => inner.non_nullable(),
            other => other,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.non_nullable(), DataType::Boolean)
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, DataType::Sequence(_))
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, DataType::Entity(_))
    }

    /// Scalar types are the ones SQL can carry in a single column.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.non_nullable(),
            DataType::Boolean
                | DataType::Int32
                | DataType::Int64
                | DataType::Double
                | DataType::String
                | DataType::Char
                | DataType::DateTime
        )
    }

    pub fn entity_type(&self) -> Option<&EntityType> {
        match self {
            DataType::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&DataType> {
        match self {
            DataType::Sequence(item) => Some(item),
            _ => None,
        }
    }

    pub fn member_type(&self, member_name: &str) -> Option<&DataType> {
        match self {
            DataType::Record { members, .. } => members
                .iter()
                .find(|(name, _)| name == member_name)
                .map(|(_, ty)| ty),
            DataType::Grouping { key, .. } if member_name == "Key" => Some(key),
            _ => None,
        }
    }

    /// Whether a value of type `other` can be stored in a slot of type `self`.
    pub fn is_assignable_from(&self, other: &DataType) -> bool {
        match (self, other) {
            (DataType::Object, _) | (_, DataType::Object) => true,
            (DataType::Entity(target), DataType::Entity(source)) => source.is_subtype_of(target),
            (DataType::Nullable(target), source) => target.is_assignable_from(source.non_nullable()),
            (target, DataType::Nullable(source)) => target.is_assignable_from(source),
            (DataType::Sequence(target), DataType::Sequence(source)) => {
                target.is_assignable_from(source)
            }
            (target, source) => target == source,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "Boolean"),
            DataType::Int32 => write!(f, "Int32"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::Double => write!(f, "Double"),
            DataType::String => write!(f, "String"),
            DataType::Char => write!(f, "Char"),
            DataType::DateTime => write!(f, "DateTime"),
            DataType::Nullable(inner) => write!(f, "{}?", inner),
            DataType::Entity(entity) => write!(f, "{}", entity.name),
            DataType::Sequence(item) => write!(f, "IEnumerable<{}>", item),
            DataType::Grouping { key, element } => write!(f, "IGrouping<{}, {}>", key, element),
            DataType::Record { type_name, .. } => write!(f, "{}", type_name),
            DataType::Object => write!(f, "Object"),
        }
    }
}

/// A property or field of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberInfo {
    pub declaring_type: String,
    pub name: String,
    pub ty: DataType,
}

impl MemberInfo {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>, ty: DataType) -> Self {
        MemberInfo {
            declaring_type: declaring_type.into(),
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)
    }
}

/// A runtime value carried by a constant or read back from a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Char(char),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
    Record(Vec<(String, Value)>),
    /// A mapped object, identified by its type name and field values.
    Entity {
        type_name: String,
        fields: Vec<(String, Value)>,
    },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) | Value::Entity { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Best-effort static type of the value, used for constants built without an explicit type.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Object,
            Value::Boolean(_) => DataType::Boolean,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Double(_) => DataType::Double,
            Value::String(_) => DataType::String,
            Value::Char(_) => DataType::Char,
            Value::DateTime(_) => DataType::DateTime,
            Value::List(items) => DataType::sequence_of(
                items
                    .first()
                    .map(Value::data_type)
                    .unwrap_or(DataType::Object),
            ),
            Value::Record(fields) => DataType::record(
                "Record",
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.data_type()))
                    .collect(),
            ),
            Value::Entity { type_name, .. } => DataType::entity(type_name.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Value::Record(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", name, value)?;
                }
                write!(f, " }}")
            }
            Value::Entity { type_name, .. } => write!(f, "{}", type_name),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}
