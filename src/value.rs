use crate::ast::{FlonValue, FlonValueKind, TypeTag};
use indexmap::IndexMap;
use serde::Serialize;

/// A fully materialized FLON value, detached from the store. Objects keep
/// their member order. Serializes to the JSON-equivalent shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Looks up a key in an object. Returns `None` when the key is absent
    /// or the value is not an object; callers supply their own fallback.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Value::String(_) => TypeTag::String,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Bool,
            Value::List(_) => TypeTag::List,
            Value::Object(_) => TypeTag::Object,
        }
    }
}

pub fn to_value(flon_value: &FlonValue) -> Value {
    match &flon_value.kind {
        FlonValueKind::String(s) => Value::String(s.clone()),
        FlonValueKind::Int(n) => Value::Int(*n),
        FlonValueKind::Float(f) => Value::Float(*f),
        FlonValueKind::Bool(b) => Value::Bool(*b),
        FlonValueKind::List(items) => Value::List(items.iter().map(to_value).collect()),
        FlonValueKind::Object(members) => {
            let mut map = IndexMap::new();
            for member in members {
                map.insert(member.key.clone(), to_value(&member.value));
            }
            Value::Object(map)
        }
    }
}
