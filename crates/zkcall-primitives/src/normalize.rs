//! Recursive numeric normalization of prover output.
//!
//! Prover tooling emits field elements as decimal strings (and export tooling as
//! `0x` hex strings) nested inside arbitrary JSON. [`normalize`] walks such a tree
//! and replaces every numeric string leaf with its integer value, leaving the
//! shape and key order of the tree untouched.

use num_bigint::BigUint;
use serde_json::{Map, Number, Value};

/// A JSON-like tree whose numeric leaves may already be integers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CanonicalValue {
    Integer(BigUint),
    String(String),
    /// A native JSON number, passed through untouched.
    Number(Number),
    Bool(bool),
    Null,
    Sequence(Vec<CanonicalValue>),
    /// Key/value pairs in their original order.
    Mapping(Vec<(String, CanonicalValue)>),
}

impl CanonicalValue {
    pub fn as_integer(&self) -> Option<&BigUint> {
        match self {
            Self::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[CanonicalValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up `key` in a mapping. Returns `None` for non-mappings.
    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        match self {
            Self::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Renders the tree back to JSON, writing integers as decimal strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(n) => Value::String(n.to_str_radix(10)),
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null => Value::Null,
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// Lifts raw JSON into the tree without interpreting any strings.
impl From<Value> for CanonicalValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<BigUint> for CanonicalValue {
    fn from(n: BigUint) -> Self {
        Self::Integer(n)
    }
}

/// Replaces every string leaf that is all decimal digits, or `0x` followed by
/// hex digits, with its integer value. Anything else passes through as is.
pub fn normalize(value: CanonicalValue) -> CanonicalValue {
    match value {
        CanonicalValue::String(s) => match parse_numeric(&s) {
            Some(n) => CanonicalValue::Integer(n),
            None => CanonicalValue::String(s),
        },
        CanonicalValue::Sequence(items) => {
            CanonicalValue::Sequence(items.into_iter().map(normalize).collect())
        }
        CanonicalValue::Mapping(entries) => CanonicalValue::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .collect(),
        ),
        other => other,
    }
}

pub fn normalize_json(value: &Value) -> CanonicalValue {
    normalize(CanonicalValue::from(value.clone()))
}

/// Parses `[0-9]+` as decimal and `0x[0-9a-fA-F]+` as hex.
pub fn parse_numeric(s: &str) -> Option<BigUint> {
    if let Some(digits) = s.strip_prefix("0x") {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return BigUint::parse_bytes(digits.as_bytes(), 16);
        }
        return None;
    }
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return BigUint::parse_bytes(s.as_bytes(), 10);
    }
    None
}
