use crate::error::{PrimitivesError, Result};
use num_bigint::BigInt;
use serde_json::{Map, Value};

/// A circuit input signal: either a single value or an array signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputValue {
    Scalar(BigInt),
    Array(Vec<BigInt>),
}

impl InputValue {
    pub fn values(&self) -> Vec<BigInt> {
        match self {
            Self::Scalar(v) => vec![v.clone()],
            Self::Array(vs) => vs.clone(),
        }
    }
}

/// Named circuit inputs, in the order the caller supplied them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamedInputSet {
    entries: Vec<(String, InputValue)>,
}

impl NamedInputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<BigInt>) -> Self {
        self.insert(name, InputValue::Scalar(value.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: InputValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Accepts `{"a": "1", "b": 2, "c": ["3", 4]}` style JSON objects.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(PrimitivesError::InputError(
                "inputs must be a JSON object".to_string(),
            ));
        };

        let mut set = Self::new();
        for (name, value) in map {
            let input = match value {
                Value::Array(items) => InputValue::Array(
                    items
                        .iter()
                        .map(|item| parse_input_scalar(name, item))
                        .collect::<Result<Vec<_>>>()?,
                ),
                other => InputValue::Scalar(parse_input_scalar(name, other)?),
            };
            set.insert(name.clone(), input);
        }
        Ok(set)
    }

    /// Renders the set as prover input JSON with values as decimal strings.
    pub fn to_json(&self) -> Value {
        self.entries
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    InputValue::Scalar(v) => Value::String(v.to_string()),
                    InputValue::Array(vs) => {
                        Value::Array(vs.iter().map(|v| Value::String(v.to_string())).collect())
                    }
                };
                (name.clone(), rendered)
            })
            .collect::<Map<String, Value>>()
            .into()
    }
}

fn parse_input_scalar(name: &str, value: &Value) -> Result<BigInt> {
    match value {
        Value::String(s) => BigInt::parse_bytes(s.as_bytes(), 10).ok_or_else(|| {
            PrimitivesError::InputError(format!("input {name}: not a decimal integer: {s:?}"))
        }),
        Value::Number(n) => n
            .as_i64()
            .map(BigInt::from)
            .or_else(|| n.as_u64().map(BigInt::from))
            .ok_or_else(|| {
                PrimitivesError::InputError(format!("input {name}: not an integer: {n}"))
            }),
        other => Err(PrimitivesError::InputError(format!(
            "input {name}: unsupported value {other}"
        ))),
    }
}
