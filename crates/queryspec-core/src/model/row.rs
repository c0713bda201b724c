use crate::{model::shape::Shape, traits::Record, value::Value};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::OnceLock};

///
/// Row
///
/// Dynamic record: ordered `(path, value)` columns. Produced by projections
/// and by the table provider, and usable as a query source in its own right
/// (its shape is open, so paths resolve per row).
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Append or replace a column, keeping first-insertion order.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        let path = path.into();
        let value = value.into();

        match self.columns.iter_mut().find(|(p, _)| *p == path) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((path, value)),
        }
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find_map(|(p, v)| (p == path).then_some(v))
    }

    /// Positional read used by bound projection slots.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, v)| v)
    }

    #[must_use]
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.columns.iter().map(|(_, v)| v.clone()).collect()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build a row from a JSON object, flattening nested objects into
    /// dotted paths. Returns `None` for non-object input.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        let object = json.as_object()?;
        let mut row = Self::new();
        flatten_json(&mut row, None, object);

        Some(row)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.set(k, v);
        }
        row
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (path, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{path}: {value}")?;
        }
        f.write_str("}")
    }
}

impl Record for Row {
    fn shape() -> &'static Shape<Self> {
        static SHAPE: OnceLock<Shape<Row>> = OnceLock::new();

        SHAPE.get_or_init(|| {
            Shape::builder("Row")
                .open(|row: &Self, path| row.get(path).cloned())
                .build()
        })
    }

    fn to_row(&self) -> Row {
        self.clone()
    }
}

#[cfg(feature = "json")]
fn flatten_json(
    row: &mut Row,
    prefix: Option<&str>,
    object: &serde_json::Map<String, serde_json::Value>,
) {
    for (key, value) in object {
        let path = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));
        match value {
            serde_json::Value::Object(inner) => flatten_json(row, Some(&path), inner),
            other => row.set(path, json_to_value(other)),
        }
    }
}

#[cfg(feature = "json")]
fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null | serde_json::Value::Object(_) => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_u64().map(Value::Uint))
            .or_else(|| n.as_f64().map(Value::float))
            .unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
    }
}
