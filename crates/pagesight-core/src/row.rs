//! Row and scalar value model shared by the query builder, executor and
//! formatter.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// A scalar as bound into a query or returned in a result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// One result row: an ordered column-name → scalar mapping.
///
/// Accessors coerce `Null` and missing columns the way the reports need
/// them (zero / empty), so aggregate projections over empty tables do not
/// need special-casing at every call site. The formatter mutates cells in
/// place via [`ReportRow::set`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    columns: Vec<(String, Value)>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or replace a column, preserving first-insertion order.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.columns.push((name.to_string(), value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Integer view of a cell; `Null`, missing, and non-numeric text read
    /// as 0, floats truncate.
    pub fn i64(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(Value::Int(v)) => *v,
            Some(Value::Float(v)) => *v as i64,
            Some(Value::Text(v)) => v.parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn f64(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(Value::Int(v)) => *v as f64,
            Some(Value::Float(v)) => *v,
            Some(Value::Text(v)) => v.parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Text view of a cell; `Null` and missing read as the empty string.
    pub fn str(&self, name: &str) -> &str {
        match self.get(name) {
            Some(Value::Text(v)) => v.as_str(),
            _ => "",
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One page of a paginated report. `total` is the full matching group
/// count irrespective of `limit`/`offset`, from the companion count query.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<ReportRow>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Serialize for Page {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Page", 4)?;
        s.serialize_field("items", &self.items)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("limit", &self.limit)?;
        s.serialize_field("offset", &self.offset)?;
        s.end()
    }
}
