use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The accumulated form state of a wizard: a string-keyed map of scalars,
/// nested objects (file metadata), and arrays (line items such as materials,
/// team members, or budget rows).
///
/// Drafts have no identity until submission; they are created empty or
/// pre-filled from an existing record and discarded if never submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    values: BTreeMap<String, Value>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills a draft from field pairs, e.g. when editing an existing
    /// record or instantiating a template.
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: fields
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    /// Merges a value into the draft. Setting a field never fails.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// String field, trimmed; `None` when absent, non-string, or blank.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Boolean field; absent or non-boolean values read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Integer field if present and numeric.
    pub fn int_field(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    /// Parses a `YYYY-MM-DD` string field as a date.
    pub fn date_field(&self, key: &str) -> Option<NaiveDate> {
        self.str_field(key)
            .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
    }

    /// Array field viewed as a slice of line items.
    pub fn items(&self, key: &str) -> &[Value] {
        self.values
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends one line item to an array field, creating it when absent.
    pub fn push_item(&mut self, key: &str, item: Value) {
        match self.values.get_mut(key) {
            Some(Value::Array(array)) => array.push(item),
            _ => {
                self.values.insert(key.to_string(), Value::Array(vec![item]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}
