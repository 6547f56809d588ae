use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::value::Value;

/// One decoded result row.
///
/// Fields keep the order of the statement's select list, so iteration and
/// serialization follow the SQL column order. Lookups are by the full
/// `"table.column"` name used in the select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, replacing the value if the name is already present.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_timestamp)
    }

    /// Nullable-aware forms: `None` if the field is missing or not text,
    /// `Some(None)` for SQL NULL.
    #[must_use]
    pub fn get_str_opt(&self, field: &str) -> Option<Option<&str>> {
        match self.get(field)? {
            Value::NullableString(s) => Some(s.as_deref()),
            Value::String(s) => Some(Some(s)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_i64_opt(&self, field: &str) -> Option<Option<i64>> {
        match self.get(field)? {
            Value::NullableInt64(i) => Some(*i),
            Value::Int64(i) => Some(Some(*i)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_bool_opt(&self, field: &str) -> Option<Option<bool>> {
        match self.get(field)? {
            Value::NullableBool(b) => Some(*b),
            Value::Bool(b) => Some(Some(*b)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_timestamp_opt(&self, field: &str) -> Option<Option<DateTime<Utc>>> {
        match self.get(field)? {
            Value::NullableTimestamp(t) => Some(*t),
            Value::Timestamp(t) => Some(Some(*t)),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Self::default();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
