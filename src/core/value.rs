use chrono::{DateTime, Utc};
use serde::Serialize;

use super::column_type::ColumnType;

/// A decoded cell. There is exactly one variant per `ColumnType`; nullable
/// columns carry an `Option` so NULL is kept apart from a zero value.
///
/// Serializes as the bare inner value (`null` for NULL, RFC 3339 for
/// timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    NullableString(Option<String>),
    Int64(i64),
    NullableInt64(Option<i64>),
    Bool(bool),
    NullableBool(Option<bool>),
    Timestamp(DateTime<Utc>),
    NullableTimestamp(Option<DateTime<Utc>>),
}

impl Value {
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        match self {
            Self::String(_) => ColumnType::String,
            Self::NullableString(_) => ColumnType::NullableString,
            Self::Int64(_) => ColumnType::Int64,
            Self::NullableInt64(_) => ColumnType::NullableInt64,
            Self::Bool(_) => ColumnType::Bool,
            Self::NullableBool(_) => ColumnType::NullableBool,
            Self::Timestamp(_) => ColumnType::Timestamp,
            Self::NullableTimestamp(_) => ColumnType::NullableTimestamp,
        }
    }

    /// True only for a nullable column holding NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(
            self,
            Self::NullableString(None)
                | Self::NullableInt64(None)
                | Self::NullableBool(None)
                | Self::NullableTimestamp(None)
        )
    }

    /// Text content, regardless of nullability. `None` for NULL or non-text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::NullableString(Some(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(i) | Self::NullableInt64(Some(i)) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) | Self::NullableBool(Some(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) | Self::NullableTimestamp(Some(t)) => Some(*t),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) | Self::NullableString(Some(s)) => write!(f, "{s}"),
            Self::Int64(i) | Self::NullableInt64(Some(i)) => write!(f, "{i}"),
            Self::Bool(b) | Self::NullableBool(Some(b)) => write!(f, "{b}"),
            Self::Timestamp(t) | Self::NullableTimestamp(Some(t)) => {
                write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%:z"))
            }
            Self::NullableString(None)
            | Self::NullableInt64(None)
            | Self::NullableBool(None)
            | Self::NullableTimestamp(None) => write!(f, "NULL"),
        }
    }
}
