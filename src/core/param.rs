/// Bound statement arguments
///
/// A `Param` is what a `?` in a template turns into once numbered (`$N`).
/// It binds to the postgres driver through `ToSql`, narrowing integers to
/// the column's width and reading `Text` as an address for `inet` columns.
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use std::error::Error;
use std::net::IpAddr;

use super::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl Param {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Build a `Vec<Param>` from heterogeneous literals:
/// `params!["Bug eagle", 1000, "1r"]`.
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Param>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Param::from($arg)),+]
    };
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Param {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i64> for Param {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Param {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for Param {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl<T: Into<Self>> From<Option<T>> for Param {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

// Lets a decoded record be written back unchanged.
impl From<Value> for Param {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::NullableString(s) => s.into(),
            Value::Int64(i) => Self::Int(i),
            Value::NullableInt64(i) => i.into(),
            Value::Bool(b) => Self::Bool(b),
            Value::NullableBool(b) => b.into(),
            Value::Timestamp(t) => Self::Timestamp(t),
            Value::NullableTimestamp(t) => t.into(),
        }
    }
}

impl ToSql for Param {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Text(s) if *ty == Type::INET => s.parse::<IpAddr>()?.to_sql_checked(ty, out),
            Self::Text(s) => s.to_sql_checked(ty, out),
            Self::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql_checked(ty, out),
                _ => i.to_sql_checked(ty, out),
            },
            Self::Bool(b) => b.to_sql_checked(ty, out),
            Self::Timestamp(t) if *ty == Type::TIMESTAMP => t.naive_utc().to_sql_checked(ty, out),
            Self::Timestamp(t) => t.to_sql_checked(ty, out),
        }
    }

    // Per-variant checks happen in to_sql via the inner to_sql_checked.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
