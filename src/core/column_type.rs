/// Semantic column types derived from `information_schema.columns`
///
/// A catalog `data_type` plus its `is_nullable` flag collapse into one of
/// eight categories. Record decoding is specialized against these, so the
/// set is closed: anything else is rejected at registration time.
use serde::Serialize;
use std::fmt;

use super::error::{MapperError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    String,
    NullableString,
    Int64,
    NullableInt64,
    Bool,
    NullableBool,
    Timestamp,
    NullableTimestamp,
}

impl ColumnType {
    /// Infer the semantic type from catalog metadata.
    ///
    /// `nullable` must be exactly `YES` or `NO`; it is validated before the
    /// data type so a bad flag is reported even for an unsupported type.
    pub fn from_catalog(data_type: &str, nullable: &str) -> Result<Self> {
        let nullable = match nullable {
            "YES" => true,
            "NO" => false,
            other => return Err(MapperError::InvalidNullable(other.to_string())),
        };

        let (plain, with_null) = match data_type {
            "character varying" | "text" | "inet" => (Self::String, Self::NullableString),
            "integer" => (Self::Int64, Self::NullableInt64),
            "boolean" => (Self::Bool, Self::NullableBool),
            "timestamp with time zone" | "timestamp without time zone" => {
                (Self::Timestamp, Self::NullableTimestamp)
            }
            other => return Err(MapperError::InvalidDataType(other.to_string())),
        };

        Ok(if nullable { with_null } else { plain })
    }

    #[must_use]
    pub const fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::NullableString | Self::NullableInt64 | Self::NullableBool | Self::NullableTimestamp
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::NullableString => "nullable string",
            Self::Int64 => "int64",
            Self::NullableInt64 => "nullable int64",
            Self::Bool => "bool",
            Self::NullableBool => "nullable bool",
            Self::Timestamp => "timestamp",
            Self::NullableTimestamp => "nullable timestamp",
        };
        f.write_str(name)
    }
}
