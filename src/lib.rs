// pgmapper - minimal PostgreSQL data-access layer
// Register tables once, build statements with chained calls, execute them
// and get SELECT rows back as records typed from the catalog.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::multiple_crate_versions)]

// Column types, decoded values, bound params, records, errors
pub mod core;

// Statement builder (SELECT/INSERT/UPDATE/DELETE/TRUNCATE)
pub mod builder;

// Catalog-driven "table.column" -> ColumnType registry
pub mod registry;

// Driver seam (Connection / RowCursor / ScanRow) and the postgres implementation
pub mod connection;

// Execution and row decoding
pub mod executor;

// File + environment configuration
pub mod config;

// Re-export commonly used types for convenience
pub use crate::core::{ColumnType, DriverError, MapperError, Param, Record, Result, Value};
pub use builder::{Direction, JoinKind, Statement, StatementKind};
pub use registry::Registry;
pub use connection::{Connection, RowCursor, ScanRow};
pub use executor::{Mapper, PgMapper};
pub use config::MapperConfig;
