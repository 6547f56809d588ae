/// Database handle abstraction
///
/// The engine only needs two operations from a driver: run a query and walk
/// its rows through a cursor, or run a statement and get a completion count.
/// `postgres::Client` implements this in `pg`; tests plug in a scripted
/// in-memory connection.
///
/// Cursors release their server-side resources on `Drop`, so every exit
/// path of a fetch (success, scan error, early return) frees them exactly once.
use chrono::{DateTime, Utc};

use crate::core::{DriverError, Param};

pub mod pg;

pub use pg::connect;

/// One fetched row, read column by column.
///
/// Getters return `Ok(None)` for SQL NULL and an error when the column
/// cannot be read as the requested representation.
pub trait ScanRow {
    /// Number of columns in the row.
    fn width(&self) -> usize;
    fn text(&self, idx: usize) -> Result<Option<String>, DriverError>;
    /// Integer columns of any width, widened to 64 bits.
    fn int(&self, idx: usize) -> Result<Option<i64>, DriverError>;
    fn boolean(&self, idx: usize) -> Result<Option<bool>, DriverError>;
    fn timestamp(&self, idx: usize) -> Result<Option<DateTime<Utc>>, DriverError>;
}

pub trait RowCursor {
    type Row: ScanRow;

    /// Next row, or `None` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<Self::Row>, DriverError>;
}

pub trait Connection {
    type Cursor<'a>: RowCursor
    where
        Self: 'a;

    /// Issue a row-returning query with positional arguments.
    fn query<'a>(&'a mut self, sql: &str, args: &[Param]) -> Result<Self::Cursor<'a>, DriverError>;

    /// Issue a statement, returning the number of affected rows.
    fn execute(&mut self, sql: &str, args: &[Param]) -> Result<u64, DriverError>;
}
