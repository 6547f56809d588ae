use chrono::{DateTime, NaiveDateTime, Utc};
use postgres::fallible_iterator::FallibleIterator;
use postgres::types::{ToSql, Type};
use postgres::{Client, NoTls, Row, RowIter};
use std::net::IpAddr;

use super::{Connection, RowCursor, ScanRow};
use crate::core::{DriverError, MapperError, Param, Result};

/// Open a blocking client. `url` is either a `postgresql://` URL or a
/// libpq-style `key=value` string.
pub fn connect(url: &str) -> Result<Client> {
    Client::connect(url, NoTls).map_err(|e| MapperError::Connect(e.to_string()))
}

/// Streaming cursor over a `query_raw` result; the portal is closed when
/// the iterator is dropped.
pub struct PgCursor<'a> {
    rows: RowIter<'a>,
}

impl RowCursor for PgCursor<'_> {
    type Row = Row;

    fn next_row(&mut self) -> std::result::Result<Option<Row>, DriverError> {
        Ok(self.rows.next()?)
    }
}

impl Connection for Client {
    type Cursor<'a> = PgCursor<'a>;

    fn query<'a>(
        &'a mut self,
        sql: &str,
        args: &[Param],
    ) -> std::result::Result<PgCursor<'a>, DriverError> {
        let params = args.iter().map(|a| a as &dyn ToSql);
        let rows = self.query_raw(sql, params)?;
        Ok(PgCursor { rows })
    }

    fn execute(&mut self, sql: &str, args: &[Param]) -> std::result::Result<u64, DriverError> {
        let params: Vec<&(dyn ToSql + Sync)> = args.iter().map(|a| a as &(dyn ToSql + Sync)).collect();
        Ok(Client::execute(self, sql, &params)?)
    }
}

fn column_type(row: &Row, idx: usize) -> std::result::Result<Type, DriverError> {
    row.columns()
        .get(idx)
        .map(|c| c.type_().clone())
        .ok_or_else(|| format!("column index {idx} out of range ({} columns)", row.len()).into())
}

impl ScanRow for Row {
    fn width(&self) -> usize {
        self.len()
    }

    fn text(&self, idx: usize) -> std::result::Result<Option<String>, DriverError> {
        // inet has no text FromSql; go through the address type
        if column_type(self, idx)? == Type::INET {
            let addr: Option<IpAddr> = self.try_get(idx)?;
            return Ok(addr.map(|a| a.to_string()));
        }
        Ok(self.try_get(idx)?)
    }

    fn int(&self, idx: usize) -> std::result::Result<Option<i64>, DriverError> {
        match column_type(self, idx)? {
            Type::INT2 => Ok(self.try_get::<_, Option<i16>>(idx)?.map(i64::from)),
            Type::INT4 => Ok(self.try_get::<_, Option<i32>>(idx)?.map(i64::from)),
            _ => Ok(self.try_get(idx)?),
        }
    }

    fn boolean(&self, idx: usize) -> std::result::Result<Option<bool>, DriverError> {
        Ok(self.try_get(idx)?)
    }

    fn timestamp(&self, idx: usize) -> std::result::Result<Option<DateTime<Utc>>, DriverError> {
        if column_type(self, idx)? == Type::TIMESTAMP {
            let naive: Option<NaiveDateTime> = self.try_get(idx)?;
            return Ok(naive.map(|t| t.and_utc()));
        }
        Ok(self.try_get(idx)?)
    }
}
