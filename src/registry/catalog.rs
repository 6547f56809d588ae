/// `information_schema.columns` introspection
///
/// Catalog columns are domain types (`sql_identifier`, `character_data`,
/// `yes_or_no`), so the query casts them to text and binds the table name
/// as text. Rows come back in `ordinal_position` order.
use crate::connection::{Connection, RowCursor, ScanRow};
use crate::core::{ColumnType, DriverError, MapperError, Param, Result};

pub const COLUMNS_QUERY: &str = "SELECT column_name::text, data_type::text, is_nullable::text \
     FROM information_schema.columns WHERE table_name = $1::text ORDER BY ordinal_position";

/// One row of `information_schema.columns`, as reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    pub data_type: String,
    pub is_nullable: String,
}

impl CatalogColumn {
    pub fn from_row<R: ScanRow>(row: &R) -> std::result::Result<Self, DriverError> {
        if row.width() != 3 {
            return Err(format!("expected 3 catalog columns, got {}", row.width()).into());
        }
        Ok(Self {
            name: required(row, 0, "column_name")?,
            data_type: required(row, 1, "data_type")?,
            is_nullable: required(row, 2, "is_nullable")?,
        })
    }

    pub fn column_type(&self) -> Result<ColumnType> {
        ColumnType::from_catalog(&self.data_type, &self.is_nullable)
    }
}

fn required<R: ScanRow>(row: &R, idx: usize, name: &str) -> std::result::Result<String, DriverError> {
    row.text(idx)?
        .ok_or_else(|| format!("catalog column {name} is NULL").into())
}

/// Fetch every catalog row for `table`. Any driver failure, while issuing or
/// while reading, is a schema-load error for that table.
pub fn load<C: Connection>(conn: &mut C, table: &str) -> Result<Vec<CatalogColumn>> {
    let schema_err = |source: DriverError| MapperError::SchemaLoad {
        table: table.to_string(),
        source,
    };

    let args = [Param::from(table)];
    let mut cursor = conn.query(COLUMNS_QUERY, &args).map_err(schema_err)?;
    let mut columns = Vec::new();
    while let Some(row) = cursor.next_row().map_err(schema_err)? {
        columns.push(CatalogColumn::from_row(&row).map_err(schema_err)?);
    }
    Ok(columns)
}
