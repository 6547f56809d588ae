/// Catalog-driven column type registry
///
/// Maps `"table.column"` to a `ColumnType`. Tables are added explicitly with
/// `register`, which introspects the catalog through a `Connection`.
///
/// Concurrency: registrations are serialized by a writer mutex held for the
/// whole catalog round trip, and a table's columns are published under one
/// write lock, so readers see either none or all of a table. Keys are never
/// overwritten once present.
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, error, warn};

use crate::connection::Connection;
use crate::core::{ColumnType, MapperError, Result};

pub mod catalog;

pub use catalog::{COLUMNS_QUERY, CatalogColumn};

const INIT_COLUMN_CAPACITY: usize = 15 * 30;

pub struct Registry {
    columns: RwLock<HashMap<String, ColumnType>>,
    writer: Mutex<()>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: RwLock::new(HashMap::with_capacity(INIT_COLUMN_CAPACITY)),
            writer: Mutex::new(()),
        }
    }

    /// Registry key for a column: table and column joined by a dot.
    #[must_use]
    pub fn key(table: &str, column: &str) -> String {
        format!("{table}.{column}")
    }

    /// Load `table`'s columns from the catalog and add them.
    ///
    /// All-or-nothing: if any catalog row cannot be read or mapped, nothing
    /// from this table is added. Returns the number of columns the catalog
    /// reported (0 if the table does not exist).
    pub fn register<C: Connection>(&self, conn: &mut C, table: &str) -> Result<usize> {
        let _writer = self.writer.lock();

        let catalog = catalog::load(conn, table)
            .inspect_err(|e| error!(target: "pgmapper::registry", "{e}"))?;
        if catalog.is_empty() {
            warn!(target: "pgmapper::registry", "no catalog columns for table '{table}'");
            return Ok(0);
        }

        let mut resolved = Vec::with_capacity(catalog.len());
        for column in &catalog {
            let ty = column.column_type().inspect_err(|e| {
                error!(target: "pgmapper::registry", "cannot load schema for {table}.{}: {e}", column.name);
            })?;
            resolved.push((Self::key(table, &column.name), ty));
        }

        let added = self.publish(resolved);
        debug!(
            target: "pgmapper::registry",
            "registered table '{table}': {} column(s), {added} new",
            catalog.len()
        );
        Ok(catalog.len())
    }

    /// Register several tables, stopping at the first failure.
    pub fn register_all<C, I, S>(&self, conn: &mut C, tables: I) -> Result<usize>
    where
        C: Connection,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut total = 0;
        for table in tables {
            total += self.register(conn, table.as_ref())?;
        }
        Ok(total)
    }

    /// Add one entry directly, for schemas known ahead of time. Returns false
    /// when the key was already registered (the existing type is kept).
    pub fn insert(&self, key: impl Into<String>, ty: ColumnType) -> bool {
        let _writer = self.writer.lock();
        self.publish(vec![(key.into(), ty)]) == 1
    }

    fn publish(&self, entries: Vec<(String, ColumnType)>) -> usize {
        let mut columns = self.columns.write();
        let mut added = 0;
        for (key, ty) in entries {
            match columns.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(ty);
                    added += 1;
                }
                Entry::Occupied(slot) if *slot.get() != ty => {
                    warn!(
                        target: "pgmapper::registry",
                        "'{}' already registered as {}, ignoring {ty}",
                        slot.key(),
                        slot.get()
                    );
                }
                Entry::Occupied(_) => {}
            }
        }
        added
    }

    #[must_use]
    pub fn column_type(&self, key: &str) -> Option<ColumnType> {
        self.columns.read().get(key).copied()
    }

    /// Types for a select list, in order. The first unregistered field is
    /// reported as `UnknownColumnType`.
    pub fn resolve(&self, fields: &[String]) -> Result<Vec<ColumnType>> {
        let columns = self.columns.read();
        fields
            .iter()
            .map(|field| {
                columns
                    .get(field)
                    .copied()
                    .ok_or_else(|| MapperError::UnknownColumnType(field.clone()))
            })
            .collect()
    }

    /// Registered columns of one table as `(column, type)`, sorted by name.
    #[must_use]
    pub fn columns_of(&self, table: &str) -> Vec<(String, ColumnType)> {
        let prefix = format!("{table}.");
        let mut out: Vec<(String, ColumnType)> = self
            .columns
            .read()
            .iter()
            .filter_map(|(key, ty)| key.strip_prefix(&prefix).map(|col| (col.to_string(), *ty)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.read().is_empty()
    }

    /// Drop every registration. Meant for test harnesses.
    pub fn clear(&self) {
        let _writer = self.writer.lock();
        self.columns.write().clear();
    }
}
