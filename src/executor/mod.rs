/// Statement execution and row materialization
///
/// `Mapper` owns the connection handle and shares a `Registry`. SELECTs are
/// decoded into `Record`s using the registered column types; every other
/// statement kind returns no records.
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error};

use crate::builder::{Statement, StatementKind};
use crate::config::MapperConfig;
use crate::connection::{self, Connection, RowCursor};
use crate::core::{ColumnType, DriverError, MapperError, Record, Result};
use crate::registry::Registry;

pub mod decode;

pub use decode::decode_row;

const INIT_RESULTS_COUNT: usize = 10;

pub struct Mapper<C: Connection> {
    conn: Mutex<C>,
    registry: Arc<Registry>,
}

impl<C: Connection> Mapper<C> {
    /// Wrap a connection with a fresh, empty registry.
    pub fn new(conn: C) -> Self {
        Self::with_registry(conn, Arc::new(Registry::new()))
    }

    /// Wrap a connection sharing an existing registry.
    pub fn with_registry(conn: C, registry: Arc<Registry>) -> Self {
        Self {
            conn: Mutex::new(conn),
            registry,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn register(&self, table: &str) -> Result<usize> {
        let mut conn = self.conn.lock();
        self.registry.register(&mut *conn, table)
    }

    pub fn register_all<I, S>(&self, tables: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut conn = self.conn.lock();
        self.registry.register_all(&mut *conn, tables)
    }

    /// Run a statement. SELECT returns its decoded rows in arrival order;
    /// every other kind returns an empty vec on success.
    ///
    /// Malformed statements and unregistered select fields are rejected
    /// before anything is sent. A failure while decoding any row discards
    /// the rows decoded so far.
    pub fn exec(&self, stmt: &Statement) -> Result<Vec<Record>> {
        stmt.check()?;

        if stmt.kind() != StatementKind::Select {
            self.exec_command(stmt)?;
            return Ok(Vec::new());
        }

        let types = self.registry.resolve(stmt.selected_fields()).inspect_err(|e| {
            error!(target: "pgmapper::exec", "{e}; query=\"{}\"", stmt.sql());
        })?;
        self.fetch(stmt, &types)
    }

    fn exec_command(&self, stmt: &Statement) -> Result<u64> {
        debug!(target: "pgmapper::exec", "{}: {} ({} arg(s))", stmt.kind(), stmt.sql(), stmt.args().len());
        let affected = self
            .conn
            .lock()
            .execute(stmt.sql(), stmt.args())
            .map_err(|source| query_error(stmt, source))?;
        debug!(target: "pgmapper::exec", "{}: {affected} row(s) affected", stmt.kind());
        Ok(affected)
    }

    fn fetch(&self, stmt: &Statement, types: &[ColumnType]) -> Result<Vec<Record>> {
        debug!(target: "pgmapper::exec", "SELECT: {} ({} arg(s))", stmt.sql(), stmt.args().len());
        let fields = stmt.selected_fields();

        let mut conn = self.conn.lock();
        let mut cursor = conn
            .query(stmt.sql(), stmt.args())
            .map_err(|source| query_error(stmt, source))?;

        let mut records = Vec::with_capacity(INIT_RESULTS_COUNT);
        while let Some(row) = cursor.next_row().map_err(|source| query_error(stmt, source))? {
            let record = decode_row(&row, records.len(), fields, types).inspect_err(|e| {
                error!(target: "pgmapper::exec", "{e}; query=\"{}\"", stmt.sql());
            })?;
            records.push(record);
        }

        debug!(target: "pgmapper::exec", "SELECT: {} record(s)", records.len());
        Ok(records)
    }
}

fn query_error(stmt: &Statement, source: DriverError) -> MapperError {
    let err = MapperError::QueryExecution {
        sql: stmt.sql().to_string(),
        source,
    };
    error!(target: "pgmapper::exec", "{err}");
    err
}

/// Mapper over a blocking `postgres::Client`.
pub type PgMapper = Mapper<postgres::Client>;

impl PgMapper {
    /// Connect with `config.url` and register `config.tables`.
    pub fn connect(config: &MapperConfig) -> Result<Self> {
        let client = connection::connect(&config.url)?;
        let mapper = Self::new(client);
        if !config.tables.is_empty() {
            mapper.register_all(&config.tables)?;
        }
        Ok(mapper)
    }
}
