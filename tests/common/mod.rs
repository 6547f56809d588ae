// Scripted in-memory connection shared by the integration tests.
//
// Catalog queries are answered from `State::catalog`; every other query pops
// the next entry of `State::results`. Everything issued is logged, and open
// cursors are counted so tests can see that each one was released.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use pgmapper::registry::COLUMNS_QUERY;
use pgmapper::{Connection, DriverError, Param, RowCursor, ScanRow};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Bool(bool),
    Time(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRow(pub Vec<Option<Cell>>);

impl MockRow {
    /// What a server would hand back for a row written with these params.
    pub fn from_params(params: &[Param]) -> Self {
        Self(
            params
                .iter()
                .map(|p| match p {
                    Param::Null => None,
                    Param::Text(s) => Some(Cell::Text(s.clone())),
                    Param::Int(i) => Some(Cell::Int(*i)),
                    Param::Bool(b) => Some(Cell::Bool(*b)),
                    Param::Timestamp(t) => Some(Cell::Time(*t)),
                })
                .collect(),
        )
    }

    fn cell(&self, idx: usize) -> Result<Option<&Cell>, DriverError> {
        self.0
            .get(idx)
            .map(Option::as_ref)
            .ok_or_else(|| format!("column index {idx} out of range").into())
    }
}

impl ScanRow for MockRow {
    fn width(&self) -> usize {
        self.0.len()
    }

    fn text(&self, idx: usize) -> Result<Option<String>, DriverError> {
        match self.cell(idx)? {
            None => Ok(None),
            Some(Cell::Text(s)) => Ok(Some(s.clone())),
            Some(other) => Err(format!("cannot read {other:?} as text").into()),
        }
    }

    fn int(&self, idx: usize) -> Result<Option<i64>, DriverError> {
        match self.cell(idx)? {
            None => Ok(None),
            Some(Cell::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(format!("cannot read {other:?} as integer").into()),
        }
    }

    fn boolean(&self, idx: usize) -> Result<Option<bool>, DriverError> {
        match self.cell(idx)? {
            None => Ok(None),
            Some(Cell::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(format!("cannot read {other:?} as boolean").into()),
        }
    }

    fn timestamp(&self, idx: usize) -> Result<Option<DateTime<Utc>>, DriverError> {
        match self.cell(idx)? {
            None => Ok(None),
            Some(Cell::Time(t)) => Ok(Some(*t)),
            Some(other) => Err(format!("cannot read {other:?} as timestamp").into()),
        }
    }
}

/// Result of one scripted query: `Err` fails while issuing; inner `Err`
/// entries fail while advancing the cursor.
pub type Script = Result<Vec<Result<MockRow, String>>, String>;

#[derive(Default)]
pub struct State {
    pub catalog: HashMap<String, Vec<(String, String, String)>>,
    pub catalog_error: Option<String>,
    pub results: VecDeque<Script>,
    pub execute_error: Option<String>,
    pub queries: Vec<(String, Vec<Param>)>,
    pub executed: Vec<(String, Vec<Param>)>,
    pub open_cursors: usize,
    pub released_cursors: usize,
}

#[derive(Clone, Default)]
pub struct MockConnection {
    pub state: Arc<Mutex<State>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, table: &str, columns: &[(&str, &str, &str)]) -> Self {
        self.state.lock().catalog.insert(
            table.to_string(),
            columns
                .iter()
                .map(|(c, t, n)| ((*c).to_string(), (*t).to_string(), (*n).to_string()))
                .collect(),
        );
        self
    }

    pub fn push_rows(&self, rows: Vec<MockRow>) {
        self.state.lock().results.push_back(Ok(rows.into_iter().map(Ok).collect()));
    }

    pub fn push_script(&self, script: Script) {
        self.state.lock().results.push_back(script);
    }

    pub fn query_count(&self) -> usize {
        self.state.lock().queries.len()
    }

    pub fn last_query(&self) -> Option<(String, Vec<Param>)> {
        self.state.lock().queries.last().cloned()
    }

    pub fn executed(&self) -> Vec<(String, Vec<Param>)> {
        self.state.lock().executed.clone()
    }

    pub fn open_cursors(&self) -> usize {
        self.state.lock().open_cursors
    }

    pub fn released_cursors(&self) -> usize {
        self.state.lock().released_cursors
    }
}

pub struct MockCursor {
    rows: VecDeque<Result<MockRow, String>>,
    state: Arc<Mutex<State>>,
}

impl RowCursor for MockCursor {
    type Row = MockRow;

    fn next_row(&mut self) -> Result<Option<MockRow>, DriverError> {
        match self.rows.pop_front() {
            None => Ok(None),
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(e.into()),
        }
    }
}

impl Drop for MockCursor {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.open_cursors -= 1;
        state.released_cursors += 1;
    }
}

impl Connection for MockConnection {
    type Cursor<'a> = MockCursor;

    fn query<'a>(&'a mut self, sql: &str, args: &[Param]) -> Result<MockCursor, DriverError> {
        let mut state = self.state.lock();
        state.queries.push((sql.to_string(), args.to_vec()));

        let rows: VecDeque<Result<MockRow, String>> = if sql == COLUMNS_QUERY {
            if let Some(err) = state.catalog_error.clone() {
                return Err(err.into());
            }
            let Some(Param::Text(table)) = args.first() else {
                return Err("catalog query without a table name".into());
            };
            state
                .catalog
                .get(table)
                .map(|columns| {
                    columns
                        .iter()
                        .map(|(c, t, n)| {
                            Ok(MockRow(vec![
                                Some(Cell::Text(c.clone())),
                                Some(Cell::Text(t.clone())),
                                Some(Cell::Text(n.clone())),
                            ]))
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else {
            match state.results.pop_front() {
                Some(Ok(rows)) => rows.into(),
                Some(Err(e)) => return Err(e.into()),
                None => VecDeque::new(),
            }
        };

        state.open_cursors += 1;
        Ok(MockCursor {
            rows,
            state: Arc::clone(&self.state),
        })
    }

    fn execute(&mut self, sql: &str, args: &[Param]) -> Result<u64, DriverError> {
        let mut state = self.state.lock();
        state.executed.push((sql.to_string(), args.to_vec()));
        match state.execute_error.clone() {
            Some(err) => Err(err.into()),
            None => Ok(1),
        }
    }
}

/// Catalog rows for the `t_users` fixture table.
pub const T_USERS: &[(&str, &str, &str)] = &[
    ("id", "character varying", "NO"),
    ("email", "character varying", "YES"),
    ("age", "integer", "NO"),
    ("active", "boolean", "NO"),
    ("email_verified", "boolean", "YES"),
    ("no_of_licenses", "integer", "YES"),
    ("last_payment_at", "timestamp with time zone", "YES"),
    ("created_at", "timestamp with time zone", "NO"),
];

pub const T_ROLES: &[(&str, &str, &str)] = &[
    ("id", "character varying", "NO"),
    ("name", "character varying", "NO"),
    ("required_karma", "integer", "NO"),
];

pub const T_USER_ROLES: &[(&str, &str, &str)] = &[
    ("id", "character varying", "NO"),
    ("user_id", "character varying", "NO"),
    ("role_id", "character varying", "NO"),
];

pub const T_USERS_FIELDS: [&str; 8] = [
    "t_users.id",
    "t_users.email",
    "t_users.age",
    "t_users.active",
    "t_users.email_verified",
    "t_users.no_of_licenses",
    "t_users.last_payment_at",
    "t_users.created_at",
];

/// 2014-06-18 09:00:00 at +08:00.
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 6, 18, 1, 0, 0).unwrap()
}

pub fn fixture() -> MockConnection {
    MockConnection::new()
        .with_table("t_users", T_USERS)
        .with_table("t_roles", T_ROLES)
        .with_table("t_user_roles", T_USER_ROLES)
}
