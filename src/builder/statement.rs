//! Chainable SQL statement builder
//!
//! A `Statement` accumulates SQL text, the bound arguments in positional
//! order and, for SELECT, the select list that drives row decoding.
//! Every method consumes and returns the statement so calls chain:
//!
//! ```
//! use pgmapper::{Statement, params};
//!
//! let stmt = Statement::update("t_roles", "name = ?, required_karma = ?", params!["Bug eagle", 1000])
//!     .filter("id = ?", params!["1r"]);
//! assert_eq!(stmt.sql(), "UPDATE t_roles SET name = $1, required_karma = $2 WHERE id = $3");
//! ```
//!
//! Misuse (marker/argument count mismatch, a second WHERE, clauses out of
//! order or on the wrong statement kind) does not panic: the first problem
//! is kept on the statement and reported by `check()`, which the executor
//! runs before touching the connection.
use std::fmt::{self, Write as _};

use super::placeholders;
use crate::connection::Connection;
use crate::core::{MapperError, Param, Record, Result};
use crate::executor::Mapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    BulkInsert,
    Update,
    Delete,
    Truncate,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::BulkInsert => "BULK INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
}

impl JoinKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Clauses that can follow a statement head, in the only order SQL accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Clause {
    Source,
    Where,
    OrderBy,
    Limit,
}

impl Clause {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Source => "FROM",
            Self::Where => "WHERE",
            Self::OrderBy => "ORDER BY",
            Self::Limit => "LIMIT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    text: String,
    args: Vec<Param>,
    selected_fields: Vec<String>,
    last_clause: Option<Clause>,
    error: Option<String>,
}

impl Statement {
    fn start(kind: StatementKind, text: String) -> Self {
        Self {
            kind,
            text,
            args: Vec::new(),
            selected_fields: Vec::new(),
            last_clause: None,
            error: None,
        }
    }

    /// Start a SELECT. The field order given here is the decode order.
    #[must_use]
    pub fn select<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let mut stmt = Self::start(StatementKind::Select, format!("SELECT {}", fields.join(", ")));
        if fields.is_empty() {
            stmt.fail("SELECT needs at least one field".to_string());
        }
        stmt.selected_fields = fields;
        stmt
    }

    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        if self.enter(Clause::Source) {
            let _ = write!(self.text, " FROM {table}");
        }
        self
    }

    /// Two-table join as the source: `FROM left <JOIN> right ON condition`.
    #[must_use]
    pub fn from_join(mut self, join: JoinKind, left: &str, right: &str, condition: &str) -> Self {
        if self.enter(Clause::Source) {
            let _ = write!(self.text, " FROM {left} {} {right} ON {condition}", join.keyword());
        }
        self
    }

    /// WHERE clause. Each `?` in `template` becomes the next `$N`, continuing
    /// after the arguments already bound (e.g. by `update`).
    #[must_use]
    pub fn filter(mut self, template: &str, args: Vec<Param>) -> Self {
        if !self.enter(Clause::Where) {
            return self;
        }
        match placeholders::number(template, self.args.len() + 1, args.len()) {
            Ok(condition) => {
                let _ = write!(self.text, " WHERE {condition}");
                self.args.extend(args);
            }
            Err(msg) => self.fail(msg),
        }
        self
    }

    #[must_use]
    pub fn order(mut self, field: &str, direction: Direction) -> Self {
        if self.enter(Clause::OrderBy) {
            let _ = write!(self.text, " ORDER BY {field} {}", direction.keyword());
        }
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        if self.enter(Clause::Limit) {
            let _ = write!(self.text, " LIMIT {limit}");
        }
        self
    }

    /// `INSERT INTO table (fields) VALUES ($1, ...)`; `fields` is a
    /// comma-separated list with one entry per argument.
    #[must_use]
    pub fn insert(table: &str, fields: &str, args: Vec<Param>) -> Self {
        let mut stmt = Self::start(
            StatementKind::Insert,
            format!(
                "INSERT INTO {table} ({fields}) VALUES ({})",
                placeholders::tuple(1, args.len())
            ),
        );
        let width = field_count(fields);
        if args.is_empty() {
            stmt.fail(format!("INSERT into {table} needs at least one value"));
        } else if width != args.len() {
            stmt.fail(format!(
                "INSERT into {table} lists {width} field(s) but {} argument(s) were given",
                args.len()
            ));
        }
        stmt.args = args;
        stmt
    }

    /// Multi-row insert: `VALUES ($1, $2), ($3, $4), ...`. Every row must be
    /// as wide as `fields`.
    #[must_use]
    pub fn bulk_insert(table: &str, fields: &str, rows: Vec<Vec<Param>>) -> Self {
        let width = field_count(fields);
        let tuples: Vec<String> = rows
            .iter()
            .scan(1, |next, row| {
                let start = *next;
                *next += row.len();
                Some(format!("({})", placeholders::tuple(start, row.len())))
            })
            .collect();
        let mut stmt = Self::start(
            StatementKind::BulkInsert,
            format!("INSERT INTO {table} ({fields}) VALUES {}", tuples.join(", ")),
        );

        if rows.is_empty() {
            stmt.fail(format!("bulk INSERT into {table} needs at least one row"));
        } else if width == 0 {
            stmt.fail(format!("bulk INSERT into {table} needs at least one field"));
        } else if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            stmt.fail(format!(
                "bulk INSERT into {table}: row {idx} has {} value(s), expected {width}",
                row.len()
            ));
        }
        stmt.args = rows.into_iter().flatten().collect();
        stmt
    }

    /// `UPDATE table SET <assignments>`; `assignments` is a template such as
    /// `"name = ?, age = ?"`, numbered from `$1`.
    #[must_use]
    pub fn update(table: &str, assignments: &str, args: Vec<Param>) -> Self {
        let mut stmt = Self::start(StatementKind::Update, String::new());
        stmt.last_clause = Some(Clause::Source);
        if assignments.trim().is_empty() {
            stmt.fail(format!("UPDATE {table} needs at least one assignment"));
        }
        match placeholders::number(assignments, 1, args.len()) {
            Ok(set) => stmt.text = format!("UPDATE {table} SET {set}"),
            Err(msg) => {
                stmt.text = format!("UPDATE {table} SET {assignments}");
                stmt.fail(msg);
            }
        }
        stmt.args = args;
        stmt
    }

    /// `DELETE FROM table`. Without `filter` this removes every row.
    #[must_use]
    pub fn delete(table: &str) -> Self {
        let mut stmt = Self::start(StatementKind::Delete, format!("DELETE FROM {table}"));
        stmt.last_clause = Some(Clause::Source);
        stmt
    }

    #[must_use]
    pub fn truncate<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tables: Vec<String> = tables.into_iter().map(|t| t.as_ref().to_string()).collect();
        let mut stmt = Self::start(StatementKind::Truncate, format!("TRUNCATE {}", tables.join(", ")));
        if tables.is_empty() {
            stmt.fail("TRUNCATE needs at least one table".to_string());
        }
        stmt
    }

    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn args(&self) -> &[Param] {
        &self.args
    }

    /// Select list in decode order; empty for everything but SELECT.
    #[must_use]
    pub fn selected_fields(&self) -> &[String] {
        &self.selected_fields
    }

    /// First construction problem, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn check(&self) -> Result<()> {
        match &self.error {
            Some(msg) => Err(MapperError::MalformedStatement(msg.clone())),
            None => Ok(()),
        }
    }

    /// Execute through `mapper`; same as `mapper.exec(&self)`.
    pub fn run<C: Connection>(&self, mapper: &Mapper<C>) -> Result<Vec<Record>> {
        mapper.exec(self)
    }

    /// Validate that `clause` may be appended now and record it.
    fn enter(&mut self, clause: Clause) -> bool {
        let keyword = clause.keyword();
        let allowed = match self.kind {
            StatementKind::Select => true,
            StatementKind::Update | StatementKind::Delete => clause == Clause::Where,
            StatementKind::Insert | StatementKind::BulkInsert | StatementKind::Truncate => false,
        };
        if !allowed {
            self.fail(format!("{keyword} is not valid on a {} statement", self.kind));
            return false;
        }

        match self.last_clause {
            None if clause != Clause::Source => {
                self.fail(format!("{keyword} requires a FROM clause first"));
                false
            }
            Some(last) if last == clause => {
                self.fail(format!("{keyword} clause already present"));
                false
            }
            Some(last) if last > clause => {
                self.fail(format!("{keyword} cannot follow {}", last.keyword()));
                false
            }
            _ => {
                self.last_clause = Some(clause);
                true
            }
        }
    }

    fn fail(&mut self, msg: String) {
        if self.error.is_none() {
            self.error = Some(msg);
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn field_count(fields: &str) -> usize {
    fields.split(',').filter(|f| !f.trim().is_empty()).count()
}
