// Statement construction: SELECT/INSERT/UPDATE/DELETE/TRUNCATE text plus
// positional arguments. Pure string/state composition, no I/O.
pub mod placeholders;
pub mod statement;

pub use statement::{Direction, JoinKind, Statement, StatementKind};
