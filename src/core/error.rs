use thiserror::Error;

/// Boxed error coming from the database driver (or a test double).
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("cannot load schema for table '{table}', error= {source}")]
    SchemaLoad {
        table: String,
        #[source]
        source: DriverError,
    },
    #[error(
        "invalid sql data type, got \"{0}\", expected one of (\"character varying\", \"text\", \"inet\", \"integer\", \"boolean\", \"timestamp with time zone\", \"timestamp without time zone\")"
    )]
    InvalidDataType(String),
    #[error("invalid value for nullable, got \"{0}\", expected one of (\"YES\", \"NO\")")]
    InvalidNullable(String),
    #[error("malformed statement: {0}")]
    MalformedStatement(String),
    #[error("query \"{sql}\" failed to run, err={source}")]
    QueryExecution {
        sql: String,
        #[source]
        source: DriverError,
    },
    #[error("scanning row {row} failed at field '{field}', err={message}")]
    RowScan {
        row: usize,
        field: String,
        message: String,
    },
    #[error("unknown column type for field '{0}' (table not registered?)")]
    UnknownColumnType(String),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("cannot connect to database: {0}")]
    Connect(String),
}

pub type Result<T> = std::result::Result<T, MapperError>;
