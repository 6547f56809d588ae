// Module declarations
pub mod error;
pub mod column_type;
pub mod value;
pub mod param;
pub mod record;

// Re-exports for convenience
pub use error::{DriverError, MapperError, Result};
pub use column_type::ColumnType;
pub use value::Value;
pub use param::Param;
pub use record::Record;
