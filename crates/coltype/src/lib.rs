//! Parsing of column type declarations into descriptors.
//!
//! ```
//! let column = coltype::parse_column("amount", "Nullable(Decimal(38, 10))").unwrap();
//! assert!(column.is_nullable());
//! assert_eq!((38, 10), (column.precision(), column.scale()));
//! ```
pub mod config;
pub mod descriptor;
pub mod enums;
pub mod parser;
pub mod registry;
pub mod scanner;
pub mod value;
pub mod variant;

mod finalize;

pub use config::ParserConfig;
pub use descriptor::{assign_positions, ColumnDescriptor, DefaultValueKind};
pub use parser::TypeParser;
pub use registry::{registry, DataType};
pub use value::{ArrayValue, ScalarValue, Value, ValueClass};
pub use variant::NOT_FOUND_ORDINAL;

use coltype_error::Result;

/// Parse the type of a single column with the default parser config.
pub fn parse_column(name: &str, type_text: &str) -> Result<ColumnDescriptor> {
    TypeParser::new().parse_column(name, type_text)
}

/// Parse a `name type, ...` schema with the default parser config.
pub fn parse_schema(text: &str) -> Result<Vec<ColumnDescriptor>> {
    TypeParser::new().parse_schema(text)
}
