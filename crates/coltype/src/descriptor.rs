//! Parsed column type descriptors.
use std::fmt;

use serde::Serialize;

use crate::enums::EnumConstants;
use crate::registry::DataType;
use crate::scanner::is_identifier_byte;
use crate::value::Value;
use crate::variant::{VariantOrdinals, NOT_FOUND_ORDINAL};

/// How a column's default value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DefaultValueKind {
    Default,
    Materialized,
    Ephemeral,
    Alias,
}

impl DefaultValueKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "DEFAULT" => Some(Self::Default),
            "MATERIALIZED" => Some(Self::Materialized),
            "EPHEMERAL" => Some(Self::Ephemeral),
            "ALIAS" => Some(Self::Alias),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Materialized => "MATERIALIZED",
            Self::Ephemeral => "EPHEMERAL",
            Self::Alias => "ALIAS",
        }
    }
}

/// One parsed type occurrence, including all nested types.
///
/// Built and finalized by the parser, immutable afterwards apart from the
/// low cardinality override, default value and position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnDescriptor {
    pub(crate) name: String,
    pub(crate) data_type: DataType,
    /// Exact declaration text this descriptor was parsed from.
    pub(crate) original_text: String,
    pub(crate) nullable: bool,
    pub(crate) low_cardinality: bool,
    pub(crate) low_cardinality_disabled: bool,
    pub(crate) precision: u32,
    pub(crate) scale: u32,
    pub(crate) time_zone: Option<String>,
    pub(crate) parameters: Vec<String>,
    pub(crate) nested: Vec<ColumnDescriptor>,
    pub(crate) array_level: u8,
    #[serde(skip)]
    pub(crate) array_base: Option<Box<ColumnDescriptor>>,
    pub(crate) fixed_byte_length: bool,
    pub(crate) estimated_byte_length: u32,
    pub(crate) enum_constants: EnumConstants,
    pub(crate) position_index: usize,
    pub(crate) position_count: usize,
    #[serde(skip_serializing_if = "VariantOrdinals::is_empty")]
    pub(crate) variant: VariantOrdinals,
    pub(crate) has_default: bool,
    pub(crate) default_value: Option<DefaultValueKind>,
    pub(crate) default_expression: Option<String>,
}

impl ColumnDescriptor {
    /// Column name, empty for anonymous nested types.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the column is declared low cardinality and hasn't been
    /// overridden with `disable_low_cardinality`.
    pub fn is_low_cardinality(&self) -> bool {
        self.low_cardinality && !self.low_cardinality_disabled
    }

    pub fn is_low_cardinality_disabled(&self) -> bool {
        self.low_cardinality_disabled
    }

    pub fn disable_low_cardinality(&mut self) {
        self.low_cardinality_disabled = true;
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn time_zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn nested(&self) -> &[ColumnDescriptor] {
        &self.nested
    }

    pub fn has_nested(&self) -> bool {
        !self.nested.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.data_type == DataType::Array
    }

    pub fn is_map(&self) -> bool {
        self.data_type == DataType::Map
    }

    pub fn is_tuple(&self) -> bool {
        self.data_type == DataType::Tuple
    }

    pub fn is_nested(&self) -> bool {
        self.data_type == DataType::Nested
    }

    pub fn is_variant(&self) -> bool {
        self.data_type == DataType::Variant
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.data_type, DataType::Enum | DataType::Enum8 | DataType::Enum16)
    }

    pub fn is_aggregate_function(&self) -> bool {
        matches!(
            self.data_type,
            DataType::AggregateFunction | DataType::SimpleAggregateFunction
        )
    }

    /// Key type of a Map column.
    pub fn key_descriptor(&self) -> Option<&ColumnDescriptor> {
        if self.is_map() {
            self.nested.first()
        } else {
            None
        }
    }

    /// Value type of a Map column.
    pub fn value_descriptor(&self) -> Option<&ColumnDescriptor> {
        if self.is_map() {
            self.nested.get(1)
        } else {
            None
        }
    }

    /// Function call text of an aggregate function column, e.g.
    /// `quantiles(0.5, 0.9)`.
    pub fn function(&self) -> Option<&str> {
        if self.is_aggregate_function() {
            self.parameters.first().map(String::as_str)
        } else {
            None
        }
    }

    pub fn enum_constants(&self) -> &EnumConstants {
        &self.enum_constants
    }

    /// Number of directly nested Array levels, 0 for non arrays.
    pub fn array_nesting_level(&self) -> u8 {
        self.array_level
    }

    /// Innermost non-array element type of an Array column.
    pub fn array_base_descriptor(&self) -> Option<&ColumnDescriptor> {
        self.array_base.as_deref()
    }

    pub fn is_fixed_length(&self) -> bool {
        self.fixed_byte_length
    }

    pub fn estimated_byte_length(&self) -> u32 {
        self.estimated_byte_length
    }

    pub fn position_index(&self) -> usize {
        self.position_index
    }

    pub fn position_count(&self) -> usize {
        self.position_count
    }

    pub fn is_first_column(&self) -> bool {
        self.position_index == 0
    }

    pub fn is_last_column(&self) -> bool {
        self.position_index + 1 == self.position_count
    }

    /// Set the position of this column within its schema.
    ///
    /// The count is at least 1 and the index is clamped into `0..count`.
    pub fn set_position(&mut self, index: usize, count: usize) {
        let count = count.max(1);
        self.position_count = count;
        self.position_index = index.min(count - 1);
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn default_value(&self) -> Option<DefaultValueKind> {
        self.default_value
    }

    pub fn default_expression(&self) -> Option<&str> {
        self.default_expression.as_deref()
    }

    /// Attach a default value clause.
    pub fn set_default_value(&mut self, kind: DefaultValueKind, expression: Option<String>) {
        self.has_default = true;
        self.default_value = Some(kind);
        self.default_expression = expression;
    }

    pub fn clear_default_value(&mut self) {
        self.has_default = false;
        self.default_value = None;
        self.default_expression = None;
    }

    pub fn variant_ordinals(&self) -> &VariantOrdinals {
        &self.variant
    }

    /// Branch ordinal for a runtime value, None if no branch matches.
    pub fn variant_ordinal(&self, value: &Value) -> Option<usize> {
        self.variant.resolve(&self.nested, value)
    }

    /// Like `variant_ordinal`, returning -1 when no branch matches.
    pub fn variant_ordinal_num(&self, value: &Value) -> i32 {
        self.variant_ordinal(value)
            .and_then(|o| i32::try_from(o).ok())
            .unwrap_or(NOT_FOUND_ORDINAL)
    }

    /// Rebuild a normalized type declaration from the parsed tree.
    pub fn render_type(&self) -> String {
        let mut out = String::new();
        // Formatting into a string doesn't fail.
        let _ = self.write_type(&mut out);
        out
    }

    fn write_type(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let low_cardinality = self.is_low_cardinality();
        if low_cardinality {
            out.write_str("LowCardinality(")?;
        }
        if self.nullable {
            out.write_str("Nullable(")?;
        }

        out.write_str(self.data_type.name())?;
        match self.data_type {
            DataType::Array | DataType::Map | DataType::Variant => {
                out.write_char('(')?;
                for (idx, child) in self.nested.iter().enumerate() {
                    if idx > 0 {
                        out.write_str(", ")?;
                    }
                    child.write_type(out)?;
                }
                out.write_char(')')?;
            }
            DataType::Tuple | DataType::Nested | DataType::Object => {
                out.write_char('(')?;
                for (idx, child) in self.nested.iter().enumerate() {
                    if idx > 0 {
                        out.write_str(", ")?;
                    }
                    if !child.name.is_empty() {
                        write_name(out, &child.name)?;
                        out.write_char(' ')?;
                    }
                    child.write_type(out)?;
                }
                out.write_char(')')?;
            }
            _ if !self.parameters.is_empty() => {
                write!(out, "({})", self.parameters.join(", "))?;
            }
            _ => (),
        }

        if self.nullable {
            out.write_char(')')?;
        }
        if low_cardinality {
            out.write_char(')')?;
        }
        Ok(())
    }
}

fn write_name(out: &mut impl fmt::Write, name: &str) -> fmt::Result {
    if name.bytes().all(is_identifier_byte) {
        return out.write_str(name);
    }
    out.write_char('`')?;
    for ch in name.chars() {
        if ch == '`' || ch == '\\' {
            out.write_char('\\')?;
        }
        out.write_char(ch)?;
    }
    out.write_char('`')
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "column{} {}", self.position_index, self.original_text)
        } else {
            write!(f, "{} {}", self.name, self.original_text)
        }
    }
}

/// Number the columns of a schema in order.
pub fn assign_positions(columns: &mut [ColumnDescriptor]) {
    let count = columns.len();
    for (idx, column) in columns.iter_mut().enumerate() {
        column.set_position(idx, count);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parse_column;

    #[test]
    fn positions_are_clamped() {
        let mut column = parse_column("c", "UInt8").unwrap();
        assert_eq!((0, 1), (column.position_index(), column.position_count()));

        column.set_position(5, 3);
        assert_eq!((2, 3), (column.position_index(), column.position_count()));
        assert!(column.is_last_column());

        column.set_position(4, 0);
        assert_eq!((0, 1), (column.position_index(), column.position_count()));
        assert!(column.is_first_column());
        assert!(column.is_last_column());
    }

    #[test]
    fn display() {
        let column = parse_column("id", "Nullable(UInt64)").unwrap();
        assert_eq!("id Nullable(UInt64)", column.to_string());

        let mut column = parse_column("", "String").unwrap();
        column.set_position(2, 4);
        assert_eq!("column2 String", column.to_string());
    }

    #[test]
    fn low_cardinality_override() {
        let mut column = parse_column("c", "LowCardinality(String)").unwrap();
        assert!(column.is_low_cardinality());
        column.disable_low_cardinality();
        assert!(!column.is_low_cardinality());
        assert!(column.is_low_cardinality_disabled());
        assert_eq!("String", column.render_type());
    }

    #[test]
    fn default_values() {
        let mut column = parse_column("c", "UInt8").unwrap();
        assert!(!column.has_default());

        column.set_default_value(DefaultValueKind::Materialized, Some("a + 1".to_string()));
        assert!(column.has_default());
        assert_eq!(Some(DefaultValueKind::Materialized), column.default_value());
        assert_eq!(Some("a + 1"), column.default_expression());

        column.clear_default_value();
        assert_eq!(None, column.default_value());
        assert_eq!(Some(DefaultValueKind::Alias), DefaultValueKind::from_keyword("alias"));
    }

    #[test]
    fn render_normalizes() {
        let cases = [
            ("LowCardinality(Nullable(String))", "LowCardinality(Nullable(String))"),
            ("Nullable(LowCardinality(String))", "LowCardinality(Nullable(String))"),
            ("Tuple(a UInt8,b Nullable(String))", "Tuple(a UInt8, b Nullable(String))"),
            ("Map(String,Array(Nullable(UInt8)))", "Map(String, Array(Nullable(UInt8)))"),
            ("Variant(UInt8, String)", "Variant(String, UInt8)"),
            ("Nested(`my col` UInt8)", "Nested(`my col` UInt8)"),
            ("Decimal(10,2)", "Decimal(10, 2)"),
            ("String NULL", "Nullable(String)"),
            ("BIGINT UNSIGNED", "UInt64"),
            ("AggregateFunction(sum, UInt64)", "AggregateFunction(sum, UInt64)"),
        ];
        for (text, expected) in cases {
            assert_eq!(expected, parse_column("c", text).unwrap().render_type(), "{text}");
        }
    }

    #[test]
    fn equality_is_structural() {
        let a = parse_column("c", "Array(UInt8)").unwrap();
        let b = parse_column("c", "Array(UInt8)").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, parse_column("c", "Array( UInt8 )").unwrap());
    }
}
