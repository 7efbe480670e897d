//! Catalog of known column types.
//!
//! Per-type constants live on `DataType` itself. Name lookup, alias lookup
//! and compound-name prefix matching go through the process-wide
//! `TypeRegistry`, built once on first use.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::debug;
use unicase::UniCase;

use crate::value::ValueClass;

/// Canonical type tags.
///
/// The variant name is the canonical spelling of the type, which is also what
/// variant branch ordering sorts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DataType {
    IntervalYear,
    IntervalQuarter,
    IntervalMonth,
    IntervalWeek,
    IntervalDay,
    IntervalHour,
    IntervalMinute,
    IntervalSecond,
    IntervalMillisecond,
    IntervalMicrosecond,
    IntervalNanosecond,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    Bool,
    Date,
    Date32,
    DateTime,
    DateTime32,
    DateTime64,
    Decimal,
    Decimal32,
    Decimal64,
    Decimal128,
    Decimal256,
    Enum,
    Enum8,
    Enum16,
    Float32,
    Float64,
    IPv4,
    IPv6,
    FixedString,
    String,
    JSON,
    Object,
    UUID,
    Point,
    Ring,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    Array,
    Map,
    Nested,
    Tuple,
    Variant,
    Dynamic,
    Nothing,
    AggregateFunction,
    SimpleAggregateFunction,
}

/// Static facts about a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: &'static str,
    /// Serialized width in bytes, 0 when variable.
    pub byte_length: u32,
    pub max_precision: u32,
    pub max_scale: u32,
}

impl TypeInfo {
    const fn new(name: &'static str, byte_length: u32, max_precision: u32, max_scale: u32) -> Self {
        TypeInfo {
            name,
            byte_length,
            max_precision,
            max_scale,
        }
    }
}

impl DataType {
    pub const ALL: &'static [DataType] = &[
        DataType::IntervalYear,
        DataType::IntervalQuarter,
        DataType::IntervalMonth,
        DataType::IntervalWeek,
        DataType::IntervalDay,
        DataType::IntervalHour,
        DataType::IntervalMinute,
        DataType::IntervalSecond,
        DataType::IntervalMillisecond,
        DataType::IntervalMicrosecond,
        DataType::IntervalNanosecond,
        DataType::UInt8,
        DataType::UInt16,
        DataType::UInt32,
        DataType::UInt64,
        DataType::UInt128,
        DataType::UInt256,
        DataType::Int8,
        DataType::Int16,
        DataType::Int32,
        DataType::Int64,
        DataType::Int128,
        DataType::Int256,
        DataType::Bool,
        DataType::Date,
        DataType::Date32,
        DataType::DateTime,
        DataType::DateTime32,
        DataType::DateTime64,
        DataType::Decimal,
        DataType::Decimal32,
        DataType::Decimal64,
        DataType::Decimal128,
        DataType::Decimal256,
        DataType::Enum,
        DataType::Enum8,
        DataType::Enum16,
        DataType::Float32,
        DataType::Float64,
        DataType::IPv4,
        DataType::IPv6,
        DataType::FixedString,
        DataType::String,
        DataType::JSON,
        DataType::Object,
        DataType::UUID,
        DataType::Point,
        DataType::Ring,
        DataType::LineString,
        DataType::MultiLineString,
        DataType::Polygon,
        DataType::MultiPolygon,
        DataType::Array,
        DataType::Map,
        DataType::Nested,
        DataType::Tuple,
        DataType::Variant,
        DataType::Dynamic,
        DataType::Nothing,
        DataType::AggregateFunction,
        DataType::SimpleAggregateFunction,
    ];

    pub const fn info(&self) -> TypeInfo {
        match self {
            Self::IntervalYear => TypeInfo::new("IntervalYear", 8, 19, 0),
            Self::IntervalQuarter => TypeInfo::new("IntervalQuarter", 8, 19, 0),
            Self::IntervalMonth => TypeInfo::new("IntervalMonth", 8, 19, 0),
            Self::IntervalWeek => TypeInfo::new("IntervalWeek", 8, 19, 0),
            Self::IntervalDay => TypeInfo::new("IntervalDay", 8, 19, 0),
            Self::IntervalHour => TypeInfo::new("IntervalHour", 8, 19, 0),
            Self::IntervalMinute => TypeInfo::new("IntervalMinute", 8, 19, 0),
            Self::IntervalSecond => TypeInfo::new("IntervalSecond", 8, 19, 0),
            Self::IntervalMillisecond => TypeInfo::new("IntervalMillisecond", 8, 19, 0),
            Self::IntervalMicrosecond => TypeInfo::new("IntervalMicrosecond", 8, 19, 0),
            Self::IntervalNanosecond => TypeInfo::new("IntervalNanosecond", 8, 19, 0),
            Self::UInt8 => TypeInfo::new("UInt8", 1, 3, 0),
            Self::UInt16 => TypeInfo::new("UInt16", 2, 5, 0),
            Self::UInt32 => TypeInfo::new("UInt32", 4, 10, 0),
            Self::UInt64 => TypeInfo::new("UInt64", 8, 20, 0),
            Self::UInt128 => TypeInfo::new("UInt128", 16, 39, 0),
            Self::UInt256 => TypeInfo::new("UInt256", 32, 78, 0),
            Self::Int8 => TypeInfo::new("Int8", 1, 4, 0),
            Self::Int16 => TypeInfo::new("Int16", 2, 6, 0),
            Self::Int32 => TypeInfo::new("Int32", 4, 11, 0),
            Self::Int64 => TypeInfo::new("Int64", 8, 20, 0),
            Self::Int128 => TypeInfo::new("Int128", 16, 40, 0),
            Self::Int256 => TypeInfo::new("Int256", 32, 78, 0),
            Self::Bool => TypeInfo::new("Bool", 1, 1, 0),
            Self::Date => TypeInfo::new("Date", 2, 10, 0),
            Self::Date32 => TypeInfo::new("Date32", 4, 10, 0),
            Self::DateTime => TypeInfo::new("DateTime", 4, 29, 9),
            Self::DateTime32 => TypeInfo::new("DateTime32", 4, 19, 0),
            Self::DateTime64 => TypeInfo::new("DateTime64", 8, 29, 9),
            Self::Decimal => TypeInfo::new("Decimal", 0, 76, 76),
            Self::Decimal32 => TypeInfo::new("Decimal32", 4, 9, 9),
            Self::Decimal64 => TypeInfo::new("Decimal64", 8, 18, 18),
            Self::Decimal128 => TypeInfo::new("Decimal128", 16, 38, 38),
            Self::Decimal256 => TypeInfo::new("Decimal256", 32, 76, 76),
            Self::Enum => TypeInfo::new("Enum", 1, 0, 0),
            Self::Enum8 => TypeInfo::new("Enum8", 1, 0, 0),
            Self::Enum16 => TypeInfo::new("Enum16", 2, 0, 0),
            Self::Float32 => TypeInfo::new("Float32", 4, 12, 38),
            Self::Float64 => TypeInfo::new("Float64", 8, 22, 308),
            Self::IPv4 => TypeInfo::new("IPv4", 4, 10, 0),
            Self::IPv6 => TypeInfo::new("IPv6", 16, 39, 0),
            Self::FixedString => TypeInfo::new("FixedString", 0, 0, 0),
            Self::String => TypeInfo::new("String", 0, 0, 0),
            Self::JSON => TypeInfo::new("JSON", 0, 0, 0),
            Self::Object => TypeInfo::new("Object", 0, 0, 0),
            Self::UUID => TypeInfo::new("UUID", 16, 69, 0),
            Self::Point => TypeInfo::new("Point", 16, 0, 0),
            Self::Ring => TypeInfo::new("Ring", 0, 0, 0),
            Self::LineString => TypeInfo::new("LineString", 0, 0, 0),
            Self::MultiLineString => TypeInfo::new("MultiLineString", 0, 0, 0),
            Self::Polygon => TypeInfo::new("Polygon", 0, 0, 0),
            Self::MultiPolygon => TypeInfo::new("MultiPolygon", 0, 0, 0),
            Self::Array => TypeInfo::new("Array", 0, 0, 0),
            Self::Map => TypeInfo::new("Map", 0, 0, 0),
            Self::Nested => TypeInfo::new("Nested", 0, 0, 0),
            Self::Tuple => TypeInfo::new("Tuple", 0, 0, 0),
            Self::Variant => TypeInfo::new("Variant", 0, 0, 0),
            Self::Dynamic => TypeInfo::new("Dynamic", 0, 0, 0),
            Self::Nothing => TypeInfo::new("Nothing", 0, 0, 0),
            Self::AggregateFunction => TypeInfo::new("AggregateFunction", 0, 0, 0),
            Self::SimpleAggregateFunction => TypeInfo::new("SimpleAggregateFunction", 0, 0, 0),
        }
    }

    /// Canonical spelling.
    pub const fn name(&self) -> &'static str {
        self.info().name
    }

    /// Canonical width in bytes, 0 signals variable length.
    pub const fn byte_length(&self) -> u32 {
        self.info().byte_length
    }

    pub const fn max_precision(&self) -> u32 {
        self.info().max_precision
    }

    pub const fn max_scale(&self) -> u32 {
        self.info().max_scale
    }

    /// Types holding nested descriptors.
    pub const fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Array
                | Self::Map
                | Self::Nested
                | Self::Tuple
                | Self::Object
                | Self::Variant
                | Self::AggregateFunction
                | Self::SimpleAggregateFunction
        )
    }

    /// Runtime value classes a column of this type can hold.
    ///
    /// Integer columns take any integer value and float columns any float
    /// value, range is checked on write. Empty for composite and exotic
    /// types, which never take part in class-based variant lookups.
    pub const fn value_classes(&self) -> &'static [ValueClass] {
        match self {
            Self::Bool => &[ValueClass::Boolean],
            Self::Int8
            | Self::Int16
            | Self::Int32
            | Self::Int64
            | Self::Int128
            | Self::Int256
            | Self::UInt8
            | Self::UInt16
            | Self::UInt32
            | Self::UInt64
            | Self::UInt128
            | Self::UInt256 => INTEGER_CLASSES,
            Self::Float32 | Self::Float64 => &[ValueClass::Float32, ValueClass::Float64],
            Self::Decimal
            | Self::Decimal32
            | Self::Decimal64
            | Self::Decimal128
            | Self::Decimal256 => &[ValueClass::Decimal],
            Self::String | Self::FixedString => &[ValueClass::Utf8, ValueClass::Binary],
            Self::JSON => &[ValueClass::Utf8],
            Self::Enum | Self::Enum8 => &[ValueClass::Utf8, ValueClass::Int8],
            Self::Enum16 => &[ValueClass::Utf8, ValueClass::Int16],
            Self::Date | Self::Date32 => &[ValueClass::Date],
            Self::DateTime | Self::DateTime32 | Self::DateTime64 => {
                &[ValueClass::Timestamp, ValueClass::TimestampTz]
            }
            Self::UUID => &[ValueClass::Uuid],
            Self::IPv4 => &[ValueClass::Ipv4],
            Self::IPv6 => &[ValueClass::Ipv6],
            _ => &[],
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

const INTEGER_CLASSES: &[ValueClass] = &[
    ValueClass::Int8,
    ValueClass::Int16,
    ValueClass::Int32,
    ValueClass::Int64,
    ValueClass::Int128,
    ValueClass::UInt8,
    ValueClass::UInt16,
    ValueClass::UInt32,
    ValueClass::UInt64,
    ValueClass::UInt128,
];

/// Alternate spellings, matched case-insensitively.
const ALIASES: &[(&str, DataType)] = &[
    ("BOOLEAN", DataType::Bool),
    ("INT1", DataType::Int8),
    ("BYTE", DataType::Int8),
    ("TINYINT", DataType::Int8),
    ("INT1 SIGNED", DataType::Int8),
    ("TINYINT SIGNED", DataType::Int8),
    ("INT1 UNSIGNED", DataType::UInt8),
    ("TINYINT UNSIGNED", DataType::UInt8),
    ("SMALLINT", DataType::Int16),
    ("SMALLINT SIGNED", DataType::Int16),
    ("SMALLINT UNSIGNED", DataType::UInt16),
    ("YEAR", DataType::UInt16),
    ("INT", DataType::Int32),
    ("INTEGER", DataType::Int32),
    ("MEDIUMINT", DataType::Int32),
    ("INT SIGNED", DataType::Int32),
    ("INTEGER SIGNED", DataType::Int32),
    ("MEDIUMINT SIGNED", DataType::Int32),
    ("INT UNSIGNED", DataType::UInt32),
    ("INTEGER UNSIGNED", DataType::UInt32),
    ("MEDIUMINT UNSIGNED", DataType::UInt32),
    ("BIGINT", DataType::Int64),
    ("SIGNED", DataType::Int64),
    ("BIGINT SIGNED", DataType::Int64),
    ("TIME", DataType::Int64),
    ("BIGINT UNSIGNED", DataType::UInt64),
    ("UNSIGNED", DataType::UInt64),
    ("BIT", DataType::UInt64),
    ("SET", DataType::UInt64),
    ("FLOAT", DataType::Float32),
    ("REAL", DataType::Float32),
    ("SINGLE", DataType::Float32),
    ("DOUBLE", DataType::Float64),
    ("DOUBLE PRECISION", DataType::Float64),
    ("DEC", DataType::Decimal),
    ("NUMERIC", DataType::Decimal),
    ("FIXED", DataType::Decimal),
    ("TIMESTAMP", DataType::DateTime),
    ("INET4", DataType::IPv4),
    ("INET6", DataType::IPv6),
    ("BINARY", DataType::FixedString),
    ("BINARY LARGE OBJECT", DataType::String),
    ("BINARY VARYING", DataType::String),
    ("BLOB", DataType::String),
    ("BYTEA", DataType::String),
    ("CHAR", DataType::String),
    ("CHAR LARGE OBJECT", DataType::String),
    ("CHAR VARYING", DataType::String),
    ("CHARACTER", DataType::String),
    ("CHARACTER LARGE OBJECT", DataType::String),
    ("CHARACTER VARYING", DataType::String),
    ("CLOB", DataType::String),
    ("LONGBLOB", DataType::String),
    ("LONGTEXT", DataType::String),
    ("MEDIUMBLOB", DataType::String),
    ("MEDIUMTEXT", DataType::String),
    ("NATIONAL CHAR", DataType::String),
    ("NATIONAL CHAR VARYING", DataType::String),
    ("NATIONAL CHARACTER", DataType::String),
    ("NATIONAL CHARACTER LARGE OBJECT", DataType::String),
    ("NATIONAL CHARACTER VARYING", DataType::String),
    ("NCHAR", DataType::String),
    ("NCHAR LARGE OBJECT", DataType::String),
    ("NCHAR VARYING", DataType::String),
    ("NVARCHAR", DataType::String),
    ("TEXT", DataType::String),
    ("TINYBLOB", DataType::String),
    ("TINYTEXT", DataType::String),
    ("VARBINARY", DataType::String),
    ("VARCHAR", DataType::String),
    ("VARCHAR2", DataType::String),
    ("JSON", DataType::JSON),
    ("ENUM", DataType::Enum),
];

/// Name lookup tables.
#[derive(Debug)]
pub struct TypeRegistry {
    canonical: HashMap<&'static str, DataType>,
    aliases: HashMap<UniCase<&'static str>, DataType>,
    /// Upper-cased canonical names and aliases, for compound name prefixes.
    upper_names: BTreeSet<String>,
}

static TYPE_REGISTRY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::build);

/// The process-wide registry.
pub fn registry() -> &'static TypeRegistry {
    &TYPE_REGISTRY
}

impl TypeRegistry {
    fn build() -> Self {
        let canonical: HashMap<_, _> = DataType::ALL.iter().map(|t| (t.name(), *t)).collect();
        let aliases: HashMap<_, _> = ALIASES
            .iter()
            .map(|(alias, t)| (UniCase::new(*alias), *t))
            .collect();

        let upper_names: BTreeSet<_> = DataType::ALL
            .iter()
            .map(|t| t.name().to_ascii_uppercase())
            .chain(ALIASES.iter().map(|(alias, _)| alias.to_ascii_uppercase()))
            .collect();

        debug!(
            canonical = canonical.len(),
            aliases = aliases.len(),
            "initialized type registry"
        );

        TypeRegistry {
            canonical,
            aliases,
            upper_names,
        }
    }

    /// Resolve a type name.
    ///
    /// Canonical names are case sensitive, aliases are not. Runs of
    /// whitespace inside compound names are treated as a single space.
    pub fn resolve(&self, name: &str) -> Option<DataType> {
        if let Some(t) = self.canonical.get(name) {
            return Some(*t);
        }
        if let Some(t) = self.aliases.get(&UniCase::new(name)) {
            return Some(*t);
        }
        if name.contains(char::is_whitespace) {
            let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
            return self.aliases.get(&UniCase::new(normalized.as_str())).copied();
        }
        None
    }

    /// Check whether `"<accumulated> <token>"` could still become a known
    /// type name, i.e. it's a known name or a whole-word prefix of one.
    ///
    /// Comparison is case-insensitive. An empty `accumulated` never matches.
    pub fn may_start_with(&self, accumulated: &str, token: &str) -> bool {
        if accumulated.is_empty() {
            return false;
        }

        let mut prefix = accumulated.to_ascii_uppercase();
        prefix.push(' ');
        prefix.push_str(&token.to_ascii_uppercase());

        self.upper_names
            .range(prefix.clone()..)
            .take_while(|name| name.starts_with(prefix.as_str()))
            .any(|name| name.len() == prefix.len() || name.as_bytes()[prefix.len()] == b' ')
    }
}

/// Assign variant ordinals to a list of branch types.
///
/// Branches are ordered by canonical name (byte-wise, so case sensitive) and
/// numbered from zero. Equal names keep their relative order. The returned
/// vector is indexed like `branches`.
pub fn assign_ordinals(branches: &[DataType]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..branches.len()).collect();
    order.sort_by(|a, b| branches[*a].name().cmp(branches[*b].name()));

    let mut ordinals = vec![0; branches.len()];
    for (ordinal, idx) in order.into_iter().enumerate() {
        ordinals[idx] = ordinal;
    }
    ordinals
}

/// Build the value class to ordinal map for a list of variant branch types.
///
/// When two branches accept the same class, the one with the higher ordinal
/// wins.
pub fn build_variant_mapping(branches: &[DataType]) -> BTreeMap<ValueClass, usize> {
    let ordinals = assign_ordinals(branches);
    let mut by_ordinal: Vec<(usize, DataType)> = ordinals.into_iter().zip(branches.iter().copied()).collect();
    by_ordinal.sort_by_key(|(ordinal, _)| *ordinal);

    let mut mapping = BTreeMap::new();
    for (ordinal, datatype) in by_ordinal {
        for class in datatype.value_classes() {
            mapping.insert(*class, ordinal);
        }
    }
    mapping
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn all_names_resolve_to_themselves() {
        for datatype in DataType::ALL {
            assert_eq!(Some(*datatype), registry().resolve(datatype.name()), "{datatype}");
            assert_eq!(datatype.name(), datatype.to_string());
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        let reg = registry();
        assert_eq!(Some(DataType::Float64), reg.resolve("double precision"));
        assert_eq!(Some(DataType::UInt64), reg.resolve("BIGINT UNSIGNED"));
        assert_eq!(Some(DataType::String), reg.resolve("VarChar"));
        assert_eq!(Some(DataType::Bool), reg.resolve("boolean"));
        assert_eq!(Some(DataType::Float64), reg.resolve("DOUBLE   PRECISION"));
    }

    #[test]
    fn canonical_names_are_case_sensitive() {
        assert_eq!(None, registry().resolve("uint8"));
        assert_eq!(None, registry().resolve("Nope"));
    }

    #[test]
    fn compound_prefixes() {
        let reg = registry();
        assert!(reg.may_start_with("DOUBLE", "PRECISION"));
        assert!(reg.may_start_with("national", "character"));
        assert!(reg.may_start_with("NATIONAL CHARACTER", "VARYING"));
        assert!(reg.may_start_with("bigint", "unsigned"));

        assert!(!reg.may_start_with("a", "UInt8"));
        assert!(!reg.may_start_with("DOUBLE", "PREC"));
        assert!(!reg.may_start_with("", "PRECISION"));
        assert!(!reg.may_start_with("double", "Float64"));
    }

    #[test]
    fn ordinals_sorted_by_name() {
        let ordinals = assign_ordinals(&[DataType::UInt8, DataType::String]);
        assert_eq!(vec![1, 0], ordinals);

        let ordinals = assign_ordinals(&[DataType::Int32, DataType::Array, DataType::Date, DataType::Array]);
        assert_eq!(vec![3, 0, 2, 1], ordinals);
    }

    #[test]
    fn variant_mapping_later_branch_wins() {
        let mapping = build_variant_mapping(&[DataType::String, DataType::FixedString, DataType::UInt8]);
        // FixedString(0) < String(1) < UInt8(2)
        assert_eq!(Some(&1), mapping.get(&ValueClass::Utf8));
        assert_eq!(Some(&1), mapping.get(&ValueClass::Binary));
        assert_eq!(Some(&2), mapping.get(&ValueClass::UInt8));
        assert_eq!(Some(&2), mapping.get(&ValueClass::Int64));
        assert_eq!(None, mapping.get(&ValueClass::Float64));
    }

    #[test]
    fn numeric_types_take_related_classes() {
        for datatype in [DataType::UInt8, DataType::Int32, DataType::UInt256] {
            let classes = datatype.value_classes();
            assert!(classes.contains(&ValueClass::Int64), "{datatype}");
            assert!(classes.contains(&ValueClass::UInt16), "{datatype}");
            assert!(!classes.contains(&ValueClass::Float64), "{datatype}");
        }
        assert!(DataType::Float32.value_classes().contains(&ValueClass::Float64));
        assert!(!DataType::Float64.value_classes().contains(&ValueClass::Int32));
    }

    #[test]
    fn composite_types_have_no_classes() {
        for datatype in DataType::ALL.iter().filter(|t| t.is_composite()) {
            assert!(datatype.value_classes().is_empty(), "{datatype}");
        }
    }
}
