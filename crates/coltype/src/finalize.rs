//! Turning a raw parse node into a finished descriptor.
//!
//! Children are finalized before their parent, so everything derived from
//! nested descriptors (array base, widths, variant tables) can be read off
//! the already finished children.
use std::str::FromStr;

use coltype_error::{ColtypeError, Result};

use crate::descriptor::ColumnDescriptor;
use crate::enums::EnumConstants;
use crate::registry::DataType;
use crate::scanner;
use crate::variant::VariantOrdinals;

/// Array nesting level is stored in a byte.
pub const MAX_ARRAY_LEVEL: u8 = u8::MAX;

/// Output of the parser for one type occurrence, before derived properties
/// are computed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawColumn {
    pub name: String,
    pub data_type: DataType,
    pub original_text: String,
    pub nullable: bool,
    pub low_cardinality: bool,
    pub parameters: Vec<String>,
    pub nested: Vec<ColumnDescriptor>,
}

/// Properties derived per type.
#[derive(Debug)]
struct Derived {
    precision: u32,
    scale: u32,
    time_zone: Option<String>,
    array_level: u8,
    array_base: Option<Box<ColumnDescriptor>>,
    fixed: bool,
    width: u32,
    enum_constants: EnumConstants,
}

pub(crate) fn finalize(raw: RawColumn) -> Result<ColumnDescriptor> {
    let mut derived = Derived {
        precision: raw.data_type.max_precision(),
        scale: 0,
        time_zone: None,
        array_level: 0,
        array_base: None,
        fixed: raw.data_type.byte_length() != 0,
        width: raw.data_type.byte_length(),
        enum_constants: EnumConstants::empty(),
    };

    match raw.data_type {
        DataType::Array => finalize_array(&raw, &mut derived),
        DataType::Map | DataType::AggregateFunction | DataType::SimpleAggregateFunction => variable(&mut derived),
        DataType::String | DataType::JSON => text_floor(&raw, &mut derived),
        DataType::Tuple | DataType::Variant | DataType::Nested => sum_nested(&raw, &mut derived),
        DataType::Object => {
            sum_nested(&raw, &mut derived);
            derived.width += text_floor_width(&raw);
        }
        DataType::DateTime => finalize_datetime(&raw, &mut derived)?,
        DataType::DateTime32 => {
            derived.time_zone = time_zone_param(&raw, 0)?;
        }
        DataType::DateTime64 => finalize_datetime64(&raw, &mut derived)?,
        DataType::Decimal => finalize_decimal(&raw, &mut derived)?,
        DataType::Decimal32 | DataType::Decimal64 | DataType::Decimal128 | DataType::Decimal256 => {
            finalize_sized_decimal(&raw, &mut derived)?
        }
        DataType::FixedString => finalize_fixed_string(&raw, &mut derived)?,
        DataType::Enum | DataType::Enum8 | DataType::Enum16 => finalize_enum(&raw, &mut derived)?,
        _ => (),
    }

    if raw.nullable {
        derived.fixed = false;
        derived.width += 1;
    }

    let variant = VariantOrdinals::build(raw.data_type, &raw.nested);

    Ok(ColumnDescriptor {
        name: raw.name,
        data_type: raw.data_type,
        original_text: raw.original_text,
        nullable: raw.nullable,
        low_cardinality: raw.low_cardinality,
        low_cardinality_disabled: false,
        precision: derived.precision,
        scale: derived.scale,
        time_zone: derived.time_zone,
        parameters: raw.parameters,
        nested: raw.nested,
        array_level: derived.array_level,
        array_base: derived.array_base,
        fixed_byte_length: derived.fixed,
        estimated_byte_length: derived.width,
        enum_constants: derived.enum_constants,
        position_index: 0,
        position_count: 1,
        variant,
        has_default: false,
        default_value: None,
        default_expression: None,
    })
}

fn variable(derived: &mut Derived) {
    derived.fixed = false;
    derived.width = 1;
}

/// Text columns take at least a byte, unless the null marker already
/// accounts for it.
fn text_floor(raw: &RawColumn, derived: &mut Derived) {
    derived.fixed = false;
    derived.width = text_floor_width(raw);
}

fn text_floor_width(raw: &RawColumn) -> u32 {
    u32::from(!raw.nullable)
}

fn finalize_array(raw: &RawColumn, derived: &mut Derived) {
    variable(derived);

    let mut level = 1;
    let mut base = raw.nested.first();
    while level < MAX_ARRAY_LEVEL {
        match base {
            Some(b) if b.is_array() => {
                level += 1;
                base = b.nested.first();
            }
            _ => break,
        }
    }

    derived.array_level = level;
    derived.array_base = base.cloned().map(Box::new);
}

/// Composite widths add up. Fixed only when every child is fixed and the
/// type itself has a canonical width, which no composite has.
fn sum_nested(raw: &RawColumn, derived: &mut Derived) {
    derived.width = raw.nested.iter().map(|n| n.estimated_byte_length).sum();
    derived.fixed = derived.fixed && raw.nested.iter().all(|n| n.fixed_byte_length);
}

/// Plain `DateTime` takes its shape from the parameters: `DateTime('tz')`
/// is the 32-bit variant, `DateTime(scale, 'tz')` the 64-bit one.
fn finalize_datetime(raw: &RawColumn, derived: &mut Derived) -> Result<()> {
    match raw.parameters.len() {
        0 => {
            derived.precision = DataType::DateTime32.max_precision();
        }
        1 => {
            derived.precision = DataType::DateTime32.max_precision();
            derived.time_zone = time_zone_param(raw, 0)?;
        }
        _ => {
            derived.scale = datetime_scale(raw, 0)?;
            derived.time_zone = time_zone_param(raw, 1)?;
            derived.width = DataType::DateTime64.byte_length();
        }
    }
    Ok(())
}

fn finalize_datetime64(raw: &RawColumn, derived: &mut Derived) -> Result<()> {
    derived.scale = if raw.parameters.is_empty() {
        3
    } else {
        datetime_scale(raw, 0)?
    };
    derived.time_zone = time_zone_param(raw, 1)?;
    Ok(())
}

fn datetime_scale(raw: &RawColumn, idx: usize) -> Result<u32> {
    let scale: u32 = numeric_param(raw, idx, "scale")?;
    let max = DataType::DateTime64.max_scale();
    if scale > max {
        return Err(ColtypeError::invalid_definition(format!(
            "Scale {scale} of {} for column '{}' out of range, expected at most {max}",
            raw.data_type, raw.name
        )));
    }
    Ok(scale)
}

fn time_zone_param(raw: &RawColumn, idx: usize) -> Result<Option<String>> {
    match raw.parameters.get(idx) {
        Some(p) => Ok(Some(scanner::unquote(p)?)),
        None => Ok(None),
    }
}

fn finalize_decimal(raw: &RawColumn, derived: &mut Derived) -> Result<()> {
    let max = DataType::Decimal.max_precision();
    if !raw.parameters.is_empty() {
        derived.precision = numeric_param(raw, 0, "precision")?;
    }
    if raw.parameters.len() > 1 {
        derived.scale = numeric_param(raw, 1, "scale")?;
    }

    if derived.precision == 0 || derived.precision > max {
        return Err(ColtypeError::invalid_definition(format!(
            "Precision {} for column '{}' out of range, expected 1 to {max}",
            derived.precision, raw.name
        )));
    }
    if derived.scale > derived.precision {
        return Err(ColtypeError::invalid_definition(format!(
            "Scale {} for column '{}' exceeds precision {}",
            derived.scale, raw.name, derived.precision
        )));
    }

    // No canonical width, so only the estimate follows the storage tier.
    derived.width = decimal_width(derived.precision);
    Ok(())
}

/// Storage tier for a decimal precision.
fn decimal_width(precision: u32) -> u32 {
    if precision >= DataType::Decimal128.max_scale() {
        DataType::Decimal256.byte_length()
    } else if precision >= DataType::Decimal64.max_scale() {
        DataType::Decimal128.byte_length()
    } else if precision >= DataType::Decimal32.max_scale() {
        DataType::Decimal64.byte_length()
    } else {
        DataType::Decimal32.byte_length()
    }
}

fn finalize_sized_decimal(raw: &RawColumn, derived: &mut Derived) -> Result<()> {
    if raw.parameters.is_empty() {
        return Ok(());
    }
    let scale: u32 = numeric_param(raw, 0, "scale")?;
    let max = raw.data_type.max_scale();
    if scale > max {
        return Err(ColtypeError::invalid_definition(format!(
            "Scale {scale} of {} for column '{}' out of range, expected at most {max}",
            raw.data_type, raw.name
        )));
    }
    derived.scale = scale;
    Ok(())
}

fn finalize_fixed_string(raw: &RawColumn, derived: &mut Derived) -> Result<()> {
    if raw.parameters.is_empty() {
        return Err(ColtypeError::invalid_definition(format!(
            "Missing length for FixedString column '{}'",
            raw.name
        )));
    }
    let length: u32 = numeric_param(raw, 0, "length")?;
    if length == 0 {
        return Err(ColtypeError::invalid_definition(format!(
            "FixedString length for column '{}' must be positive",
            raw.name
        )));
    }

    derived.precision = length;
    derived.fixed = true;
    derived.width = length;
    Ok(())
}

fn finalize_enum(raw: &RawColumn, derived: &mut Derived) -> Result<()> {
    let constants = EnumConstants::from_parameters(&raw.parameters)
        .map_err(|e| ColtypeError::invalid_definition(format!("{} in column '{}'", e.get_msg(), raw.name)))?;

    if raw.data_type == DataType::Enum8 {
        if let Some((label, value)) = constants.iter().find(|(_, v)| i8::try_from(*v).is_err()) {
            return Err(ColtypeError::invalid_definition(format!(
                "Enum8 value {value} for '{label}' in column '{}' out of range",
                raw.name
            )));
        }
    }
    // Plain Enum picks its storage from the values.
    if raw.data_type == DataType::Enum && constants.iter().any(|(_, v)| i8::try_from(v).is_err()) {
        derived.width = DataType::Enum16.byte_length();
    }

    derived.enum_constants = constants;
    Ok(())
}

fn numeric_param<T: FromStr>(raw: &RawColumn, idx: usize, what: &str) -> Result<T> {
    let param = raw.parameters.get(idx).map(|p| p.trim()).unwrap_or_default();
    param.parse().map_err(|_| {
        ColtypeError::invalid_definition(format!(
            "Expected integer {what} for {} column '{}', found '{param}'",
            raw.data_type, raw.name
        ))
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn raw(data_type: DataType, params: &[&str]) -> RawColumn {
        RawColumn {
            name: "c".to_string(),
            data_type,
            original_text: String::new(),
            nullable: false,
            low_cardinality: false,
            parameters: params.iter().map(|p| p.to_string()).collect(),
            nested: Vec::new(),
        }
    }

    #[test]
    fn decimal_tiers() {
        assert_eq!(4, decimal_width(8));
        assert_eq!(8, decimal_width(9));
        assert_eq!(16, decimal_width(18));
        assert_eq!(16, decimal_width(37));
        assert_eq!(32, decimal_width(38));
        assert_eq!(32, decimal_width(76));
    }

    #[test]
    fn decimal_defaults_and_bounds() {
        let d = finalize(raw(DataType::Decimal, &[])).unwrap();
        assert_eq!((76, 0), (d.precision(), d.scale()));

        let d = finalize(raw(DataType::Decimal, &["10"])).unwrap();
        assert_eq!((10, 0), (d.precision(), d.scale()));
        assert_eq!(8, d.estimated_byte_length());
        assert!(!d.is_fixed_length());

        let d = finalize(raw(DataType::Decimal, &["10", "2"])).unwrap();
        assert_eq!((8, false), (d.estimated_byte_length(), d.is_fixed_length()));

        assert!(finalize(raw(DataType::Decimal, &["5", "6"])).unwrap_err().is_invalid_definition());
        assert!(finalize(raw(DataType::Decimal, &["0"])).unwrap_err().is_invalid_definition());
        assert!(finalize(raw(DataType::Decimal, &["77"])).unwrap_err().is_invalid_definition());
        assert!(finalize(raw(DataType::Decimal, &["x"])).unwrap_err().is_invalid_definition());
    }

    #[test]
    fn sized_decimal_scale() {
        let d = finalize(raw(DataType::Decimal64, &["4"])).unwrap();
        assert_eq!((18, 4), (d.precision(), d.scale()));
        assert_eq!(8, d.estimated_byte_length());

        assert!(finalize(raw(DataType::Decimal32, &["10"])).is_err());
    }

    #[test]
    fn datetime_shapes() {
        let d = finalize(raw(DataType::DateTime, &[])).unwrap();
        assert_eq!((None, 4), (d.time_zone(), d.estimated_byte_length()));

        let d = finalize(raw(DataType::DateTime, &["'UTC'"])).unwrap();
        assert_eq!((Some("UTC"), 4), (d.time_zone(), d.estimated_byte_length()));

        let d = finalize(raw(DataType::DateTime, &["6", "'Asia/Shanghai'"])).unwrap();
        assert_eq!(Some("Asia/Shanghai"), d.time_zone());
        assert_eq!((6, 8), (d.scale(), d.estimated_byte_length()));

        let d = finalize(raw(DataType::DateTime64, &[])).unwrap();
        assert_eq!(3, d.scale());

        assert!(finalize(raw(DataType::DateTime64, &["10"])).is_err());
    }

    #[test]
    fn fixed_string() {
        let d = finalize(raw(DataType::FixedString, &["16"])).unwrap();
        assert!(d.is_fixed_length());
        assert_eq!((16, 16), (d.estimated_byte_length(), d.precision()));

        let mut r = raw(DataType::FixedString, &["16"]);
        r.nullable = true;
        let d = finalize(r).unwrap();
        assert!(!d.is_fixed_length());
        assert_eq!(17, d.estimated_byte_length());

        assert!(finalize(raw(DataType::FixedString, &[])).unwrap_err().is_invalid_definition());
        assert!(finalize(raw(DataType::FixedString, &["x"])).unwrap_err().is_invalid_definition());
    }

    #[test]
    fn enum_width() {
        let d = finalize(raw(DataType::Enum, &["'a' = 1", "'b' = 1000"])).unwrap();
        assert_eq!(2, d.estimated_byte_length());
        assert_eq!(Some(1000), d.enum_constants().value_of("b"));

        let d = finalize(raw(DataType::Enum8, &["'a'", "'b'"])).unwrap();
        assert_eq!(1, d.estimated_byte_length());

        assert!(finalize(raw(DataType::Enum8, &["'a' = 200"])).is_err());
    }

    #[test]
    fn string_is_variable() {
        let d = finalize(raw(DataType::String, &[])).unwrap();
        assert!(!d.is_fixed_length());
        assert_eq!(1, d.estimated_byte_length());

        let mut r = raw(DataType::String, &[]);
        r.nullable = true;
        let d = finalize(r).unwrap();
        assert!(!d.is_fixed_length());
        assert_eq!(1, d.estimated_byte_length());

        let mut r = raw(DataType::JSON, &[]);
        r.nullable = true;
        assert_eq!(1, finalize(r).unwrap().estimated_byte_length());
    }

    #[test]
    fn zero_width_scalars_are_variable() {
        for datatype in [DataType::Ring, DataType::Dynamic, DataType::Nothing, DataType::Polygon] {
            let d = finalize(raw(datatype, &[])).unwrap();
            assert!(!d.is_fixed_length(), "{datatype}");
            assert_eq!(0, d.estimated_byte_length(), "{datatype}");
        }

        let d = finalize(raw(DataType::UInt32, &[])).unwrap();
        assert_eq!((true, 4), (d.is_fixed_length(), d.estimated_byte_length()));
    }

    #[test]
    fn nested_widths_add_up() {
        let fields = vec![
            finalize(raw(DataType::UInt64, &[])).unwrap(),
            finalize(raw(DataType::UInt64, &[])).unwrap(),
        ];
        let mut r = raw(DataType::Nested, &[]);
        r.nested = fields;
        let d = finalize(r).unwrap();
        assert!(!d.is_fixed_length());
        assert_eq!(16, d.estimated_byte_length());
    }
}
