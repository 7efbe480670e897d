//! Recursive descent parser for column type declarations.
//!
//! A declaration is read in three steps: wrapper modifiers
//! (`LowCardinality(...)`, `Nullable(...)`), then either a composite body
//! (`Array(...)`, `Tuple(...)` and friends) or a scalar type name with its
//! parameters and trailing clauses, and finally the wrapper brackets are
//! closed. Every finished occurrence is finalized before it's handed to its
//! parent.
use coltype_error::{ColtypeError, Result};
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::descriptor::{assign_positions, ColumnDescriptor};
use crate::finalize::{finalize, RawColumn};
use crate::registry::{registry, DataType};
use crate::scanner::{
    is_identifier_byte, read_identifier, read_parameters, skip_balanced, skip_to_delimiter, skip_whitespace,
};

const KEYWORD_LOW_CARDINALITY: &str = "LowCardinality";
const KEYWORD_NULLABLE: &str = "Nullable";

/// Composite keywords in dispatch order.
const COMPOSITE_KEYWORDS: &[(&str, DataType)] = &[
    ("AggregateFunction", DataType::AggregateFunction),
    ("SimpleAggregateFunction", DataType::SimpleAggregateFunction),
    ("Array", DataType::Array),
    ("Map", DataType::Map),
    ("Nested", DataType::Nested),
    ("Tuple", DataType::Tuple),
    ("Object", DataType::Object),
    ("Variant", DataType::Variant),
];

/// Column clauses skipped up to the next top-level comma.
const STOPWORDS: &[&str] = &[
    "ALIAS",
    "CODEC",
    "COMMENT",
    "DEFAULT",
    "EPHEMERAL",
    "MATERIALIZED",
    "TTL",
];

/// Parses type declarations into column descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeParser {
    config: ParserConfig,
}

impl TypeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        TypeParser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a single type declaration for a column.
    ///
    /// The whole text must be consumed, apart from trailing column clauses
    /// such as `DEFAULT ...` or `CODEC(...)`.
    pub fn parse_column(&self, name: &str, type_text: &str) -> Result<ColumnDescriptor> {
        let mut out = Vec::with_capacity(1);
        let end = type_text.len();
        let pos = self.read_column(type_text, 0, Some(name), &mut out)?;

        let rest = skip_whitespace(type_text, pos, end);
        if rest < end {
            return Err(ColtypeError::invalid_definition(format!(
                "Unexpected '{}' after type of column '{name}'",
                &type_text[rest..]
            )));
        }

        match (out.pop(), out.is_empty()) {
            (Some(column), true) => Ok(column),
            _ => Err(ColtypeError::invalid_definition(format!(
                "Expected a single type for column '{name}': {type_text}"
            ))),
        }
    }

    /// Parse a schema of the form `name type[, name type...]`.
    ///
    /// Anything following a column's type up to the next top-level comma is
    /// ignored. Returned columns have their positions assigned.
    pub fn parse_schema(&self, text: &str) -> Result<Vec<ColumnDescriptor>> {
        let reader = Reader {
            text,
            config: &self.config,
        };
        let mut columns = reader.read_named_fields(0, text.len(), 0)?;
        assign_positions(&mut columns);
        Ok(columns)
    }

    /// Read one type occurrence starting at `start`, appending the finished
    /// descriptor to `out`.
    ///
    /// Returns the position just past the consumed text. Without a name,
    /// a leading word that doesn't start a known type is taken as the name
    /// of the field, e.g. `a UInt8` reads as a UInt8 named `a`.
    pub fn read_column(
        &self,
        text: &str,
        start: usize,
        name: Option<&str>,
        out: &mut Vec<ColumnDescriptor>,
    ) -> Result<usize> {
        let reader = Reader {
            text,
            config: &self.config,
        };
        reader.read_column(start, text.len(), name.unwrap_or_default(), 0, out)
    }
}

/// Open wrapper modifiers of the occurrence being read.
#[derive(Debug, Default)]
struct Wrappers {
    low_cardinality: bool,
    nullable: bool,
    /// Wrapper brackets not yet closed.
    brackets: usize,
}

/// A token following a scalar type name.
#[derive(Debug)]
enum Trailing {
    /// `NULL` or `NOT NULL`.
    Null { negated: bool },
    /// A clause that's skipped, e.g. `DEFAULT 1`.
    Clause,
    /// Anything else, possibly part of a multi-word type name.
    Word(String),
}

#[derive(Debug)]
enum ScalarOutcome {
    Read(RawColumn, usize),
    /// The occurrence turned out to be `name type` and was read again.
    Reread(usize),
}

#[derive(Debug, Clone, Copy)]
struct Reader<'a> {
    text: &'a str,
    config: &'a ParserConfig,
}

impl<'a> Reader<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn read_column(
        &self,
        start: usize,
        end: usize,
        name: &str,
        depth: usize,
        out: &mut Vec<ColumnDescriptor>,
    ) -> Result<usize> {
        if depth > self.config.max_depth {
            return Err(ColtypeError::invalid_definition(format!(
                "Type of column '{name}' nested deeper than {} levels",
                self.config.max_depth
            )));
        }

        let start = skip_whitespace(self.text, start, end);
        trace!(%name, depth, start, "reading column type");

        let mut wrappers = Wrappers::default();
        let mut pos = start;
        loop {
            if !wrappers.low_cardinality && self.keyword_at(pos, end, KEYWORD_LOW_CARDINALITY) {
                wrappers.low_cardinality = true;
                pos = self.expect_open(pos + KEYWORD_LOW_CARDINALITY.len(), end, KEYWORD_LOW_CARDINALITY, name)? + 1;
            } else if !wrappers.nullable && self.keyword_at(pos, end, KEYWORD_NULLABLE) {
                wrappers.nullable = true;
                pos = self.expect_open(pos + KEYWORD_NULLABLE.len(), end, KEYWORD_NULLABLE, name)? + 1;
            } else if self.keyword_at(pos, end, KEYWORD_LOW_CARDINALITY) || self.keyword_at(pos, end, KEYWORD_NULLABLE) {
                return Err(ColtypeError::invalid_definition(format!(
                    "Repeated type wrapper at position {pos} for column '{name}'"
                )));
            } else {
                break;
            }
            wrappers.brackets += 1;
            pos = skip_whitespace(self.text, pos, end);
        }

        let composite = COMPOSITE_KEYWORDS
            .iter()
            .find(|(keyword, _)| self.keyword_at(pos, end, keyword));

        let (mut raw, pos) = match composite {
            Some((keyword, datatype)) => {
                let open = self.expect_open(pos + keyword.len(), end, keyword, name)?;
                let (raw, pos) = self.read_composite(*datatype, name, open, end, depth)?;
                let pos = self.close_wrappers(pos, end, &mut wrappers, name)?;
                let pos = self.read_trailing_clauses(pos, end, &mut wrappers, name)?;
                (raw, pos)
            }
            None => match self.read_scalar(pos, end, name, depth, &mut wrappers, out)? {
                ScalarOutcome::Read(raw, pos) => {
                    let pos = self.close_wrappers(pos, end, &mut wrappers, name)?;
                    let pos = self.read_trailing_clauses(pos, end, &mut wrappers, name)?;
                    (raw, pos)
                }
                ScalarOutcome::Reread(pos) => return Ok(pos),
            },
        };

        raw.original_text = self.text[start..pos].trim_end().to_string();
        raw.nullable = wrappers.nullable;
        raw.low_cardinality = wrappers.low_cardinality;

        out.push(finalize(raw)?);
        Ok(pos)
    }

    /// Check for `keyword` at `pos` as a whole word.
    fn keyword_at(&self, pos: usize, end: usize, keyword: &str) -> bool {
        let after = pos + keyword.len();
        after <= end
            && self.text.as_bytes()[pos..after] == *keyword.as_bytes()
            && (after == end || !is_identifier_byte(self.bytes()[after]))
    }

    /// Expect `(` after a keyword, returning its position.
    fn expect_open(&self, pos: usize, end: usize, keyword: &str, name: &str) -> Result<usize> {
        let pos = skip_whitespace(self.text, pos, end);
        if pos < end && self.bytes()[pos] == b'(' {
            return Ok(pos);
        }
        Err(ColtypeError::invalid_definition(format!(
            "Missing nested type for {keyword} in column '{name}', expected '(' but found {}",
            self.describe(pos, end)
        )))
    }

    fn describe(&self, pos: usize, end: usize) -> String {
        match self.text[pos..end].chars().next() {
            Some(ch) => format!("'{ch}'"),
            None => "end of input".to_string(),
        }
    }

    fn close_wrappers(&self, mut pos: usize, end: usize, wrappers: &mut Wrappers, name: &str) -> Result<usize> {
        while wrappers.brackets > 0 {
            pos = skip_whitespace(self.text, pos, end);
            if pos >= end || self.bytes()[pos] != b')' {
                return Err(ColtypeError::invalid_definition(format!(
                    "Missing closing ')' in type of column '{name}', found {}",
                    self.describe(pos, end)
                )));
            }
            wrappers.brackets -= 1;
            pos += 1;
        }
        Ok(pos)
    }

    fn read_composite(
        &self,
        datatype: DataType,
        name: &str,
        open: usize,
        end: usize,
        depth: usize,
    ) -> Result<(RawColumn, usize)> {
        let mut raw = RawColumn {
            name: name.to_string(),
            data_type: datatype,
            original_text: String::new(),
            nullable: false,
            low_cardinality: false,
            parameters: Vec::new(),
            nested: Vec::new(),
        };

        if matches!(datatype, DataType::AggregateFunction | DataType::SimpleAggregateFunction) {
            let (params, pos) = read_parameters(self.text, open + 1, end)?;
            if params.is_empty() {
                return Err(ColtypeError::invalid_definition(format!(
                    "Missing function for {datatype} column '{name}'"
                )));
            }
            for arg in &params[1..] {
                let reader = Reader {
                    text: arg,
                    config: self.config,
                };
                reader.read_argument(depth + 1, &mut raw.nested)?;
            }
            raw.parameters = params;
            return Ok((raw, pos));
        }

        let close = skip_balanced(self.text, open, end, b'(')?;
        let (body_start, body_end) = (open + 1, close - 1);
        raw.nested = match datatype {
            DataType::Nested => self.read_named_fields(body_start, body_end, depth + 1)?,
            _ => self.read_nested_list(body_start, body_end, depth + 1)?,
        };

        let expected = match datatype {
            DataType::Array => Some(1),
            DataType::Map => Some(2),
            _ => None,
        };
        match expected {
            Some(n) if raw.nested.len() != n => {
                return Err(ColtypeError::invalid_definition(format!(
                    "{datatype} column '{name}' expects {n} nested type(s), found {}",
                    raw.nested.len()
                )));
            }
            None if raw.nested.is_empty() => {
                return Err(ColtypeError::invalid_definition(format!(
                    "Missing nested types for {datatype} column '{name}'"
                )));
            }
            _ => (),
        }

        if datatype == DataType::Variant {
            raw.nested.sort_by(|a, b| a.data_type.name().cmp(b.data_type.name()));
            for branch in &mut raw.nested {
                branch.name = format!("v.{}", branch.data_type.name());
            }
        }

        Ok((raw, close))
    }

    /// Read an aggregate function argument, which must span the whole text.
    fn read_argument(&self, depth: usize, out: &mut Vec<ColumnDescriptor>) -> Result<()> {
        let end = self.text.len();
        let pos = self.read_column(0, end, "", depth, out)?;
        let rest = skip_whitespace(self.text, pos, end);
        if rest < end {
            return Err(ColtypeError::invalid_definition(format!(
                "Unexpected '{}' in aggregate function argument '{}'",
                &self.text[rest..],
                self.text
            )));
        }
        Ok(())
    }

    /// Read a comma separated list of possibly named types.
    fn read_nested_list(&self, start: usize, end: usize, depth: usize) -> Result<Vec<ColumnDescriptor>> {
        let mut out = Vec::new();
        let mut pos = start;
        while pos < end {
            let b = self.bytes()[pos];
            if b == b',' || b.is_ascii_whitespace() {
                pos += 1;
                continue;
            }
            pos = self.read_column(pos, end, "", depth, &mut out)?;
        }
        Ok(out)
    }

    /// Read a comma separated list of `name type` fields.
    fn read_named_fields(&self, start: usize, end: usize, depth: usize) -> Result<Vec<ColumnDescriptor>> {
        let mut out = Vec::new();
        let mut pos = start;
        loop {
            pos = skip_whitespace(self.text, pos, end);
            if pos >= end {
                break;
            }

            let (name, next) = read_identifier(self.text, pos, end)?;
            if name.is_empty() {
                return Err(ColtypeError::invalid_definition(format!(
                    "Expected column name, found {}",
                    self.describe(pos, end)
                )));
            }
            let next = skip_whitespace(self.text, next, end);
            if next >= end {
                return Err(ColtypeError::invalid_definition(format!(
                    "Missing type for column '{name}'"
                )));
            }

            let next = self.read_column(next, end, &name, depth, &mut out)?;
            let next = skip_to_delimiter(self.text, next, end, b',')?;
            if next >= end {
                break;
            }
            if self.bytes()[next] != b',' {
                return Err(ColtypeError::invalid_definition(format!(
                    "Unexpected '{}' after column '{name}'",
                    self.bytes()[next] as char
                )));
            }
            pos = next + 1;
        }
        Ok(out)
    }

    /// Read the token at `pos` following a type name.
    fn read_trailing_token(&self, pos: usize, end: usize, name: &str) -> Result<(Trailing, usize)> {
        let (word, mut pos) = read_identifier(self.text, pos, end)?;
        if word.is_empty() {
            return Err(ColtypeError::invalid_definition(format!(
                "Unexpected {} in type of column '{name}'",
                self.describe(skip_whitespace(self.text, pos, end), end)
            )));
        }

        let upper = word.to_ascii_uppercase();
        if upper == "NOT" {
            let (next, after) = read_identifier(self.text, pos, end)?;
            if !next.eq_ignore_ascii_case("NULL") {
                return Err(ColtypeError::invalid_definition(format!(
                    "Expected NULL after NOT in column '{name}', found '{next}'"
                )));
            }
            pos = after;
            return Ok((Trailing::Null { negated: true }, pos));
        }
        if upper == "NULL" {
            return Ok((Trailing::Null { negated: false }, pos));
        }
        if STOPWORDS.contains(&upper.as_str()) {
            return Ok((Trailing::Clause, pos));
        }
        Ok((Trailing::Word(word), pos))
    }

    /// Apply a `NULL`/`NOT NULL` modifier and skip whatever follows it.
    fn apply_null(
        &self,
        negated: bool,
        pos: usize,
        end: usize,
        wrappers: &mut Wrappers,
        name: &str,
    ) -> Result<usize> {
        if wrappers.nullable {
            return Err(ColtypeError::invalid_definition(format!(
                "Nullable and NULL modifier can't be used together in column '{name}'"
            )));
        }
        wrappers.nullable = !negated;
        skip_to_delimiter(self.text, pos, end, b',')
    }

    /// Handle clauses after a composite type, which can't extend the type
    /// name.
    fn read_trailing_clauses(&self, mut pos: usize, end: usize, wrappers: &mut Wrappers, name: &str) -> Result<usize> {
        loop {
            pos = skip_whitespace(self.text, pos, end);
            if pos >= end || matches!(self.bytes()[pos], b',' | b')') {
                return Ok(pos);
            }
            let token_start = pos;
            let (token, next) = self.read_trailing_token(pos, end, name)?;
            pos = match token {
                Trailing::Null { negated } => self.apply_null(negated, next, end, wrappers, name)?,
                Trailing::Clause => skip_to_delimiter(self.text, next, end, b',')?,
                Trailing::Word(word) => {
                    return Err(ColtypeError::invalid_definition(format!(
                        "Unexpected '{word}' at position {token_start} after type of column '{name}'"
                    )));
                }
            };
        }
    }

    fn read_scalar(
        &self,
        start: usize,
        end: usize,
        name: &str,
        depth: usize,
        wrappers: &mut Wrappers,
        out: &mut Vec<ColumnDescriptor>,
    ) -> Result<ScalarOutcome> {
        let (type_name, mut pos) = read_identifier(self.text, start, end)?;
        if type_name.is_empty() {
            return Err(ColtypeError::invalid_definition(format!(
                "Expected type name for column '{name}', found {}",
                self.describe(skip_whitespace(self.text, start, end), end)
            )));
        }

        let mut type_name = type_name;
        let mut parameters = Vec::new();

        while pos < end {
            match self.bytes()[pos] {
                b'(' => {
                    let (params, next) = read_parameters(self.text, pos + 1, end)?;
                    parameters.extend(params);
                    pos = next;
                }
                b')' => {
                    if wrappers.brackets == 0 {
                        break;
                    }
                    wrappers.brackets -= 1;
                    pos += 1;
                    if wrappers.brackets == 0 {
                        break;
                    }
                }
                b',' => break,
                b if b.is_ascii_whitespace() => pos += 1,
                _ => {
                    let token_start = pos;
                    let (token, next) = self.read_trailing_token(pos, end, name)?;
                    pos = match token {
                        Trailing::Null { negated } => self.apply_null(negated, next, end, wrappers, name)?,
                        Trailing::Clause => skip_to_delimiter(self.text, next, end, b',')?,
                        Trailing::Word(word) => {
                            if name.is_empty() && !registry().may_start_with(&type_name, &word) {
                                if wrappers.brackets > 0 {
                                    return Err(ColtypeError::invalid_definition(format!(
                                        "Named field '{type_name}' inside type wrapper at position {token_start}"
                                    )));
                                }
                                debug!(
                                    field = %type_name,
                                    position = token_start,
                                    "reading type again as a named field"
                                );
                                let pos = self.read_column(token_start, end, &type_name, depth, out)?;
                                return Ok(ScalarOutcome::Reread(pos));
                            }
                            type_name.push(' ');
                            type_name.push_str(&word);
                            next
                        }
                    };
                }
            }
        }

        let data_type = registry().resolve(&type_name).ok_or_else(|| {
            ColtypeError::unknown_type(if name.is_empty() {
                format!("Unknown data type '{type_name}'")
            } else {
                format!("Unknown data type '{type_name}' for column '{name}'")
            })
        })?;

        let raw = RawColumn {
            name: name.to_string(),
            data_type,
            original_text: String::new(),
            nullable: false,
            low_cardinality: false,
            parameters,
            nested: Vec::new(),
        };
        Ok(ScalarOutcome::Read(raw, pos))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(text: &str) -> ColumnDescriptor {
        TypeParser::new().parse_column("c", text).unwrap()
    }

    fn parse_err(text: &str) -> ColtypeError {
        TypeParser::new().parse_column("c", text).unwrap_err()
    }

    fn names(columns: &[ColumnDescriptor]) -> Vec<&str> {
        columns.iter().map(|c| c.name()).collect()
    }

    fn types(columns: &[ColumnDescriptor]) -> Vec<DataType> {
        columns.iter().map(|c| c.data_type()).collect()
    }

    #[test]
    fn leaf_types_keep_canonical_name() {
        for datatype in DataType::ALL {
            if datatype.is_composite() || *datatype == DataType::FixedString {
                continue;
            }
            let column = parse(datatype.name());
            assert_eq!(*datatype, column.data_type(), "{datatype}");
            assert_eq!(datatype.name(), column.render_type());
            assert_eq!(datatype.name(), column.original_text());
        }
    }

    #[test]
    fn nested_arrays() {
        let column = parse("Array(Array(Array(UInt8)))");
        assert!(column.is_array());
        assert_eq!(3, column.array_nesting_level());
        assert_eq!(DataType::UInt8, column.array_base_descriptor().unwrap().data_type());
        assert_eq!(2, column.nested()[0].array_nesting_level());
        assert!(!column.is_fixed_length());
    }

    #[test]
    fn nullable_decimal() {
        let column = parse("Nullable(Decimal(38,10))");
        assert_eq!(DataType::Decimal, column.data_type());
        assert!(column.is_nullable());
        assert_eq!((38, 10), (column.precision(), column.scale()));
        assert!(!column.is_fixed_length());
        assert_eq!(DataType::Decimal256.byte_length() + 1, column.estimated_byte_length());

        let column = parse("Decimal(10,2)");
        assert!(!column.is_fixed_length());
        assert_eq!(8, column.estimated_byte_length());
        assert_eq!("Nullable(Decimal(38,10))", column.original_text());
    }

    #[test]
    fn map_key_and_value() {
        let column = parse("Map(String, Int32)");
        assert!(column.is_map());
        assert_eq!(vec![DataType::String, DataType::Int32], types(column.nested()));
        assert_eq!(DataType::String, column.key_descriptor().unwrap().data_type());
        assert_eq!(DataType::Int32, column.value_descriptor().unwrap().data_type());
    }

    #[test]
    fn variant_branches_sorted() {
        let column = parse("Variant(UInt8,String)");
        assert!(column.is_variant());
        assert_eq!(vec!["v.String", "v.UInt8"], names(column.nested()));
        assert_eq!(vec![DataType::String, DataType::UInt8], types(column.nested()));
    }

    #[test]
    fn fixed_string_widths() {
        let column = parse("FixedString(16)");
        assert!(column.is_fixed_length());
        assert_eq!(16, column.estimated_byte_length());

        let column = parse("Nullable(FixedString(16))");
        assert!(!column.is_fixed_length());
        assert_eq!(17, column.estimated_byte_length());
    }

    #[test]
    fn named_tuple() {
        let column = parse("Tuple(a UInt8, b Nullable(String))");
        assert!(column.is_tuple());
        assert!(!column.is_fixed_length());
        assert_eq!(vec!["a", "b"], names(column.nested()));
        assert_eq!(vec![DataType::UInt8, DataType::String], types(column.nested()));
        assert!(column.nested()[1].is_nullable());
        assert_eq!("UInt8", column.nested()[0].original_text());
        assert_eq!(2, column.estimated_byte_length());
    }

    #[test]
    fn anonymous_tuple_of_fixed_types_is_variable() {
        let column = parse("Tuple(UInt8, UInt16)");
        assert_eq!(vec!["", ""], names(column.nested()));
        assert!(!column.is_fixed_length());
        assert_eq!(3, column.estimated_byte_length());
    }

    #[test]
    fn compound_names_in_tuples() {
        let column = parse("Tuple(DOUBLE PRECISION, b String)");
        assert_eq!(vec!["", "b"], names(column.nested()));
        assert_eq!(vec![DataType::Float64, DataType::String], types(column.nested()));

        let column = parse("Tuple(double Float64)");
        assert_eq!(vec!["double"], names(column.nested()));
        assert_eq!(vec![DataType::Float64], types(column.nested()));

        let column = parse("Tuple(double precision)");
        assert_eq!(vec![""], names(column.nested()));
        assert_eq!(vec![DataType::Float64], types(column.nested()));
    }

    #[test]
    fn compound_names_for_named_columns() {
        assert_eq!(DataType::UInt64, parse("BIGINT UNSIGNED").data_type());
        assert_eq!(DataType::String, parse("national character varying").data_type());
        assert!(parse_err("UInt8 foo").is_unknown_type());
    }

    #[test]
    fn anonymous_column_with_field_name() {
        let mut out = Vec::new();
        let text = "a UInt8";
        let pos = TypeParser::new().read_column(text, 0, None, &mut out).unwrap();
        assert_eq!(text.len(), pos);
        assert_eq!(vec!["a"], names(&out));
        assert_eq!(vec![DataType::UInt8], types(&out));
    }

    #[test]
    fn field_name_inside_wrapper() {
        for text in ["Nullable(a UInt8)", "LowCardinality(a String)"] {
            let mut out = Vec::new();
            let err = TypeParser::new().read_column(text, 0, None, &mut out).unwrap_err();
            assert!(err.is_invalid_definition(), "{text}: {err}");
            assert!(out.is_empty(), "{text}");
        }
    }

    #[test]
    fn read_column_stops_at_comma() {
        let mut out = Vec::new();
        let text = "Array(UInt8), String";
        let pos = TypeParser::new().read_column(text, 0, None, &mut out).unwrap();
        assert_eq!(12, pos);
        let pos = TypeParser::new().read_column(text, pos + 1, None, &mut out).unwrap();
        assert_eq!(text.len(), pos);
        assert_eq!(vec![DataType::Array, DataType::String], types(&out));
    }

    #[test]
    fn wrappers_in_any_order() {
        for text in ["LowCardinality(Nullable(String))", "Nullable(LowCardinality(String))"] {
            let column = parse(text);
            assert!(column.is_nullable(), "{text}");
            assert!(column.is_low_cardinality(), "{text}");
            assert_eq!(DataType::String, column.data_type());
            assert_eq!(text, column.original_text());
        }

        for text in [
            "Nullable(Nullable(String))",
            "LowCardinality(LowCardinality(String))",
            "LowCardinality(Nullable(LowCardinality(String)))",
        ] {
            let err = parse_err(text);
            assert!(err.is_invalid_definition(), "{text}: {err}");
        }

        let column = parse("Nullable(Tuple(a UInt8))");
        assert!(column.is_nullable());
        assert!(column.is_tuple());
    }

    #[test]
    fn null_modifiers() {
        assert!(parse("String NULL").is_nullable());
        assert!(!parse("String NOT NULL").is_nullable());
        assert!(parse_err("Nullable(String NULL)").is_invalid_definition());
        assert!(parse_err("Nullable(String) NOT NULL").is_invalid_definition());
        assert!(parse_err("String NOT x").is_invalid_definition());
    }

    #[test]
    fn trailing_clauses_skipped() {
        let column = parse("String DEFAULT 'a, b' CODEC(ZSTD(1))");
        assert_eq!(DataType::String, column.data_type());

        let column = parse("Array(UInt8) DEFAULT []");
        assert!(column.is_array());

        let column = parse("Nullable(String) TTL d + INTERVAL 1 DAY");
        assert!(column.is_nullable());
    }

    #[test]
    fn malformed_declarations() {
        for text in [
            "Array(UInt8",
            "Nullable(String",
            "Nullable String",
            "Array",
            "Array(UInt8, String)",
            "Map(String)",
            "Tuple()",
            "Variant()",
            "Nested()",
            "Array(UInt8))",
            "Enum8('a' = 1",
            "FixedString(x)",
            "",
        ] {
            let err = parse_err(text);
            assert!(err.is_invalid_definition(), "{text}: {err}");
        }
    }

    #[test]
    fn keywords_match_whole_words() {
        let err = parse_err("Mapping");
        assert!(err.is_unknown_type());
        assert!(err.to_string().contains("'c'"), "{err}");
    }

    #[test]
    fn aggregate_function() {
        let column = parse("AggregateFunction(quantiles(0.5, 0.9), UInt64)");
        assert!(column.is_aggregate_function());
        assert_eq!(Some("quantiles(0.5, 0.9)"), column.function());
        assert_eq!(vec![DataType::UInt64], types(column.nested()));

        let column = parse("SimpleAggregateFunction(sum, Nullable(Float64))");
        assert_eq!(Some("sum"), column.function());
        assert!(column.nested()[0].is_nullable());

        assert!(parse_err("AggregateFunction()").is_invalid_definition());
        assert!(parse_err("AggregateFunction(sum, Nope)").is_unknown_type());
    }

    #[test]
    fn enum_constants() {
        let column = parse("Enum8('a'=1,'b'=2)");
        assert!(column.is_enum());
        assert_eq!(vec![("a", 1), ("b", 2)], column.enum_constants().iter().collect::<Vec<_>>());
    }

    #[test]
    fn datetime_time_zones() {
        let column = parse("DateTime('Asia/Shanghai')");
        assert_eq!(Some("Asia/Shanghai"), column.time_zone());
        assert_eq!(4, column.estimated_byte_length());

        let column = parse("DateTime64(6, 'UTC')");
        assert_eq!((6, Some("UTC")), (column.scale(), column.time_zone()));
        assert_eq!(8, column.estimated_byte_length());

        let column = parse("Nullable(DateTime('UTC'))");
        assert_eq!(5, column.estimated_byte_length());
    }

    #[test]
    fn object_type() {
        let column = parse("Object('json')");
        assert_eq!(DataType::Object, column.data_type());
        assert_eq!(vec![DataType::JSON], types(column.nested()));
        assert!(!column.is_fixed_length());
    }

    #[test]
    fn nested_type() {
        let column = parse("Nested(id UInt32, `tag name` String)");
        assert!(column.is_nested());
        assert_eq!(vec!["id", "tag name"], names(column.nested()));
        assert!(!column.is_fixed_length());
        assert_eq!(5, column.estimated_byte_length());

        let column = parse("Nested(a UInt64, b UInt64)");
        assert_eq!(16, column.estimated_byte_length());
        assert!(parse_err("Nested(UInt32)").is_invalid_definition());
    }

    #[test]
    fn depth_limit() {
        let parser = TypeParser::with_config(ParserConfig::default().with_max_depth(2));
        assert!(parser.parse_column("c", "Array(Array(UInt8))").is_ok());
        let err = parser.parse_column("c", "Array(Array(Array(UInt8)))").unwrap_err();
        assert!(err.is_invalid_definition());

        let deep = format!("{}UInt8{}", "Array(".repeat(300), ")".repeat(300));
        assert!(parse_err(&deep).is_invalid_definition());
    }

    #[test]
    fn array_level_at_limit() {
        let text = format!("{}UInt8{}", "Array(".repeat(255), ")".repeat(255));
        let column = parse(&text);
        assert_eq!(255, column.array_nesting_level());
        assert_eq!(DataType::UInt8, column.array_base_descriptor().unwrap().data_type());
    }

    #[test]
    fn schema() {
        let columns = TypeParser::new()
            .parse_schema(
                "a UInt8, `b c` Nullable(String) DEFAULT 'x', d Array(Tuple(x Int32, y String)) CODEC(ZSTD), e DOUBLE PRECISION",
            )
            .unwrap();
        assert_eq!(vec!["a", "b c", "d", "e"], names(&columns));
        assert_eq!(
            vec![DataType::UInt8, DataType::String, DataType::Array, DataType::Float64],
            types(&columns)
        );
        assert_eq!(
            vec![0, 1, 2, 3],
            columns.iter().map(|c| c.position_index()).collect::<Vec<_>>()
        );
        assert!(columns[0].is_first_column());
        assert!(columns[3].is_last_column());

        assert!(TypeParser::new().parse_schema("").unwrap().is_empty());
        assert!(TypeParser::new().parse_schema("a UInt8)").is_err());
        assert!(TypeParser::new().parse_schema("a").is_err());
    }
}
