use coltype::{ColumnDescriptor, TypeParser};
use coltype_error::{ColtypeError, Result};

use crate::case::{Case, CaseKind};
use crate::RunConfig;

/// Column name used for single type records.
const CASE_COLUMN: &str = "c";

pub fn run_case(case: &Case, conf: RunConfig) -> Result<()> {
    let parser = TypeParser::with_config(conf.parser);

    match &case.kind {
        CaseKind::ParseOk => {
            parser.parse_column(CASE_COLUMN, &case.text)?;
            Ok(())
        }
        CaseKind::ParseError(expected) => match parser.parse_column(CASE_COLUMN, &case.text) {
            Ok(column) => Err(ColtypeError::new(format!(
                "Expected '{}' to fail, parsed as {}",
                case.text,
                column.render_type()
            ))),
            Err(e) => match expected {
                Some(expected) if !e.to_string().contains(expected.as_str()) => Err(ColtypeError::new(format!(
                    "Expected error containing '{expected}', got '{e}'"
                ))),
                _ => Ok(()),
            },
        },
        CaseKind::Render(expected) => {
            let got = parser.parse_column(CASE_COLUMN, &case.text)?.render_type();
            expect_eq("render", expected, &got)
        }
        CaseKind::Describe(props) => {
            let column = parser.parse_column(CASE_COLUMN, &case.text)?;
            for (key, expected) in props {
                let got = property(&column, key)?;
                expect_eq(key, expected, &got)?;
            }
            Ok(())
        }
        CaseKind::Schema(expected) => {
            let got: Vec<_> = parser
                .parse_schema(&case.text)?
                .iter()
                .map(|c| format!("{} {}", c.name(), c.render_type()))
                .collect();
            expect_eq("schema", &expected.join("\n"), &got.join("\n"))
        }
    }
}

fn expect_eq(what: &str, expected: &str, got: &str) -> Result<()> {
    if expected == got {
        return Ok(());
    }
    Err(ColtypeError::new(format!(
        "{what} mismatch\nexpected: {expected}\n     got: {got}"
    )))
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn or_none(value: Option<&str>) -> String {
    value.unwrap_or("none").to_string()
}

fn property(column: &ColumnDescriptor, key: &str) -> Result<String> {
    Ok(match key {
        "type" => column.data_type().to_string(),
        "name" => column.name().to_string(),
        "original" => column.original_text().to_string(),
        "render" => column.render_type(),
        "nullable" => column.is_nullable().to_string(),
        "low_cardinality" => column.is_low_cardinality().to_string(),
        "precision" => column.precision().to_string(),
        "scale" => column.scale().to_string(),
        "time_zone" => or_none(column.time_zone()),
        "fixed" => column.is_fixed_length().to_string(),
        "estimated_length" => column.estimated_byte_length().to_string(),
        "array_level" => column.array_nesting_level().to_string(),
        "array_base" => or_none(column.array_base_descriptor().map(|b| b.data_type().name())),
        "nested" => column.nested().len().to_string(),
        "nested_types" => join(column.nested().iter().map(|n| n.data_type())),
        "nested_names" => join(column.nested().iter().map(|n| n.name())),
        "function" => or_none(column.function()),
        "enum" => join(column.enum_constants().iter().map(|(l, v)| format!("{l}={v}"))),
        other => {
            return Err(ColtypeError::new(format!("Unknown property '{other}'")));
        }
    })
}
