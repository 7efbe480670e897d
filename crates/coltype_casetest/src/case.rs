//! Case file format.
//!
//! A case file holds records separated by blank lines. Lines starting with
//! `#` are comments. Each record is a header line, the type text on the next
//! line, and for some records a `----` separator followed by the expected
//! output:
//!
//! ```text
//! parse ok
//! Array(UInt8)
//!
//! parse error Unknown data type
//! Nope
//!
//! render
//! Nullable(LowCardinality(String))
//! ----
//! LowCardinality(Nullable(String))
//!
//! describe
//! Array(Array(UInt8))
//! ----
//! array_level 2
//! array_base UInt8
//!
//! schema
//! a UInt8, b String
//! ----
//! a UInt8
//! b String
//! ```
use coltype_error::{ColtypeError, Result};

const SEPARATOR: &str = "----";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseKind {
    /// Parsing must succeed.
    ParseOk,
    /// Parsing must fail, with a message containing the text if given.
    ParseError(Option<String>),
    /// The normalized type must render as given.
    Render(String),
    /// Listed properties must have the given values.
    Describe(Vec<(String, String)>),
    /// Text is a schema, each column renders as `name type`.
    Schema(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    /// Line of the record header, starting at 1.
    pub line: usize,
    pub text: String,
    pub kind: CaseKind,
}

pub fn parse_cases(content: &str) -> Result<Vec<Case>> {
    let mut cases = Vec::new();
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end()))
        .filter(|(_, line)| !line.starts_with('#'))
        .peekable();

    while let Some((line, header)) = lines.next() {
        if header.trim().is_empty() {
            continue;
        }

        let (_, text) = lines
            .next()
            .filter(|(_, text)| !text.trim().is_empty())
            .ok_or_else(|| ColtypeError::new(format!("Missing type text for record at line {line}")))?;
        let text = text.to_string();

        let mut expected = Vec::new();
        if lines.peek().is_some_and(|(_, l)| *l == SEPARATOR) {
            lines.next();
            while let Some((_, l)) = lines.next_if(|(_, l)| !l.trim().is_empty()) {
                expected.push(l.to_string());
            }
        }

        let mut words = header.split_whitespace();
        let kind = match (words.next(), words.next()) {
            (Some("parse"), Some("ok")) => CaseKind::ParseOk,
            (Some("parse"), Some("error")) => {
                let rest = header.splitn(3, char::is_whitespace).nth(2).map(|s| s.trim().to_string());
                CaseKind::ParseError(rest.filter(|s| !s.is_empty()))
            }
            (Some("render"), None) => match expected.as_slice() {
                [single] => CaseKind::Render(single.clone()),
                _ => {
                    return Err(ColtypeError::new(format!(
                        "Render record at line {line} expects exactly one output line"
                    )))
                }
            },
            (Some("describe"), None) => {
                let props = expected
                    .iter()
                    .map(|l| match l.split_once(' ') {
                        Some((key, value)) => Ok((key.to_string(), value.trim().to_string())),
                        None => Err(ColtypeError::new(format!(
                            "Expected '<property> <value>' in record at line {line}, found '{l}'"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                CaseKind::Describe(props)
            }
            (Some("schema"), None) => CaseKind::Schema(expected),
            _ => {
                return Err(ColtypeError::new(format!(
                    "Unknown record header at line {line}: {header}"
                )))
            }
        };

        cases.push(Case { line, text, kind });
    }

    Ok(cases)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn records() {
        let content = "\
# comment
parse ok
Array(UInt8)

parse error Unknown data type
Nope

render
String NULL
----
Nullable(String)

describe
Array(Array(UInt8))
----
array_level 2
array_base UInt8
";
        let cases = parse_cases(content).unwrap();
        assert_eq!(
            vec![
                Case {
                    line: 2,
                    text: "Array(UInt8)".to_string(),
                    kind: CaseKind::ParseOk
                },
                Case {
                    line: 5,
                    text: "Nope".to_string(),
                    kind: CaseKind::ParseError(Some("Unknown data type".to_string()))
                },
                Case {
                    line: 8,
                    text: "String NULL".to_string(),
                    kind: CaseKind::Render("Nullable(String)".to_string())
                },
                Case {
                    line: 13,
                    text: "Array(Array(UInt8))".to_string(),
                    kind: CaseKind::Describe(vec![
                        ("array_level".to_string(), "2".to_string()),
                        ("array_base".to_string(), "UInt8".to_string()),
                    ])
                },
            ],
            cases
        );
    }

    #[test]
    fn bad_records() {
        assert!(parse_cases("render\nString\n").is_err());
        assert!(parse_cases("frobnicate\nString\n").is_err());
        assert!(parse_cases("parse ok\n\n").is_err());
    }
}
