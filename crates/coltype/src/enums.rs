use coltype_error::{ColtypeError, Result};
use serde::Serialize;

use crate::scanner;

/// Ordered label to value table of an enum column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EnumConstants {
    entries: Vec<(String, i16)>,
}

impl EnumConstants {
    pub const fn empty() -> Self {
        EnumConstants {
            entries: Vec::new(),
        }
    }

    /// Build the table from raw enum parameters such as `'a' = 1`.
    ///
    /// Entries without an explicit value get one more than the previous
    /// entry, starting at 1.
    pub fn from_parameters(params: &[String]) -> Result<Self> {
        let mut entries = Vec::with_capacity(params.len());
        let mut next: i32 = 1;

        for param in params {
            let (label, value) = match split_entry(param) {
                Some((label, value)) => {
                    let value: i32 = value.trim().parse().map_err(|_| {
                        ColtypeError::invalid_definition(format!(
                            "Expected integer enum value, found '{}' in: {param}",
                            value.trim()
                        ))
                    })?;
                    (scanner::unquote(label.trim())?, value)
                }
                None => (scanner::unquote(param.trim())?, next),
            };

            let value = i16::try_from(value).map_err(|_| {
                ColtypeError::invalid_definition(format!(
                    "Enum value {value} for '{label}' out of range"
                ))
            })?;
            if entries.iter().any(|(l, _)| *l == label) {
                return Err(ColtypeError::invalid_definition(format!(
                    "Duplicate enum label '{label}'"
                )));
            }

            entries.push((label, value));
            next = i32::from(value) + 1;
        }

        Ok(EnumConstants { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i16)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn value_of(&self, label: &str) -> Option<i16> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }

    pub fn label_of(&self, value: i16) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(l, _)| l.as_str())
    }
}

/// Split `'label' = value` on the last `=` outside quotes.
fn split_entry(param: &str) -> Option<(&str, &str)> {
    let bytes = param.as_bytes();
    let mut quote = None;
    let mut split = None;
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        match (quote, b) {
            (Some(_), b'\\') => pos += 1,
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => (),
            (None, b'\'' | b'"') => quote = Some(b),
            (None, b'=') => split = Some(pos),
            (None, _) => (),
        }
        pos += 1;
    }
    split.map(|idx| (&param[..idx], &param[idx + 1..]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn params(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn explicit_values() {
        let e = EnumConstants::from_parameters(&params(&["'a' = 1", "'b'=-2"])).unwrap();
        assert_eq!(vec![("a", 1), ("b", -2)], e.iter().collect::<Vec<_>>());
        assert_eq!(Some(-2), e.value_of("b"));
        assert_eq!(Some("a"), e.label_of(1));
    }

    #[test]
    fn implicit_values() {
        let e = EnumConstants::from_parameters(&params(&["'x'", "'y' = 10", "'z'"])).unwrap();
        assert_eq!(vec![("x", 1), ("y", 10), ("z", 11)], e.iter().collect::<Vec<_>>());
    }

    #[test]
    fn label_with_equals_and_escapes() {
        let e = EnumConstants::from_parameters(&params(&["'a=b' = 1", "'it\\'s' = 2"])).unwrap();
        assert_eq!(Some(1), e.value_of("a=b"));
        assert_eq!(Some(2), e.value_of("it's"));
    }

    #[test]
    fn bad_values() {
        assert!(EnumConstants::from_parameters(&params(&["'a' = x"])).is_err());
        assert!(EnumConstants::from_parameters(&params(&["'a' = 40000"])).is_err());
        assert!(EnumConstants::from_parameters(&params(&["'a' = 1", "'a' = 2"])).is_err());
    }
}
