//! Cursor helpers over type declaration text.
//!
//! Every function takes the text, a start position and an exclusive `end`
//! bound, and hands back the position where scanning stopped. Positions are
//! byte offsets and always land on ASCII characters, so slicing at them is
//! safe for any UTF-8 input.
use coltype_error::{ColtypeError, Result};

/// Characters allowed in a bare (unquoted) identifier.
pub fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'$' || !b.is_ascii()
}

fn is_quote(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`')
}

const fn closing_bracket(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        _ => None,
    }
}

pub fn skip_whitespace(text: &str, mut pos: usize, end: usize) -> usize {
    let bytes = text.as_bytes();
    while pos < end && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Skip a quoted section starting at the opening quote, returning the
/// position just past the closing quote.
fn skip_quoted(text: &str, start: usize, end: usize) -> Result<usize> {
    let bytes = text.as_bytes();
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < end {
        let b = bytes[pos];
        if b == b'\\' {
            pos += 2;
            continue;
        }
        if b == quote {
            if pos + 1 < end && bytes[pos + 1] == quote {
                pos += 2;
                continue;
            }
            return Ok(pos + 1);
        }
        pos += 1;
    }
    Err(ColtypeError::invalid_definition(format!(
        "Unterminated quoted text starting at position {start}: {}",
        &text[start..end]
    )))
}

/// Read a bare word or a quoted identifier.
///
/// Leading whitespace is skipped. Quoted identifiers may use `'`, `"` or
/// `` ` ``, with backslash escapes or a doubled quote for a literal quote.
/// Returns the identifier (unquoted) and the position just past it. The
/// identifier is empty if the text at the cursor doesn't start one.
pub fn read_identifier(text: &str, start: usize, end: usize) -> Result<(String, usize)> {
    let bytes = text.as_bytes();
    let start = skip_whitespace(text, start, end);
    if start >= end {
        return Ok((String::new(), start));
    }

    if !is_quote(bytes[start]) {
        let mut pos = start;
        while pos < end && is_identifier_byte(bytes[pos]) {
            pos += 1;
        }
        return Ok((text[start..pos].to_string(), pos));
    }

    let quote = bytes[start];
    let mut out = String::new();
    let mut pos = start + 1;
    let mut run_start = pos;
    while pos < end {
        let b = bytes[pos];
        if b == b'\\' {
            out.push_str(&text[run_start..pos]);
            if pos + 1 >= end {
                break;
            }
            // Escaped char may be multibyte.
            let ch = text[pos + 1..end].chars().next().unwrap_or_default();
            out.push(ch);
            pos += 1 + ch.len_utf8();
            run_start = pos;
            continue;
        }
        if b == quote {
            out.push_str(&text[run_start..pos]);
            if pos + 1 < end && bytes[pos + 1] == quote {
                out.push(quote as char);
                pos += 2;
                run_start = pos;
                continue;
            }
            return Ok((out, pos + 1));
        }
        pos += 1;
    }

    Err(ColtypeError::invalid_definition(format!(
        "Unterminated quoted identifier: {}",
        &text[start..end]
    )))
}

/// Strip quotes from a quoted literal such as `'Asia/Shanghai'`.
///
/// Text that doesn't start with a quote is returned as is.
pub fn unquote(text: &str) -> Result<String> {
    if !text.as_bytes().first().is_some_and(|b| is_quote(*b)) {
        return Ok(text.to_string());
    }
    let (s, end) = read_identifier(text, 0, text.len())?;
    if end != text.len() {
        return Err(ColtypeError::invalid_definition(format!(
            "Unexpected text after quoted literal: {text}"
        )));
    }
    Ok(s)
}

/// Skip past the bracket opened at `start`, returning the position just past
/// its matching close.
///
/// Only brackets of the same kind are counted; quoted text is ignored.
pub fn skip_balanced(text: &str, start: usize, end: usize, open: u8) -> Result<usize> {
    let bytes = text.as_bytes();
    let close = closing_bracket(open).ok_or_else(|| {
        ColtypeError::invalid_definition(format!("'{}' is not an opening bracket", open as char))
    })?;
    if start >= end || bytes[start] != open {
        return Err(ColtypeError::invalid_definition(format!(
            "Expected '{}' at position {start}",
            open as char
        )));
    }

    let mut depth = 0usize;
    let mut pos = start;
    while pos < end {
        let b = bytes[pos];
        if is_quote(b) {
            pos = skip_quoted(text, pos, end)?;
            continue;
        }
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Ok(pos + 1);
            }
        }
        pos += 1;
    }

    Err(ColtypeError::invalid_definition(format!(
        "Missing closing '{}' for: {}",
        close as char,
        &text[start..end]
    )))
}

/// Read a parenthesized, comma separated parameter list.
///
/// `start` is the position just after the opening `(`. Parameters are
/// returned raw and trimmed; nested brackets and quoted text inside a
/// parameter are kept intact. Returns the parameters and the position just
/// past the closing `)`.
pub fn read_parameters(text: &str, start: usize, end: usize) -> Result<(Vec<String>, usize)> {
    let bytes = text.as_bytes();
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut param_start = start;
    let mut pos = start;

    while pos < end {
        let b = bytes[pos];
        if is_quote(b) {
            pos = skip_quoted(text, pos, end)?;
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' if depth > 0 => depth -= 1,
            b')' => {
                let last = text[param_start..pos].trim();
                if !last.is_empty() || !params.is_empty() {
                    params.push(last.to_string());
                }
                return Ok((params, pos + 1));
            }
            b',' if depth == 0 => {
                params.push(text[param_start..pos].trim().to_string());
                param_start = pos + 1;
            }
            _ => (),
        }
        pos += 1;
    }

    Err(ColtypeError::invalid_definition(format!(
        "Missing closing ')' for parameters: ({}",
        &text[start..end]
    )))
}

/// Find the next top-level occurrence of `target`.
///
/// Returns the position of `target` itself, or of an unmatched closing
/// bracket, or `end` when neither is found.
pub fn skip_to_delimiter(text: &str, start: usize, end: usize, target: u8) -> Result<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut pos = start;

    while pos < end {
        let b = bytes[pos];
        if depth == 0 && b == target {
            return Ok(pos);
        }
        if is_quote(b) {
            pos = skip_quoted(text, pos, end)?;
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                if depth == 0 {
                    return Ok(pos);
                }
                depth -= 1;
            }
            _ => (),
        }
        pos += 1;
    }

    if depth > 0 {
        return Err(ColtypeError::invalid_definition(format!(
            "Unbalanced brackets in: {}",
            &text[start..end]
        )));
    }

    Ok(end)
}
