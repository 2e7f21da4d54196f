//! Value literals
//!
//! Binary values are escaped byte by byte into an octal string literal:
//!
//! | byte                  | written as      |
//! |-----------------------|-----------------|
//! | `0x00`                | `\000`          |
//! | `'`                   | `\'`            |
//! | `\`                   | `\134`          |
//! | outside `0x20..=0x7E` | `\` + 3-digit octal |
//! | anything else         | the byte itself |
//!
//! and the result is quoted like any other string literal.

use geokairos_types::SqlValue;

use crate::sql::quote_literal;

/// Escape bytes into a quoted string literal
pub fn encode_binary(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        match b {
            0x00 => escaped.push_str("\\000"),
            b'\'' => escaped.push_str("\\'"),
            b'\\' => escaped.push_str("\\134"),
            0x20..=0x7e => escaped.push(b as char),
            _ => escaped.push_str(&format!("\\{:03o}", b)),
        }
    }
    quote_literal(&escaped)
}

/// Encode any value as a SQL literal
pub fn encode_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Binary(bytes) => encode_binary(bytes),
        SqlValue::Varchar(s) => quote_literal(s),
        SqlValue::Boolean(true) => "TRUE".to_string(),
        SqlValue::Boolean(false) => "FALSE".to_string(),
        SqlValue::Real(f) if !f.is_finite() => quote_literal(&f.to_string()),
        SqlValue::Double(d) if !d.is_finite() => quote_literal(&d.to_string()),
        other => other.to_string(),
    }
}
