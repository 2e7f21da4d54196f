//! SQL text helpers
//!
//! Every identifier and string the dialect splices into SQL passes through
//! here, including names that come from the catalog or from introspection.

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `"prefix"."raw"` or `"raw"`
pub fn encode_column_name(prefix: Option<&str>, raw: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", quote_identifier(prefix), quote_identifier(raw)),
        None => quote_identifier(raw),
    }
}

/// Append `LIMIT n [OFFSET m]`, or `OFFSET m` alone when there is no limit
pub fn apply_limit_offset(sql: &mut String, limit: Option<u64>, offset: u64) {
    match limit {
        Some(limit) => {
            sql.push_str(&format!(" LIMIT {}", limit));
            if offset > 0 {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }
        None if offset > 0 => sql.push_str(&format!(" OFFSET {}", offset)),
        None => {}
    }
}

/// `A = 'a' AND B IS NULL` over the given column/value pairs; `None` matches
/// SQL NULL
pub(crate) fn where_equals(predicates: &[(&str, Option<&str>)]) -> String {
    predicates
        .iter()
        .map(|(column, value)| match value {
            Some(value) => format!("{} = {}", column, quote_literal(value)),
            None => format!("{} IS NULL", column),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("roads"), "\"roads\"");
        assert_eq!(quote_identifier("ro\"ads"), "\"ro\"\"ads\"");
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal("x' OR '1'='1"), "'x'' OR ''1''=''1'");
    }

    #[test]
    fn test_encode_column_name() {
        assert_eq!(encode_column_name(None, "geom"), "\"geom\"");
        assert_eq!(encode_column_name(Some("a"), "geom"), "\"a\".\"geom\"");
    }

    #[test]
    fn test_limit_offset_forms() {
        let mut sql = String::from("SELECT 1");
        apply_limit_offset(&mut sql, Some(10), 0);
        assert_eq!(sql, "SELECT 1 LIMIT 10");

        let mut sql = String::from("SELECT 1");
        apply_limit_offset(&mut sql, Some(10), 20);
        assert_eq!(sql, "SELECT 1 LIMIT 10 OFFSET 20");

        let mut sql = String::from("SELECT 1");
        apply_limit_offset(&mut sql, None, 5);
        assert_eq!(sql, "SELECT 1 OFFSET 5");

        let mut sql = String::from("SELECT 1");
        apply_limit_offset(&mut sql, None, 0);
        assert_eq!(sql, "SELECT 1");
    }

    #[test]
    fn test_where_equals() {
        assert_eq!(
            where_equals(&[("A", Some("x")), ("B", Some("y'z"))]),
            "A = 'x' AND B = 'y''z'"
        );
        assert_eq!(where_equals(&[("A", None), ("B", Some("b"))]), "A IS NULL AND B = 'b'");
    }
}
