//! Recognition of the SQL statements the dialect emits

use std::sync::OnceLock;

use geokairos_types::ConnectionError;
use regex::Regex;

/// A literal in an `INSERT ... VALUES` list
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Integer(i64),
    Null,
}

/// Column and value of one `WHERE` conjunct; `None` stands for `IS NULL`
pub type Predicate = (String, Option<String>);

/// A recognized statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    SelectCatalog { field: String, predicates: Vec<Predicate> },
    DeleteCatalog { predicates: Vec<Predicate> },
    InsertCatalog { columns: Vec<String>, values: Vec<Literal> },
    CreateSpatialIndex { name: String, table: String, column: String },
    CreateSequence { name: String },
    DropSequence { name: String },
    LookupSequence { name: String },
    NextValue { sequence: String },
    LastValue,
    Extent { table: String, column: String },
    DeclaredType { predicates: Vec<Predicate> },
}

struct Patterns {
    select_catalog: Regex,
    delete_catalog: Regex,
    insert_catalog: Regex,
    create_index: Regex,
    create_sequence: Regex,
    drop_sequence: Regex,
    lookup_sequence: Regex,
    next_value: Regex,
    last_value: Regex,
    extent: Regex,
    declared_type: Regex,
    predicate: Regex,
    literal: Regex,
}

const IDENT: &str = r#""((?:[^"]|"")+)""#;

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Patterns {
            select_catalog: Regex::new(r"(?i)^SELECT\s+(\w+)\s+FROM\s+GEOMETRY_COLUMNS\s+WHERE\s+(.+)$")?,
            delete_catalog: Regex::new(r"(?i)^DELETE\s+FROM\s+GEOMETRY_COLUMNS(?:\s+WHERE\s+(.+))?$")?,
            insert_catalog: Regex::new(
                r"(?i)^INSERT\s+INTO\s+GEOMETRY_COLUMNS\s*\(([^)]*)\)\s*VALUES\s*\((.*)\)$",
            )?,
            create_index: Regex::new(&format!(
                r"(?i)^CREATE\s+RSTREE\s+INDEX\s+{}\s+ON\s+{}\s*\(\s*{}\s*\)$",
                IDENT, IDENT, IDENT
            ))?,
            create_sequence: Regex::new(&format!(r"(?i)^CREATE\s+SEQUENCE\s+{}(?:\s+.*)?$", IDENT))?,
            drop_sequence: Regex::new(&format!(r"(?i)^DROP\s+SEQUENCE\s+{}$", IDENT))?,
            lookup_sequence: Regex::new(
                r"(?i)^SELECT\s+seqname\s+FROM\s+syssequence\s+WHERE\s+seqname\s*=\s*'((?:[^']|'')*)'$",
            )?,
            next_value: Regex::new(&format!(r"(?i)^SELECT\s+{}\.NEXTVAL\s+FROM\s+DUAL$", IDENT))?,
            last_value: Regex::new(r"(?i)^SELECT\s+lastval\(\)$")?,
            extent: Regex::new(&format!(
                r"(?i)^SELECT\s+ST_ASBINARY\(ST_EXTENT\({}\)\)\s+FROM\s+{}$",
                IDENT, IDENT
            ))?,
            declared_type: Regex::new(
                r"(?i)^SELECT\s+udt_name\s+FROM\s+information_schema\.columns\s+WHERE\s+(.+)$",
            )?,
            predicate: Regex::new(r"(?i)(\w+)\s*(?:=\s*'((?:[^']|'')*)'|IS\s+NULL)")?,
            literal: Regex::new(r"'((?:[^']|'')*)'|(?i:(NULL))|(-?\d+)")?,
        })
    }
}

fn patterns() -> Result<&'static Patterns, ConnectionError> {
    static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(|e| ConnectionError::Unsupported(format!("statement patterns: {}", e)))
}

impl Statement {
    pub fn parse(sql: &str) -> Result<Statement, ConnectionError> {
        let p = patterns()?;
        let sql = sql.trim().trim_end_matches(';').trim();

        if let Some(c) = p.select_catalog.captures(sql) {
            return Ok(Statement::SelectCatalog {
                field: c[1].to_ascii_uppercase(),
                predicates: predicates(p, &c[2]),
            });
        }
        if let Some(c) = p.delete_catalog.captures(sql) {
            let predicates = c.get(1).map(|m| predicates(p, m.as_str())).unwrap_or_default();
            return Ok(Statement::DeleteCatalog { predicates });
        }
        if let Some(c) = p.insert_catalog.captures(sql) {
            let columns = c[1].split(',').map(|s| s.trim().to_ascii_uppercase()).collect();
            let values = p
                .literal
                .captures_iter(&c[2])
                .map(|v| {
                    if let Some(text) = v.get(1) {
                        Literal::Text(unquote_literal(text.as_str()))
                    } else if v.get(2).is_some() {
                        Literal::Null
                    } else {
                        Literal::Integer(v[3].parse().unwrap_or_default())
                    }
                })
                .collect();
            return Ok(Statement::InsertCatalog { columns, values });
        }
        if let Some(c) = p.create_index.captures(sql) {
            return Ok(Statement::CreateSpatialIndex {
                name: unquote_identifier(&c[1]),
                table: unquote_identifier(&c[2]),
                column: unquote_identifier(&c[3]),
            });
        }
        if let Some(c) = p.create_sequence.captures(sql) {
            return Ok(Statement::CreateSequence { name: unquote_identifier(&c[1]) });
        }
        if let Some(c) = p.drop_sequence.captures(sql) {
            return Ok(Statement::DropSequence { name: unquote_identifier(&c[1]) });
        }
        if let Some(c) = p.lookup_sequence.captures(sql) {
            return Ok(Statement::LookupSequence { name: unquote_literal(&c[1]) });
        }
        if let Some(c) = p.next_value.captures(sql) {
            return Ok(Statement::NextValue { sequence: unquote_identifier(&c[1]) });
        }
        if p.last_value.is_match(sql) {
            return Ok(Statement::LastValue);
        }
        if let Some(c) = p.extent.captures(sql) {
            return Ok(Statement::Extent {
                column: unquote_identifier(&c[1]),
                table: unquote_identifier(&c[2]),
            });
        }
        if let Some(c) = p.declared_type.captures(sql) {
            return Ok(Statement::DeclaredType { predicates: predicates(p, &c[1]) });
        }

        Err(ConnectionError::Unsupported(format!("unrecognized statement: {}", sql)))
    }
}

fn predicates(p: &Patterns, clause: &str) -> Vec<Predicate> {
    p.predicate
        .captures_iter(clause)
        .map(|c| (c[1].to_string(), c.get(2).map(|value| unquote_literal(value.as_str()))))
        .collect()
}

fn unquote_literal(body: &str) -> String {
    body.replace("''", "'")
}

fn unquote_identifier(body: &str) -> String {
    body.replace("\"\"", "\"")
}
