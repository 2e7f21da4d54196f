use std::fmt;

/// A single value read from or bound to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Smallint(i16),
    Integer(i32),
    Bigint(i64),
    Real(f32),
    Double(f64),
    Boolean(bool),
    Varchar(String),
    Binary(Vec<u8>),
    Null,
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Name of the value's type, used in conversion errors
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Smallint(_) => "SMALLINT",
            SqlValue::Integer(_) => "INTEGER",
            SqlValue::Bigint(_) => "BIGINT",
            SqlValue::Real(_) => "REAL",
            SqlValue::Double(_) => "DOUBLE",
            SqlValue::Boolean(_) => "BOOLEAN",
            SqlValue::Varchar(_) => "VARCHAR",
            SqlValue::Binary(_) => "BINARY",
            SqlValue::Null => "NULL",
        }
    }

    /// Integral view of the value; strings holding a number are accepted
    /// since some catalog views report counts as text
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Smallint(i) => Some(*i as i64),
            SqlValue::Integer(i) => Some(*i as i64),
            SqlValue::Bigint(i) => Some(*i),
            SqlValue::Double(d) if d.fract() == 0.0 => Some(*d as i64),
            SqlValue::Varchar(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Varchar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Smallint(i) => write!(f, "{}", i),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Bigint(i) => write!(f, "{}", i),
            SqlValue::Real(n) => write!(f, "{}", n),
            SqlValue::Double(n) => write!(f, "{}", n),
            SqlValue::Boolean(true) => write!(f, "TRUE"),
            SqlValue::Boolean(false) => write!(f, "FALSE"),
            SqlValue::Varchar(s) => write!(f, "{}", s),
            SqlValue::Binary(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            SqlValue::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_i64_accepts_numeric_text() {
        assert_eq!(SqlValue::Varchar(" 4326 ".to_string()).as_i64(), Some(4326));
        assert_eq!(SqlValue::Varchar("x".to_string()).as_i64(), None);
        assert_eq!(SqlValue::Smallint(2).as_i64(), Some(2));
        assert_eq!(SqlValue::Null.as_i64(), None);
    }

    #[test]
    fn test_binary_display() {
        assert_eq!(format!("{}", SqlValue::Binary(vec![0x01, 0xab])), "0x01ab");
        assert_eq!(format!("{}", SqlValue::Null), "NULL");
    }
}
