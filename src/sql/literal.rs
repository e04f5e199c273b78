use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// A literal in the output AST. Numeric values keep their canonical text so
/// the formatter never re-derives digits from binary.
#[derive(Clone, PartialEq)]
pub enum SqlLiteral {
    CharString(String),
    ExactNumeric(String),
    ApproxNumeric(String),
    Boolean(bool),
    Interval {
        sign: i8,
        value: String,
        qualifier: String,
    },
    Date(NaiveDate),
    Time {
        value: NaiveTime,
        precision: u8,
    },
    Timestamp {
        value: NaiveDateTime,
        precision: u8,
    },
    Null,
    Symbol(String),
}

impl SqlLiteral {
    pub fn exact_numeric(text: &str) -> Self {
        SqlLiteral::ExactNumeric(text.to_string())
    }

    pub fn char_string(text: &str) -> Self {
        SqlLiteral::CharString(text.to_string())
    }

    pub fn one() -> Self {
        Self::exact_numeric("1")
    }

    pub fn zero() -> Self {
        Self::exact_numeric("0")
    }
}

impl fmt::Display for SqlLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlLiteral::CharString(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlLiteral::ExactNumeric(s) | SqlLiteral::ApproxNumeric(s) => write!(f, "{}", s),
            SqlLiteral::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            SqlLiteral::Interval { sign, value, qualifier } => {
                write!(f, "INTERVAL {}'{}' {}", if *sign < 0 { "-" } else { "" }, value, qualifier)
            }
            SqlLiteral::Date(d) => write!(f, "DATE '{}'", d),
            SqlLiteral::Time { value, .. } => write!(f, "TIME '{}'", value),
            SqlLiteral::Timestamp { value, .. } => write!(f, "TIMESTAMP '{}'", value.format("%Y-%m-%d %H:%M:%S")),
            SqlLiteral::Null => write!(f, "NULL"),
            SqlLiteral::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Debug for SqlLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SqlLiteral({})", self)
    }
}
