use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ordered_float::NotNan;
use std::fmt;

use crate::algebra::{Sarg, TypeFamily};

/// A typed literal value inside a scalar expression.
///
/// Exact numerics carry their canonical decimal text rather than a binary
/// value so that rendering never round-trips through floating point.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Char(String),
    ExactNumeric(String),
    ApproxNumeric(NotNan<f64>),
    Bool(bool),
    Interval {
        negative: bool,
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
    /// Opaque enum constant, echoed as-is (e.g. trim flags).
    Symbol(String),
    Row(Vec<LiteralValue>),
    /// Range-set literal. Only legal as the second operand of a SEARCH call;
    /// the literal translator rejects it everywhere else.
    Sarg(Sarg),
}

impl LiteralValue {
    pub fn int(value: i64) -> Self {
        LiteralValue::ExactNumeric(value.to_string())
    }

    pub fn float(value: f64) -> Self {
        LiteralValue::ApproxNumeric(NotNan::new(value).expect("literal floats must not be NaN"))
    }

    pub fn string(value: &str) -> Self {
        LiteralValue::Char(value.to_string())
    }

    pub fn family(&self) -> TypeFamily {
        match self {
            LiteralValue::Char(_) => TypeFamily::Character,
            LiteralValue::ExactNumeric(_) => TypeFamily::ExactNumeric,
            LiteralValue::ApproxNumeric(_) => TypeFamily::ApproxNumeric,
            LiteralValue::Bool(_) => TypeFamily::Boolean,
            LiteralValue::Interval { .. } => TypeFamily::Interval,
            LiteralValue::Date(_) => TypeFamily::Date,
            LiteralValue::Time { .. } => TypeFamily::Time,
            LiteralValue::Timestamp { .. } => TypeFamily::Timestamp,
            LiteralValue::Null => TypeFamily::Null,
            LiteralValue::Symbol(_) | LiteralValue::Row(_) | LiteralValue::Sarg(_) => TypeFamily::Any,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Char(s) => write!(f, "'{}'", s),
            LiteralValue::ExactNumeric(s) => write!(f, "{}", s),
            LiteralValue::ApproxNumeric(n) => write!(f, "{:?}", n.into_inner()),
            LiteralValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            LiteralValue::Interval { negative, value, qualifier } => {
                write!(f, "INTERVAL {}'{}' {}", if *negative { "-" } else { "" }, value, qualifier)
            }
            LiteralValue::Date(d) => write!(f, "DATE '{}'", d),
            LiteralValue::Time { value, .. } => write!(f, "TIME '{}'", value),
            LiteralValue::Timestamp { value, .. } => write!(f, "TIMESTAMP '{}'", value),
            LiteralValue::Null => write!(f, "NULL"),
            LiteralValue::Symbol(s) => write!(f, "{}", s),
            LiteralValue::Row(values) => {
                write!(f, "ROW(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
            LiteralValue::Sarg(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Debug for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Literal({})", self)
    }
}
