use std::fmt::Display;

/// Failure to express an input construct in the target dialect. There is no
/// partial output and nothing to retry; callers either fail the query or
/// evaluate the offending operator locally instead of pushing it down.
///
/// Contract violations (bad ordinals, clause mutations that were never
/// declared) are panics, not errors: they indicate a bug in the producing
/// layer, not a runtime condition.
#[derive(Debug, Clone, PartialEq)]
pub enum UnparseError {
    UnsupportedConstruct { construct: String, dialect: String },
}

impl UnparseError {
    pub fn unsupported(construct: &str, dialect: &str) -> Self {
        UnparseError::UnsupportedConstruct {
            construct: construct.to_string(),
            dialect: dialect.to_string(),
        }
    }

    pub fn err<T>(self) -> Result<T, UnparseError> {
        Err(self)
    }
}

impl Display for UnparseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnparseError::UnsupportedConstruct { construct, dialect } => {
                write!(f, "UnparseError: '{}' cannot be expressed in dialect '{}'", construct, dialect)
            }
        }
    }
}
