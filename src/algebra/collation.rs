use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn is_descending(&self) -> bool {
        matches!(self, Direction::Descending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullDirection {
    First,
    Last,
    Unspecified,
}

/// One ORDER BY key, referencing an output column of the sorted input by
/// ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCollation {
    pub field: usize,
    pub direction: Direction,
    pub null_direction: NullDirection,
}

impl FieldCollation {
    pub fn new(field: usize, direction: Direction) -> Self {
        Self { field, direction, null_direction: NullDirection::Unspecified }
    }

    pub fn with_nulls(field: usize, direction: Direction, null_direction: NullDirection) -> Self {
        Self { field, direction, null_direction }
    }
}

impl fmt::Display for FieldCollation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.field)?;
        if self.direction.is_descending() {
            write!(f, " DESC")?;
        }
        match self.null_direction {
            NullDirection::First => write!(f, " NULLS FIRST"),
            NullDirection::Last => write!(f, " NULLS LAST"),
            NullDirection::Unspecified => Ok(()),
        }
    }
}
