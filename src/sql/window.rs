use std::fmt;

use crate::sql::SqlNode;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlWindowBound {
    CurrentRow,
    UnboundedPreceding,
    UnboundedFollowing,
    Preceding(Box<SqlNode>),
    Following(Box<SqlNode>),
}

impl fmt::Display for SqlWindowBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlWindowBound::CurrentRow => write!(f, "CURRENT ROW"),
            SqlWindowBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            SqlWindowBound::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
            SqlWindowBound::Preceding(n) => write!(f, "{} PRECEDING", n),
            SqlWindowBound::Following(n) => write!(f, "{} FOLLOWING", n),
        }
    }
}

/// The parenthesized window of an OVER call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlWindowSpec {
    pub partition_list: Vec<SqlNode>,
    pub order_list: Vec<SqlNode>,
    pub is_rows: bool,
    pub lower_bound: Option<SqlWindowBound>,
    pub upper_bound: Option<SqlWindowBound>,
}
