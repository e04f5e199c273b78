use std::fmt;

use crate::algebra::JoinKind;
use crate::sql::SqlNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlJoinType {
    Inner,
    Left,
    Right,
    Full,
    Comma,
}

impl From<JoinKind> for SqlJoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Inner => SqlJoinType::Inner,
            JoinKind::Left => SqlJoinType::Left,
            JoinKind::Right => SqlJoinType::Right,
            JoinKind::Full => SqlJoinType::Full,
        }
    }
}

impl fmt::Display for SqlJoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlJoinType::Inner => write!(f, "INNER JOIN"),
            SqlJoinType::Left => write!(f, "LEFT JOIN"),
            SqlJoinType::Right => write!(f, "RIGHT JOIN"),
            SqlJoinType::Full => write!(f, "FULL JOIN"),
            SqlJoinType::Comma => write!(f, ","),
        }
    }
}

/// A FROM-clause join item. `condition` is `None` for comma joins.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlJoin {
    pub left: SqlNode,
    pub join_type: SqlJoinType,
    pub right: SqlNode,
    pub condition: Option<SqlNode>,
}
