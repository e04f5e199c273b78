use std::fmt;

use crate::algebra::SqlOperator;
use crate::sql::SqlNode;

/// An operator applied to operands in the output AST. `distinct` marks the
/// `DISTINCT` set quantifier on aggregate calls.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCall {
    pub op: SqlOperator,
    pub operands: Vec<SqlNode>,
    pub distinct: bool,
}

impl SqlCall {
    pub fn new(op: SqlOperator, operands: Vec<SqlNode>) -> Self {
        Self { op, operands, distinct: false }
    }

    pub fn distinct(op: SqlOperator, operands: Vec<SqlNode>) -> Self {
        Self { op, operands, distinct: true }
    }

    pub fn operand(&self, i: usize) -> &SqlNode {
        &self.operands[i]
    }
}

impl fmt::Display for SqlCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SqlNode::Call(self.clone()))
    }
}
