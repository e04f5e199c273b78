use crate::sql::SqlNode;

/// CASE expression. `value` present means the "switched" form
/// (`CASE x WHEN v THEN t ... END`); absent means boolean WHEN arms.
/// `when_list` and `then_list` are parallel and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCase {
    pub value: Option<SqlNode>,
    pub when_list: Vec<SqlNode>,
    pub then_list: Vec<SqlNode>,
    pub else_expr: Option<SqlNode>,
}

impl SqlCase {
    /// Single-arm boolean CASE with no ELSE, the shape used by the
    /// aggregate FILTER rewrite.
    pub fn when_then(when: SqlNode, then: SqlNode) -> Self {
        Self { value: None, when_list: vec![when], then_list: vec![then], else_expr: None }
    }
}
