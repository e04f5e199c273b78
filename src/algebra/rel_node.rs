use std::fmt;

use crate::algebra::{
    FieldCollation, LiteralValue, RowType, ScalarExpr, SqlOperator, WindowBound,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// One aggregate computed by an `Aggregate` node. Arguments are ordinals
/// into the input row.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    pub op: SqlOperator,
    pub distinct: bool,
    pub args: Vec<usize>,
    /// Ordinal of a boolean input column acting as a FILTER predicate.
    pub filter_arg: Option<usize>,
    /// WITHIN GROUP ordering, if any.
    pub collation: Vec<FieldCollation>,
}

impl AggregateCall {
    pub fn new(op: SqlOperator, args: Vec<usize>) -> Self {
        Self { op, distinct: false, args, filter_arg: None, collation: vec![] }
    }
}

/// Windowed aggregate inside a `Window` node's group.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAggCall {
    pub op: SqlOperator,
    pub operands: Vec<ScalarExpr>,
    pub distinct: bool,
}

/// One window group of a `Window` node: a shared partition/ordering/frame
/// and the aggregate calls computed over it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowGroup {
    pub keys: Vec<usize>,                 // partition columns
    pub order_keys: Vec<FieldCollation>,
    pub is_rows: bool,
    pub lower_bound: Option<WindowBound>,
    pub upper_bound: Option<WindowBound>,
    pub agg_calls: Vec<WindowAggCall>,
}

/// The optimizer's relational operator tree, as consumed by the unparser.
/// Immutable; produced and type-checked elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum RelNode {
    /// Scan of a base table, identified by its qualified name.
    Scan {
        table: Vec<String>,
        row_type: RowType,
    },

    /// Row-level predicate (WHERE or HAVING depending on position).
    Filter {
        input: Box<RelNode>,
        condition: ScalarExpr,
    },

    /// Projection in output order. `row_type` names the output columns.
    Project {
        input: Box<RelNode>,
        exprs: Vec<ScalarExpr>,
        row_type: RowType,
    },

    /// Group-by aggregation. Output row = group keys then aggregate calls.
    Aggregate {
        input: Box<RelNode>,
        group_keys: Vec<usize>,
        agg_calls: Vec<AggregateCall>,
        row_type: RowType,
    },

    /// Output row type is the concatenation of left then right row types.
    Join {
        left: Box<RelNode>,
        right: Box<RelNode>,
        kind: JoinKind,
        condition: ScalarExpr,
        row_type: RowType,
    },

    SetOp {
        kind: SetOpKind,
        all: bool,
        inputs: Vec<RelNode>,
        row_type: RowType,
    },

    Sort {
        input: Box<RelNode>,
        collation: Vec<FieldCollation>,
        offset: Option<ScalarExpr>,
        fetch: Option<ScalarExpr>,
    },

    /// Standalone window computation: input columns plus OVER calls.
    Window {
        input: Box<RelNode>,
        groups: Vec<WindowGroup>,
        constants: Vec<LiteralValue>,
        row_type: RowType,
    },

    TableFunctionScan {
        inputs: Vec<RelNode>,
        call: ScalarExpr,
        row_type: RowType,
    },

    /// Literal row set.
    Values {
        tuples: Vec<Vec<LiteralValue>>,
        row_type: RowType,
    },
}

impl RelNode {
    pub fn row_type(&self) -> &RowType {
        match self {
            RelNode::Scan { row_type, .. }
            | RelNode::Project { row_type, .. }
            | RelNode::Aggregate { row_type, .. }
            | RelNode::Join { row_type, .. }
            | RelNode::SetOp { row_type, .. }
            | RelNode::Window { row_type, .. }
            | RelNode::TableFunctionScan { row_type, .. }
            | RelNode::Values { row_type, .. } => row_type,
            RelNode::Filter { input, .. } | RelNode::Sort { input, .. } => input.row_type(),
        }
    }

    pub fn inputs(&self) -> Vec<&RelNode> {
        match self {
            RelNode::Scan { .. } | RelNode::Values { .. } => vec![],
            RelNode::Filter { input, .. }
            | RelNode::Project { input, .. }
            | RelNode::Aggregate { input, .. }
            | RelNode::Sort { input, .. }
            | RelNode::Window { input, .. } => vec![input],
            RelNode::Join { left, right, .. } => vec![left, right],
            RelNode::SetOp { inputs, .. } => inputs.iter().collect(),
            RelNode::TableFunctionScan { inputs, .. } => inputs.iter().collect(),
        }
    }

    /// The `i`th input. Out-of-range access is a logic error in the caller.
    pub fn input(&self, i: usize) -> &RelNode {
        self.inputs()[i]
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            RelNode::Scan { .. } => "Scan",
            RelNode::Filter { .. } => "Filter",
            RelNode::Project { .. } => "Project",
            RelNode::Aggregate { .. } => "Aggregate",
            RelNode::Join { .. } => "Join",
            RelNode::SetOp { .. } => "SetOp",
            RelNode::Sort { .. } => "Sort",
            RelNode::Window { .. } => "Window",
            RelNode::TableFunctionScan { .. } => "TableFunctionScan",
            RelNode::Values { .. } => "Values",
        }
    }
}

impl fmt::Display for RelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind_name())?;
        let inputs = self.inputs();
        if !inputs.is_empty() {
            write!(f, "(")?;
            for (i, input) in inputs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", input)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
