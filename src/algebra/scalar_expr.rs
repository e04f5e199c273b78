use std::fmt;
use std::sync::Arc;

use crate::algebra::{
    Direction, LiteralValue, NullDirection, OpKind, RelNode, SqlOperator, TypeFamily,
};

/// Identifier of a correlation variable, assigned by the optimizer when it
/// decorrelates or keeps a correlated sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelId(pub u32);

impl fmt::Display for CorrelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$cor{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubqueryKind {
    In,
    Exists,
    Scalar,
}

/// ORDER BY key inside a window specification. Unlike `FieldCollation` the
/// key is a full expression, not an input ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOrderKey {
    pub expr: ScalarExpr,
    pub direction: Direction,
    pub null_direction: NullDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowBound {
    CurrentRow,
    UnboundedPreceding,
    UnboundedFollowing,
    Preceding(Box<ScalarExpr>),
    Following(Box<ScalarExpr>),
}

/// Window specification attached to an `Over` expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub partition_keys: Vec<ScalarExpr>,
    pub order_keys: Vec<WindowOrderKey>,
    pub is_rows: bool,
    pub lower_bound: Option<WindowBound>,
    pub upper_bound: Option<WindowBound>,
}

/// Scalar expression tree inside an algebra node.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpr {
    /// 0-based ordinal into the input row type.
    ColumnRef(usize),
    Literal(LiteralValue),
    Call {
        op: SqlOperator,
        operands: Vec<ScalarExpr>,
        /// Result type family; only CAST and coercion rules consult it.
        ty: TypeFamily,
    },
    FieldAccess {
        expr: Box<ScalarExpr>,
        field_name: String,
        field_index: usize,
    },
    CorrelVariable(CorrelId),
    /// Windowed aggregate call (`agg(...) OVER (...)`).
    Over {
        op: SqlOperator,
        operands: Vec<ScalarExpr>,
        window: WindowSpec,
        distinct: bool,
    },
    Subquery {
        kind: SubqueryKind,
        rel: Box<RelNode>,
        /// Left-hand operands for IN sub-queries; empty otherwise.
        operands: Vec<ScalarExpr>,
    },
    DynamicParam(usize),
    /// Column reference inside a MATCH_RECOGNIZE pattern, labelled with its
    /// alternation variable.
    PatternFieldRef {
        index: usize,
        alpha: String,
    },
    /// Index into a shared expression list (compiled expression programs).
    LocalRef {
        index: usize,
        exprs: Arc<Vec<ScalarExpr>>,
    },
}

impl ScalarExpr {
    pub fn call(op: SqlOperator, operands: Vec<ScalarExpr>) -> Self {
        ScalarExpr::Call { op, operands, ty: TypeFamily::Any }
    }

    pub fn call_of(kind: OpKind, operands: Vec<ScalarExpr>) -> Self {
        Self::call(SqlOperator::std(kind), operands)
    }

    pub fn cast(operand: ScalarExpr, target: TypeFamily) -> Self {
        ScalarExpr::Call {
            op: SqlOperator::std(OpKind::Cast),
            operands: vec![operand],
            ty: target,
        }
    }

    pub fn literal(value: LiteralValue) -> Self {
        ScalarExpr::Literal(value)
    }

    pub fn op_kind(&self) -> Option<OpKind> {
        match self {
            ScalarExpr::Call { op, .. } => Some(op.kind),
            _ => None,
        }
    }

    pub fn is_always_true(&self) -> bool {
        matches!(self, ScalarExpr::Literal(LiteralValue::Bool(true)))
    }

    pub fn is_always_false(&self) -> bool {
        matches!(self, ScalarExpr::Literal(LiteralValue::Bool(false)))
    }

    /// Whether the expression contains a windowed (analytic) call anywhere.
    pub fn is_analytic(&self) -> bool {
        match self {
            ScalarExpr::Over { .. } => true,
            ScalarExpr::Call { operands, .. } => operands.iter().any(ScalarExpr::is_analytic),
            ScalarExpr::FieldAccess { expr, .. } => expr.is_analytic(),
            ScalarExpr::LocalRef { index, exprs } => exprs[*index].is_analytic(),
            _ => false,
        }
    }

    /// All input-column ordinals referenced by this expression, in visit
    /// order, duplicates preserved.
    pub fn input_refs(&self) -> Vec<usize> {
        let mut refs = Vec::new();
        self.collect_input_refs(&mut refs);
        refs
    }

    fn collect_input_refs(&self, refs: &mut Vec<usize>) {
        match self {
            ScalarExpr::ColumnRef(i) => refs.push(*i),
            ScalarExpr::Call { operands, .. } => {
                for operand in operands {
                    operand.collect_input_refs(refs);
                }
            }
            ScalarExpr::Over { operands, window, .. } => {
                for operand in operands {
                    operand.collect_input_refs(refs);
                }
                for key in &window.partition_keys {
                    key.collect_input_refs(refs);
                }
                for key in &window.order_keys {
                    key.expr.collect_input_refs(refs);
                }
            }
            ScalarExpr::FieldAccess { expr, .. } => expr.collect_input_refs(refs),
            ScalarExpr::LocalRef { index, exprs } => exprs[*index].collect_input_refs(refs),
            _ => {}
        }
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::ColumnRef(i) => write!(f, "${}", i),
            ScalarExpr::Literal(v) => write!(f, "{}", v),
            ScalarExpr::Call { op, operands, .. } => {
                write!(f, "{}(", op.name)?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", operand)?;
                }
                write!(f, ")")
            }
            ScalarExpr::FieldAccess { expr, field_name, .. } => write!(f, "{}.{}", expr, field_name),
            ScalarExpr::CorrelVariable(id) => write!(f, "{}", id),
            ScalarExpr::Over { op, .. } => write!(f, "{}() OVER (..)", op.name),
            ScalarExpr::Subquery { kind, .. } => write!(f, "{:?}(..)", kind),
            ScalarExpr::DynamicParam(i) => write!(f, "?{}", i),
            ScalarExpr::PatternFieldRef { index, alpha } => write!(f, "{}.${}", alpha, index),
            ScalarExpr::LocalRef { index, .. } => write!(f, "@{}", index),
        }
    }
}
