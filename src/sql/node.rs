use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::algebra::{OpKind, SqlOperator};
use crate::sql::{SqlCall, SqlCase, SqlIdentifier, SqlJoin, SqlJoinType, SqlLiteral, SqlSelect, SqlWindowSpec};

/// Synthetic column names produced by the optimizer ("EXPR$0", "expr$12").
static TRIVIAL_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)expr\$\d+$").expect("trivial alias pattern"));

/// A node of the output SQL AST. Structurally close to SQL grammar; the
/// formatter turns it into characters, the unparser only builds it.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    Select(Box<SqlSelect>),
    Identifier(SqlIdentifier),
    Call(SqlCall),
    Literal(SqlLiteral),
    List(Vec<SqlNode>),
    Join(Box<SqlJoin>),
    Case(Box<SqlCase>),
    Window(Box<SqlWindowSpec>),
    DynamicParam(usize),
}

impl SqlNode {
    pub fn call(op: SqlOperator, operands: Vec<SqlNode>) -> SqlNode {
        SqlNode::Call(SqlCall::new(op, operands))
    }

    pub fn call_of(kind: OpKind, operands: Vec<SqlNode>) -> SqlNode {
        Self::call(SqlOperator::std(kind), operands)
    }

    pub fn identifier(name: &str) -> SqlNode {
        SqlNode::Identifier(SqlIdentifier::simple(name))
    }

    pub fn boolean(value: bool) -> SqlNode {
        SqlNode::Literal(SqlLiteral::Boolean(value))
    }

    pub fn select(select: SqlSelect) -> SqlNode {
        SqlNode::Select(Box::new(select))
    }

    /// `node AS alias`, optionally with column aliases:
    /// `node AS alias (c1, c2)`.
    pub fn aliased(node: SqlNode, alias: &str, field_names: &[&str]) -> SqlNode {
        let mut operands = vec![node, SqlNode::identifier(alias)];
        for name in field_names {
            operands.push(SqlNode::identifier(name));
        }
        SqlNode::call_of(OpKind::As, operands)
    }

    pub fn as_identifier(&self) -> Option<&SqlIdentifier> {
        match self {
            SqlNode::Identifier(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&SqlCall> {
        match self {
            SqlNode::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn op_kind(&self) -> Option<OpKind> {
        self.as_call().map(|c| c.op.kind)
    }

    pub fn is_select(&self) -> bool {
        matches!(self, SqlNode::Select(_))
    }

    /// The alias this node would expose as a FROM item or select item:
    /// the alias operand of an `AS` call, or the last component of a plain
    /// identifier.
    pub fn alias(&self) -> Option<&str> {
        match self {
            SqlNode::Call(call) if call.op.kind == OpKind::As => {
                call.operands.get(1).and_then(|n| n.as_identifier()).map(|id| id.simple_name())
            }
            SqlNode::Identifier(id) => Some(id.simple_name()),
            _ => None,
        }
    }

    /// Whether `over_call` appears among this node's direct call operands
    /// (seeing through CASE WHEN arms, the one indirection the merge rules
    /// care about).
    pub fn has_direct_over_operand(&self) -> bool {
        let Some(call) = self.as_call() else { return false };
        for operand in &call.operands {
            match operand {
                SqlNode::Call(inner) if inner.op.kind == OpKind::Over => return true,
                SqlNode::Case(case) => {
                    if case.when_list.iter().any(|w| {
                        matches!(w, SqlNode::Call(c) if c.op.kind == OpKind::Over)
                    }) {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Whether any call of the given kind appears anywhere in the tree.
    pub fn contains_kind(&self, kind: OpKind) -> bool {
        match self {
            SqlNode::Call(call) => {
                call.op.kind == kind || call.operands.iter().any(|o| o.contains_kind(kind))
            }
            SqlNode::Case(case) => {
                case.value.as_ref().is_some_and(|v| v.contains_kind(kind))
                    || case.when_list.iter().any(|n| n.contains_kind(kind))
                    || case.then_list.iter().any(|n| n.contains_kind(kind))
                    || case.else_expr.as_ref().is_some_and(|e| e.contains_kind(kind))
            }
            SqlNode::List(items) => items.iter().any(|n| n.contains_kind(kind)),
            _ => false,
        }
    }

    /// Whether an aggregate call appears anywhere in the tree.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            SqlNode::Call(call) => {
                call.op.is_aggregate() || call.operands.iter().any(SqlNode::contains_aggregate)
            }
            SqlNode::Case(case) => {
                case.value.as_ref().is_some_and(|v| v.contains_aggregate())
                    || case.when_list.iter().any(SqlNode::contains_aggregate)
                    || case.then_list.iter().any(SqlNode::contains_aggregate)
                    || case.else_expr.as_ref().is_some_and(|e| e.contains_aggregate())
            }
            SqlNode::List(items) => items.iter().any(SqlNode::contains_aggregate),
            _ => false,
        }
    }
}

/// Post-pass removing `AS EXPR$n` aliases from select lists, for consumers
/// (INSERT and friends) that do not care about output column names. Set
/// operations recurse into their arms.
pub fn strip_trivial_aliases(node: &mut SqlNode) {
    match node {
        SqlNode::Select(select) => {
            if let Some(items) = select.select_list.as_mut() {
                for item in items.iter_mut() {
                    let replacement = match item {
                        SqlNode::Call(call) if call.op.kind == OpKind::As => {
                            let trivial = call
                                .operands
                                .get(1)
                                .and_then(|n| n.as_identifier())
                                .is_some_and(|id| TRIVIAL_ALIAS.is_match(id.simple_name()));
                            trivial.then(|| call.operands[0].clone())
                        }
                        _ => None,
                    };
                    if let Some(inner) = replacement {
                        *item = inner;
                    }
                }
            }
        }
        SqlNode::Call(call)
            if matches!(call.op.kind, OpKind::Union | OpKind::Intersect | OpKind::Except) =>
        {
            for operand in call.operands.iter_mut() {
                strip_trivial_aliases(operand);
            }
        }
        _ => {}
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, node: &SqlNode) -> fmt::Result {
    // Nested queries and VALUES always parenthesize.
    match node {
        SqlNode::Select(_) => write!(f, "({})", node),
        SqlNode::Call(call)
            if matches!(
                call.op.kind,
                OpKind::Union | OpKind::Intersect | OpKind::Except | OpKind::Values
            ) =>
        {
            write!(f, "({})", node)
        }
        _ => write!(f, "{}", node),
    }
}

fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[SqlNode]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        fmt_operand(f, item)?;
    }
    Ok(())
}

fn fmt_call(f: &mut fmt::Formatter<'_>, call: &SqlCall) -> fmt::Result {
    let ops = &call.operands;
    match call.op.kind {
        OpKind::As => {
            fmt_operand(f, &ops[0])?;
            write!(f, " AS {}", ops[1])?;
            if ops.len() > 2 {
                write!(f, " (")?;
                fmt_list(f, &ops[2..])?;
                write!(f, ")")?;
            }
            Ok(())
        }
        OpKind::And | OpKind::Or => {
            for (i, operand) in ops.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", call.op.name)?;
                }
                fmt_operand(f, operand)?;
            }
            Ok(())
        }
        OpKind::Equals
        | OpKind::NotEquals
        | OpKind::LessThan
        | OpKind::LessThanOrEqual
        | OpKind::GreaterThan
        | OpKind::GreaterThanOrEqual
        | OpKind::IsDistinctFrom
        | OpKind::IsNotDistinctFrom
        | OpKind::Plus
        | OpKind::Minus
        | OpKind::Times
        | OpKind::Divide
        | OpKind::Like
        | OpKind::NotLike
        | OpKind::Similar
        | OpKind::NotSimilar => {
            fmt_operand(f, &ops[0])?;
            write!(f, " {} ", call.op.name)?;
            fmt_operand(f, &ops[1])
        }
        OpKind::Union | OpKind::Intersect | OpKind::Except => {
            write!(f, "{} {} {}", ops[0], call.op.name, ops[1])
        }
        OpKind::In | OpKind::NotIn => {
            fmt_operand(f, &ops[0])?;
            write!(f, " {} ", call.op.name)?;
            match &ops[1] {
                SqlNode::List(items) => {
                    write!(f, "(")?;
                    fmt_list(f, items)?;
                    write!(f, ")")
                }
                other => fmt_operand(f, other),
            }
        }
        OpKind::IsNull | OpKind::IsNotNull | OpKind::IsTrue | OpKind::IsNotTrue | OpKind::Desc
        | OpKind::NullsFirst | OpKind::NullsLast => {
            fmt_operand(f, &ops[0])?;
            write!(f, " {}", call.op.name)
        }
        OpKind::Not => {
            write!(f, "NOT ")?;
            fmt_operand(f, &ops[0])
        }
        OpKind::Exists => {
            write!(f, "EXISTS ")?;
            fmt_operand(f, &ops[0])
        }
        OpKind::ScalarQuery => fmt_operand(f, &ops[0]),
        OpKind::Cast => {
            write!(f, "CAST(")?;
            fmt_operand(f, &ops[0])?;
            write!(f, " AS {})", ops[1])
        }
        OpKind::Over => {
            fmt_operand(f, &ops[0])?;
            write!(f, " OVER ({})", ops[1])
        }
        OpKind::Filter => {
            fmt_operand(f, &ops[0])?;
            write!(f, " FILTER (WHERE ")?;
            fmt_operand(f, &ops[1])?;
            write!(f, ")")
        }
        OpKind::WithinGroup => {
            fmt_operand(f, &ops[0])?;
            write!(f, " WITHIN GROUP (ORDER BY ")?;
            match &ops[1] {
                SqlNode::List(items) => fmt_list(f, items)?,
                other => fmt_operand(f, other)?,
            }
            write!(f, ")")
        }
        OpKind::Row => {
            write!(f, "(")?;
            fmt_list(f, ops)?;
            write!(f, ")")
        }
        OpKind::Values => {
            write!(f, "VALUES ")?;
            fmt_list(f, ops)
        }
        OpKind::CollectionTable => {
            write!(f, "TABLE(")?;
            fmt_list(f, ops)?;
            write!(f, ")")
        }
        OpKind::Dot => {
            fmt_operand(f, &ops[0])?;
            write!(f, ".{}", ops[1])
        }
        _ => {
            write!(f, "{}(", call.op.name)?;
            if call.distinct {
                write!(f, "DISTINCT ")?;
            }
            fmt_list(f, ops)?;
            write!(f, ")")
        }
    }
}

fn fmt_select(f: &mut fmt::Formatter<'_>, select: &SqlSelect) -> fmt::Result {
    write!(f, "SELECT ")?;
    if select.distinct {
        write!(f, "DISTINCT ")?;
    }
    match &select.select_list {
        Some(items) => fmt_list(f, items)?,
        None => write!(f, "*")?,
    }
    if let Some(from) = &select.from {
        write!(f, " FROM ")?;
        fmt_operand(f, from)?;
    }
    if let Some(cond) = &select.where_clause {
        write!(f, " WHERE {}", cond)?;
    }
    if let Some(group) = &select.group_by {
        write!(f, " GROUP BY ")?;
        fmt_list(f, group)?;
    }
    if let Some(having) = &select.having {
        write!(f, " HAVING {}", having)?;
    }
    if let Some(qualify) = &select.qualify {
        write!(f, " QUALIFY {}", qualify)?;
    }
    if let Some(order) = &select.order_by {
        write!(f, " ORDER BY ")?;
        fmt_list(f, order)?;
    }
    if let Some(offset) = &select.offset {
        write!(f, " OFFSET {} ROWS", offset)?;
    }
    if let Some(fetch) = &select.fetch {
        write!(f, " FETCH NEXT {} ROWS ONLY", fetch)?;
    }
    Ok(())
}

impl fmt::Display for SqlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlNode::Select(select) => fmt_select(f, select),
            SqlNode::Identifier(id) => write!(f, "{}", id),
            SqlNode::Call(call) => fmt_call(f, call),
            SqlNode::Literal(lit) => write!(f, "{}", lit),
            SqlNode::List(items) => fmt_list(f, items),
            SqlNode::Join(join) => {
                fmt_operand(f, &join.left)?;
                if join.join_type == SqlJoinType::Comma {
                    write!(f, ", ")?;
                } else {
                    write!(f, " {} ", join.join_type)?;
                }
                fmt_operand(f, &join.right)?;
                if let Some(cond) = &join.condition {
                    write!(f, " ON {}", cond)?;
                }
                Ok(())
            }
            SqlNode::Case(case) => {
                write!(f, "CASE")?;
                if let Some(value) = &case.value {
                    write!(f, " {}", value)?;
                }
                for (when, then) in case.when_list.iter().zip(&case.then_list) {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(else_expr) = &case.else_expr {
                    write!(f, " ELSE {}", else_expr)?;
                }
                write!(f, " END")
            }
            SqlNode::Window(window) => {
                let mut wrote = false;
                if !window.partition_list.is_empty() {
                    write!(f, "PARTITION BY ")?;
                    fmt_list(f, &window.partition_list)?;
                    wrote = true;
                }
                if !window.order_list.is_empty() {
                    if wrote {
                        write!(f, " ")?;
                    }
                    write!(f, "ORDER BY ")?;
                    fmt_list(f, &window.order_list)?;
                    wrote = true;
                }
                if let (Some(lower), Some(upper)) = (&window.lower_bound, &window.upper_bound) {
                    if wrote {
                        write!(f, " ")?;
                    }
                    let unit = if window.is_rows { "ROWS" } else { "RANGE" };
                    write!(f, "{} BETWEEN {} AND {}", unit, lower, upper)?;
                }
                Ok(())
            }
            SqlNode::DynamicParam(_) => write!(f, "?"),
        }
    }
}
