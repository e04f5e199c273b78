use indexmap::IndexMap;
use tracing::trace;

use crate::algebra::{AggregateCall, OpKind, RelNode, RowType, ScalarExpr, SetOpKind};
use crate::dialect::Dialect;
use crate::sql::{SqlNode, SqlSelect};
use crate::unparser::{Clause, Context, SelectListContext, SqlUnparser};

/// Outcome of translating one algebra node: the SQL built so far, the
/// clauses it already consumes, and the aliasing needed to reference its
/// columns. Insertion order of `aliases` is FROM-item order and must be
/// preserved.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub node: SqlNode,
    pub clauses: Vec<Clause>,
    /// Alias required when this node is used as a FROM item; `None` when
    /// the node names itself (plain table scan).
    pub needed_alias: Option<String>,
    pub needed_type: Option<RowType>,
    pub aliases: IndexMap<String, RowType>,
    /// Whether `expected_clauses` is disregarded for the wrap decision.
    ignore_clauses: bool,
    /// Clauses the consuming parent declared it will add.
    expected_clauses: Vec<Clause>,
}

impl SqlResult {
    pub fn new(
        node: SqlNode,
        clauses: Vec<Clause>,
        needed_alias: Option<String>,
        needed_type: Option<RowType>,
        aliases: IndexMap<String, RowType>,
    ) -> Self {
        Self {
            node,
            clauses,
            needed_alias,
            needed_type,
            aliases,
            ignore_clauses: false,
            expected_clauses: vec![],
        }
    }

    pub fn with_expected_clauses(mut self, ignore_clauses: bool, expected_clauses: Vec<Clause>) -> Self {
        self.ignore_clauses = ignore_clauses;
        self.expected_clauses = expected_clauses;
        self
    }

    /// Whether layering `expected_clauses` on top of this result requires
    /// wrapping it into a fresh sub-select. Pure in
    /// `(node, clauses, rel, expected_clauses)`; evaluated as a prioritized
    /// rule list, first match wins.
    pub fn needs_new_sub_query(&self, dialect: &Dialect, rel: &RelNode, expected_clauses: &[Clause]) -> bool {
        if self.clauses.is_empty() {
            return false;
        }
        let max_clause = *self.clauses.iter().max().expect("non-empty clause list");

        // A filter over an analytic projection can merge as QUALIFY when the
        // predicate itself has no analytic call, even though the ordering
        // rule below would wrap.
        if dialect.supports_qualify_clause && max_clause == Clause::Select {
            if let RelNode::Filter { input, condition } = rel {
                if let RelNode::Project { exprs, .. } = input.as_ref() {
                    if exprs.iter().any(ScalarExpr::is_analytic) && !condition.is_analytic() {
                        return false;
                    }
                }
            }
        }

        // Ordering rule: a clause evaluated at or before the latest one
        // already fixed cannot be added in place. A repeated SELECT is the
        // one same-position merge allowed (the select list is replaced).
        for &clause in expected_clauses {
            if max_clause > clause || (max_clause == clause && clause != Clause::Select) {
                return true;
            }
        }

        match rel {
            RelNode::Project { input, exprs, row_type } => {
                if matches!(input.as_ref(), RelNode::Aggregate { .. }) {
                    if !dialect.supports_agg_in_group_by
                        && self.has_agg_function_used_in_group_by(exprs, row_type)
                    {
                        return true;
                    }
                    if dialect.group_by_alias
                        && self.has_alias_used_in_group_by_not_in_projection(row_type)
                    {
                        return true;
                    }
                }
                if matches!(input.as_ref(), RelNode::Project { .. })
                    && !dialect.supports_nested_analytical_functions
                    && self.has_nested_analytical_functions(exprs)
                {
                    return true;
                }
                // A windowed function cannot be folded into an existing
                // select-list expression.
                if exprs.iter().any(ScalarExpr::is_analytic) && max_clause == Clause::Select {
                    return true;
                }
                if self.clauses.contains(&Clause::Having)
                    && dialect.having_alias
                    && self.has_alias_used_in_having()
                {
                    return true;
                }
            }
            RelNode::Aggregate { input, group_keys, agg_calls, .. } => {
                if !dialect.supports_nested_aggregations && self.has_nested_aggregations(agg_calls) {
                    return true;
                }
                if let RelNode::Project { exprs, .. } = input.as_ref() {
                    if dialect.group_by_alias && group_keys.iter().any(|&k| exprs[k].is_analytic()) {
                        return true;
                    }
                }
                if !dialect.supports_analytical_function_in_aggregate
                    && self.has_analytical_function_in_aggregate(agg_calls)
                {
                    return true;
                }
            }
            RelNode::Sort { input, .. } => {
                // Ordering on top of INTERSECT changes meaning once merged.
                if matches!(input.as_ref(), RelNode::SetOp { kind: SetOpKind::Intersect, .. }) {
                    return true;
                }
            }
            _ => {}
        }
        false
    }

    fn select_of(&self) -> Option<&SqlSelect> {
        match &self.node {
            SqlNode::Select(select) => Some(select),
            _ => None,
        }
    }

    /// Whether a GROUP BY item names a projected column whose select-list
    /// expression carries an aggregate call.
    fn has_agg_function_used_in_group_by(&self, exprs: &[ScalarExpr], row_type: &RowType) -> bool {
        let Some(select) = self.select_of() else { return false };
        let (Some(items), Some(group)) = (&select.select_list, &select.group_by) else {
            return false;
        };
        let mut aggregated_names = Vec::new();
        for (index, expr) in exprs.iter().enumerate() {
            let references_aggregate = expr.input_refs().iter().any(|&r| {
                items.get(r).is_some_and(SqlNode::contains_aggregate)
            });
            if references_aggregate {
                aggregated_names.push(row_type.field(index).name.as_str());
            }
        }
        group.iter().any(|item| {
            item.as_identifier()
                .is_some_and(|id| aggregated_names.contains(&id.simple_name()))
        })
    }

    /// Whether an analytic projection expression references a select item
    /// that itself contains an analytic call.
    fn has_nested_analytical_functions(&self, exprs: &[ScalarExpr]) -> bool {
        let Some(select) = self.select_of() else { return false };
        let Some(items) = &select.select_list else { return false };
        for expr in exprs {
            if !expr.is_analytic() {
                continue;
            }
            for r in expr.input_refs() {
                if items.get(r).is_some_and(|item| item.contains_kind(OpKind::Over)) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether an aggregate argument points at a select item that already
    /// contains an aggregate call.
    fn has_nested_aggregations(&self, agg_calls: &[AggregateCall]) -> bool {
        let Some(select) = self.select_of() else { return false };
        let Some(items) = &select.select_list else { return false };
        for call in agg_calls {
            for &arg in &call.args {
                let Some(item) = items.get(arg) else { continue };
                let Some(item_call) = item.as_call() else { continue };
                if item_call
                    .operands
                    .iter()
                    .any(|o| o.as_call().is_some_and(|c| c.op.is_aggregate()))
                {
                    return true;
                }
            }
        }
        false
    }

    /// Whether an aggregate argument points at a select item carrying a
    /// windowed call.
    fn has_analytical_function_in_aggregate(&self, agg_calls: &[AggregateCall]) -> bool {
        let Some(select) = self.select_of() else { return false };
        let Some(items) = &select.select_list else { return false };
        agg_calls.iter().any(|call| {
            call.args
                .iter()
                .any(|&arg| items.get(arg).is_some_and(SqlNode::has_direct_over_operand))
        })
    }

    /// Whether GROUP BY references a select-list alias that the final
    /// projection no longer exposes (it would become unresolvable once the
    /// select is wrapped away).
    fn has_alias_used_in_group_by_not_in_projection(&self, row_type: &RowType) -> bool {
        let Some(select) = self.select_of() else { return false };
        let (Some(items), Some(group)) = (&select.select_list, &select.group_by) else {
            return false;
        };
        let projected: Vec<&str> = row_type.field_names();
        for group_item in group {
            let Some(group_name) = group_item.as_identifier().map(|id| id.simple_name()) else {
                continue;
            };
            let is_alias = items.iter().any(|item| {
                item.op_kind() == Some(OpKind::As) && item.alias() == Some(group_name)
            });
            if is_alias && !projected.contains(&group_name) {
                return true;
            }
        }
        false
    }

    /// Whether the HAVING predicate references a select-list alias. Only
    /// meaningful when every computed select item is aliased.
    fn has_alias_used_in_having(&self) -> bool {
        let Some(select) = self.select_of() else { return false };
        let Some(having) = &select.having else { return false };
        let Some(items) = &select.select_list else { return false };
        for item in items {
            if let SqlNode::Call(call) = item {
                if call.op.kind != OpKind::As {
                    return false;
                }
            }
        }
        let aliases: Vec<&str> = items
            .iter()
            .filter(|item| item.op_kind() == Some(OpKind::As))
            .filter_map(|item| item.alias())
            .collect();
        references_any_identifier(having, &aliases)
    }

    /// Creates a builder that layers the declared clauses on top of this
    /// result, wrapping into a sub-select when the decision above requires
    /// it.
    pub fn builder(&self, unparser: &mut SqlUnparser, rel: &RelNode) -> SqlBuilder {
        let decision_clauses: &[Clause] = if self.ignore_clauses { &[] } else { &self.expected_clauses };
        let need_new = self.needs_new_sub_query(&unparser.dialect, rel, decision_clauses);
        trace!(node = rel.kind_name(), need_new, "builder");
        let keep_column_alias = matches!(rel, RelNode::Sort { .. }) && unparser.dialect.sort_by_alias;

        let (select, mut clause_list) = if need_new {
            (self.sub_select(unparser), Vec::new())
        } else {
            (self.as_select(unparser), self.clauses.clone())
        };
        clause_list.extend(self.expected_clauses.iter().copied());

        let context;
        let aliases;
        if let Some(select_list) = &select.select_list {
            let alias_ref = (self.expected_clauses.contains(&Clause::Having)
                && unparser.dialect.having_alias)
                || keep_column_alias;
            context = Context::SelectList(SelectListContext {
                select_list: select_list.clone(),
                alias_ref,
            });
            aliases = self.aliases.clone();
        } else {
            let qualified = !unparser.dialect.has_implicit_table_alias
                || (!unparser.dialect.supports_identical_table_and_column_name
                    && unparser.table_column_identical)
                || self.aliases.len() > 1;
            match &self.needed_alias {
                Some(needed) if need_new && (self.aliases.len() != 1 || !self.aliases.contains_key(needed)) => {
                    // The wrap renamed the sub-query; resolution moves to the
                    // wrapper's alias over the child's row type.
                    let mut new_aliases = IndexMap::new();
                    new_aliases.insert(needed.clone(), rel.input(0).row_type().clone());
                    context = unparser.alias_context(new_aliases.clone(), qualified);
                    aliases = new_aliases;
                }
                _ => {
                    context = unparser.alias_context(self.aliases.clone(), qualified);
                    aliases = self.aliases.clone();
                }
            }
        }
        SqlBuilder {
            clauses: clause_list,
            select,
            context,
            aliases,
        }
    }

    /// Node usable as a FROM item, aliased when required. An existing AS
    /// gets its alias operand replaced (VALUES rendering relies on this).
    pub fn as_from(&self) -> SqlNode {
        match &self.needed_alias {
            None => self.node.clone(),
            Some(alias) => match &self.node {
                SqlNode::Call(call) if call.op.kind == OpKind::As => {
                    let mut operands = call.operands.clone();
                    operands[1] = SqlNode::identifier(alias);
                    SqlNode::call(call.op.clone(), operands)
                }
                other => SqlNode::aliased(other.clone(), alias, &[]),
            },
        }
    }

    pub fn sub_select(&self, unparser: &SqlUnparser) -> SqlSelect {
        unparser.wrap_select(self.as_from())
    }

    /// View of this result as a SELECT; non-query nodes get wrapped.
    pub fn as_select(&self, unparser: &SqlUnparser) -> SqlSelect {
        if let SqlNode::Select(select) = &self.node {
            return (**select).clone();
        }
        if !unparser.dialect.has_implicit_table_alias
            || (!unparser.dialect.supports_identical_table_and_column_name
                && unparser.table_column_identical)
        {
            return unparser.wrap_select(self.as_from());
        }
        unparser.wrap_select(self.node.clone())
    }

    /// View as a standalone statement: set operations stay as they are,
    /// everything else becomes a SELECT.
    pub fn as_statement(&self, unparser: &SqlUnparser) -> SqlNode {
        match self.node.op_kind() {
            Some(OpKind::Union | OpKind::Intersect | OpKind::Except) => self.node.clone(),
            _ => SqlNode::select(self.as_select(unparser)),
        }
    }

    /// View as a query or a VALUES clause, for sub-query positions.
    pub fn as_query_or_values(&self, unparser: &SqlUnparser) -> SqlNode {
        match self.node.op_kind() {
            Some(OpKind::Union | OpKind::Intersect | OpKind::Except | OpKind::Values) => {
                self.node.clone()
            }
            _ => SqlNode::select(self.as_select(unparser)),
        }
    }
}

fn references_any_identifier(node: &SqlNode, names: &[&str]) -> bool {
    match node {
        SqlNode::Identifier(id) => names.contains(&id.simple_name()),
        SqlNode::Call(call) => call.operands.iter().any(|o| references_any_identifier(o, names)),
        _ => false,
    }
}

/// Mutator for one in-progress SELECT. Created through
/// `SqlResult::builder` for exactly one parent node, consumed by
/// `result`. Setting a clause that was never declared is a contract
/// violation.
#[derive(Debug)]
pub struct SqlBuilder {
    pub clauses: Vec<Clause>,
    pub select: SqlSelect,
    pub context: Context,
    pub(crate) aliases: IndexMap<String, RowType>,
}

impl SqlBuilder {
    pub fn set_select(&mut self, select_list: Vec<SqlNode>) {
        self.select.select_list = Some(select_list);
    }

    pub fn set_where(&mut self, node: SqlNode) {
        assert!(self.clauses.contains(&Clause::Where), "WHERE was not declared");
        self.select.where_clause = Some(node);
    }

    pub fn set_group_by(&mut self, nodes: Vec<SqlNode>) {
        assert!(self.clauses.contains(&Clause::GroupBy), "GROUP BY was not declared");
        self.select.group_by = Some(nodes);
    }

    pub fn set_having(&mut self, node: SqlNode) {
        assert!(self.clauses.contains(&Clause::Having), "HAVING was not declared");
        self.select.having = Some(node);
    }

    pub fn set_qualify(&mut self, node: SqlNode) {
        assert!(self.clauses.contains(&Clause::Qualify), "QUALIFY was not declared");
        self.select.qualify = Some(node);
    }

    pub fn set_order_by(&mut self, nodes: Vec<SqlNode>) {
        assert!(self.clauses.contains(&Clause::OrderBy), "ORDER BY was not declared");
        self.select.order_by = Some(nodes);
    }

    pub fn set_fetch(&mut self, node: SqlNode) {
        assert!(self.clauses.contains(&Clause::Fetch), "FETCH was not declared");
        self.select.fetch = Some(node);
    }

    pub fn set_offset(&mut self, node: SqlNode) {
        assert!(self.clauses.contains(&Clause::Offset), "OFFSET was not declared");
        self.select.offset = Some(node);
    }

    /// Fixes the query, producing the parent's own result.
    pub fn result(self, unparser: &mut SqlUnparser, rel: &RelNode) -> SqlResult {
        let SqlBuilder { clauses, select, aliases, .. } = self;
        unparser.result_from(SqlNode::select(select), clauses, rel, Some(&aliases))
    }
}
