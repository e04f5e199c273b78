use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::algebra::{
    CorrelId, OpKind, RelNode, RowType, ScalarExpr, SetOpKind, SqlOperator,
};
use crate::dialect::Dialect;
use crate::sql::{SqlJoin, SqlNode, SqlSelect};
use crate::unparser::{
    alias::{derive_table_name, uniquify},
    AliasContext, Clause, Context, SqlResult, TableFunctionScanContext, UnparseError,
};

/// State for translating one algebra tree into one SQL statement. The
/// instance accumulates the statement's alias set and correlation table, so
/// it must not be reused across translations or shared between threads;
/// create one per call site instead.
pub struct SqlUnparser {
    pub dialect: Dialect,
    pub(crate) alias_set: HashSet<String>,
    pub(crate) correl_table: HashMap<CorrelId, Context>,
    pub(crate) column_remap: HashMap<String, SqlNode>,
    /// Whether the most recent result's row type reuses its table name as a
    /// column name (some dialects then force explicit aliases).
    pub(crate) table_column_identical: bool,
}

impl SqlUnparser {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            alias_set: HashSet::new(),
            correl_table: HashMap::new(),
            column_remap: HashMap::new(),
            table_column_identical: false,
        }
    }

    /// Translates a whole tree to a statement node.
    pub fn translate_root(&mut self, rel: &RelNode) -> Result<SqlNode, UnparseError> {
        debug!(root = rel.kind_name(), dialect = %self.dialect.name, "translating algebra tree");
        let result = self.visit(rel)?;
        Ok(result.as_statement(self))
    }

    /// Registers the context a correlation variable resolves through,
    /// performed by the enclosing translation when it introduces a
    /// correlated sub-query.
    pub fn register_correlation(&mut self, id: CorrelId, context: Context) {
        self.correl_table.insert(id, context);
    }

    /// Overrides resolution of one field name with a pre-built expression
    /// in every alias context created from now on.
    pub fn remap_column(&mut self, field_name: &str, node: SqlNode) {
        self.column_remap.insert(field_name.to_lowercase(), node);
    }

    pub(crate) fn alias_context(&self, aliases: IndexMap<String, RowType>, qualified: bool) -> Context {
        let mut context = AliasContext::new(aliases, qualified);
        context.column_remap = self.column_remap.clone();
        Context::Alias(context)
    }

    /// Context that always qualifies identifiers; used for join conditions
    /// where bare column names would be ambiguous.
    pub(crate) fn qualified_context(&self, result: &SqlResult) -> Context {
        self.alias_context(result.aliases.clone(), true)
    }

    pub(crate) fn visit(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        trace!(node = rel.kind_name(), "visit");
        match rel {
            RelNode::Scan { .. } => self.visit_scan(rel),
            RelNode::Filter { .. } => self.visit_filter(rel),
            RelNode::Project { .. } => self.visit_project(rel),
            RelNode::Aggregate { .. } => self.visit_aggregate(rel),
            RelNode::Join { .. } => self.visit_join(rel),
            RelNode::SetOp { .. } => self.visit_set_op(rel),
            RelNode::Sort { .. } => self.visit_sort(rel),
            RelNode::Window { .. } => self.visit_window(rel),
            RelNode::TableFunctionScan { .. } => self.visit_table_function_scan(rel),
            RelNode::Values { .. } => self.visit_values(rel),
        }
    }

    /// Visits the `i`th input of `parent`, declaring the clauses the parent
    /// intends to add on top of it.
    pub(crate) fn visit_input(
        &mut self,
        parent: &RelNode,
        i: usize,
        ignore_clauses: bool,
        expected_clauses: &[Clause],
    ) -> Result<SqlResult, UnparseError> {
        let result = self.visit(parent.input(i))?;
        Ok(result.with_expected_clauses(ignore_clauses, expected_clauses.to_vec()))
    }

    fn visit_scan(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Scan { table, .. } = rel else { unreachable!() };
        let names: Vec<&str> = table.iter().map(String::as_str).collect();
        let mut identifier = crate::sql::SqlIdentifier::qualified(&names);
        identifier.quoted = table.iter().any(|n| self.dialect.identifier_needs_quote(n));
        let node = SqlNode::Identifier(identifier);
        Ok(self.result_from(node, vec![Clause::From], rel, None))
    }

    fn visit_filter(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Filter { input, condition } = rel else { unreachable!() };
        let clause = if matches!(input.as_ref(), RelNode::Aggregate { .. }) {
            Clause::Having
        } else if self.dialect.supports_qualify_clause
            && matches!(input.as_ref(), RelNode::Project { exprs, .. }
                if exprs.iter().any(ScalarExpr::is_analytic))
            && !condition.is_analytic()
        {
            Clause::Qualify
        } else {
            Clause::Where
        };
        let x = self.visit_input(rel, 0, false, &[clause])?;
        let mut builder = x.builder(self, rel);
        let condition_sql = self.expr_to_sql(&builder.context, condition)?;
        match clause {
            Clause::Having => builder.set_having(condition_sql),
            Clause::Qualify => builder.set_qualify(condition_sql),
            _ => builder.set_where(condition_sql),
        }
        Ok(builder.result(self, rel))
    }

    fn visit_project(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Project { input, exprs, row_type } = rel else { unreachable!() };
        let x = self.visit_input(rel, 0, false, &[Clause::Select])?;
        let mut builder = x.builder(self, rel);
        if !is_star(exprs, input.row_type(), row_type) {
            let mut select_list = Vec::new();
            for expr in exprs {
                let node = self.expr_to_sql(&builder.context, expr)?;
                add_select(&mut select_list, node, row_type);
            }
            builder.set_select(select_list);
        }
        Ok(builder.result(self, rel))
    }

    fn visit_aggregate(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Aggregate { group_keys, agg_calls, row_type, .. } = rel else { unreachable!() };
        // The expected clause set is ignored for the wrap decision: GROUP BY
        // folds onto an input select list, resolving keys through it.
        let x = self.visit_input(rel, 0, true, &[Clause::GroupBy])?;
        let mut builder = x.builder(self, rel);
        let mut select_list = Vec::new();
        let mut group_list = Vec::new();
        for &key in group_keys {
            let field = builder.context.field(key);
            add_select(&mut select_list, field.clone(), row_type);
            group_list.push(field);
        }
        for call in agg_calls {
            let agg = self.agg_call_to_sql(&builder.context, call)?;
            add_select(&mut select_list, agg, row_type);
        }
        builder.set_select(select_list);
        if !group_list.is_empty() {
            builder.set_group_by(group_list);
        }
        Ok(builder.result(self, rel))
    }

    fn visit_join(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Join { left, kind, condition, .. } = rel else { unreachable!() };
        let left_result = self.visit_input(rel, 0, false, &[])?;
        let right_result = self.visit_input(rel, 1, false, &[])?;
        let left_context = self.qualified_context(&left_result);
        let right_context = self.qualified_context(&right_result);
        let condition_sql = self.convert_condition(
            condition,
            &left_context,
            &right_context,
            left.row_type().field_count(),
        )?;
        let join = SqlJoin {
            left: left_result.as_from(),
            join_type: (*kind).into(),
            right: right_result.as_from(),
            condition: Some(condition_sql),
        };
        Ok(self.result_from_join(SqlNode::Join(Box::new(join)), &left_result, &right_result))
    }

    fn visit_set_op(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::SetOp { kind, all, inputs, .. } = rel else { unreachable!() };
        assert!(!inputs.is_empty(), "set operation requires at least one input");
        let op = set_operator(*kind, *all);
        let mut node: Option<SqlNode> = None;
        for i in 0..inputs.len() {
            let result = self.visit_input(rel, i, false, &[])?;
            let arm = SqlNode::select(result.as_select(self));
            node = Some(match node {
                None => arm,
                Some(previous) => SqlNode::call(op.clone(), vec![previous, arm]),
            });
        }
        let node = node.expect("at least one set operation arm");
        Ok(self.result_from(node, vec![Clause::SetOp], rel, None))
    }

    fn visit_sort(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Sort { collation, offset, fetch, .. } = rel else { unreachable!() };
        let mut expected = vec![Clause::OrderBy];
        if fetch.is_some() {
            expected.push(Clause::Fetch);
        }
        if offset.is_some() {
            expected.push(Clause::Offset);
        }
        let x = self.visit_input(rel, 0, false, &expected)?;
        let mut builder = x.builder(self, rel);
        let mut order_list = Vec::new();
        for field_collation in collation {
            self.add_order_item(&mut order_list, &builder.context, field_collation);
        }
        if !order_list.is_empty() {
            builder.set_order_by(order_list);
        }
        if let Some(offset_expr) = offset {
            let node = self.expr_to_sql(&builder.context, offset_expr)?;
            builder.set_offset(node);
        }
        if let Some(fetch_expr) = fetch {
            let node = self.expr_to_sql(&builder.context, fetch_expr)?;
            builder.set_fetch(node);
        }
        Ok(builder.result(self, rel))
    }

    fn visit_window(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Window { input, groups, constants, row_type } = rel else { unreachable!() };
        let x = self.visit_input(rel, 0, false, &[Clause::Select])?;
        let mut builder = x.builder(self, rel);
        let input_field_count = input.row_type().field_count();
        let mut select_list = Vec::new();
        for ordinal in 0..input_field_count {
            let field = builder.context.field(ordinal);
            add_select(&mut select_list, field, row_type);
        }
        for group in groups {
            for over in self.window_group_to_sql(&builder.context, group, constants, input_field_count)? {
                add_select(&mut select_list, over, row_type);
            }
        }
        builder.set_select(select_list);
        Ok(builder.result(self, rel))
    }

    fn visit_table_function_scan(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::TableFunctionScan { inputs, call, .. } = rel else { unreachable!() };
        let mut input_nodes = Vec::new();
        for i in 0..inputs.len() {
            let result = self.visit_input(rel, i, false, &[])?;
            input_nodes.push(result.as_statement(self));
        }
        let context = Context::TableFunctionScan(TableFunctionScanContext { input_nodes });
        let call_sql = self.expr_to_sql(&context, call)?;
        let node = SqlNode::call_of(OpKind::CollectionTable, vec![call_sql]);
        Ok(self.result_from(node, vec![Clause::From], rel, None))
    }

    fn visit_values(&mut self, rel: &RelNode) -> Result<SqlResult, UnparseError> {
        let RelNode::Values { tuples, row_type } = rel else { unreachable!() };
        let field_names = row_type.field_names();
        if tuples.is_empty() {
            // No empty VALUES in SQL: an impossible WHERE keeps the row set
            // empty while preserving column names.
            let mut select = SqlSelect::default();
            select.select_list = Some(
                field_names
                    .iter()
                    .map(|name| SqlNode::aliased(SqlNode::Literal(crate::sql::SqlLiteral::Null), name, &[]))
                    .collect(),
            );
            select.where_clause = Some(SqlNode::call_of(
                OpKind::Equals,
                vec![
                    SqlNode::Literal(crate::sql::SqlLiteral::one()),
                    SqlNode::Literal(crate::sql::SqlLiteral::zero()),
                ],
            ));
            let node = SqlNode::select(select);
            return Ok(self.result_from(node, vec![Clause::Select, Clause::Where], rel, None));
        }
        let mut rows = Vec::new();
        for tuple in tuples {
            let mut row = Vec::new();
            for value in tuple {
                row.push(self.literal_to_sql(value));
            }
            rows.push(SqlNode::call_of(OpKind::Row, row));
        }
        let values_call = SqlNode::call_of(OpKind::Values, rows);
        let node = SqlNode::aliased(values_call, "t", &field_names);
        Ok(self.result_from(node, vec![Clause::Select], rel, None))
    }

    /// Creates a result for a single relational expression, deriving and
    /// uniquifying the alias it would need as a FROM item.
    pub(crate) fn result_from(
        &mut self,
        node: SqlNode,
        clauses: Vec<Clause>,
        rel: &RelNode,
        aliases: Option<&IndexMap<String, RowType>>,
    ) -> SqlResult {
        let alias2 = node.alias().map(str::to_string);
        let alias3 = alias2.clone().unwrap_or_else(|| "t".to_string());
        let alias4 = uniquify(&alias3, &mut self.alias_set);
        let table_name = derive_table_name(rel).unwrap_or_else(|| alias4.clone());
        let row_type = adjusted_row_type(rel, &node);
        self.table_column_identical = row_type.fields.iter().any(|f| f.name == table_name);

        if let Some(aliases) = aliases {
            if !aliases.is_empty()
                && (!self.dialect.has_implicit_table_alias
                    || (!self.dialect.supports_identical_table_and_column_name
                        && self.table_column_identical)
                    || aliases.len() > 1)
            {
                return SqlResult::new(node, clauses, Some(alias4), Some(row_type), aliases.clone());
            }
        }
        let alias5 = if alias2.as_deref() != Some(alias4.as_str())
            || !self.dialect.has_implicit_table_alias
            || (!self.dialect.supports_identical_table_and_column_name && self.table_column_identical)
        {
            Some(alias4.clone())
        } else {
            None
        };
        let mut alias_map = IndexMap::new();
        alias_map.insert(alias4, row_type.clone());
        SqlResult::new(node, clauses, alias5, Some(row_type), alias_map)
    }

    /// Result for a join node: FROM-item aliases of both sides, in
    /// left-to-right order.
    fn result_from_join(&mut self, node: SqlNode, left: &SqlResult, right: &SqlResult) -> SqlResult {
        let mut aliases = left.aliases.clone();
        for (alias, row_type) in &right.aliases {
            aliases.insert(alias.clone(), row_type.clone());
        }
        SqlResult::new(node, vec![Clause::From], None, None, aliases)
    }

    /// Wraps a node in `SELECT * FROM (node)`.
    pub(crate) fn wrap_select(&self, node: SqlNode) -> SqlSelect {
        assert!(
            matches!(
                &node,
                SqlNode::Identifier(_) | SqlNode::Join(_) | SqlNode::Select(_) | SqlNode::Call(_)
            ),
            "cannot use as a FROM item: {node}"
        );
        let node = if self.requires_alias(&node) {
            SqlNode::aliased(node, "t", &[])
        } else {
            node
        };
        SqlSelect::starred(node)
    }

    /// Whether this node needs an alias to serve as a FROM item.
    fn requires_alias(&self, node: &SqlNode) -> bool {
        if !self.dialect.requires_alias_for_from_items {
            return false;
        }
        match node {
            SqlNode::Identifier(_) => {
                !self.dialect.has_implicit_table_alias
                    || (!self.dialect.supports_identical_table_and_column_name
                        && self.table_column_identical)
            }
            SqlNode::Join(_) => false,
            SqlNode::Call(call) if call.op.kind == OpKind::As => false,
            _ => true,
        }
    }
}

/// Adds `node` to a select list under the output column name the row type
/// dictates, aliasing when the node would not already expose that name.
pub(crate) fn add_select(select_list: &mut Vec<SqlNode>, node: SqlNode, row_type: &RowType) {
    let name = &row_type.field(select_list.len()).name;
    let node = match node.alias() {
        Some(alias) if alias == name => node,
        _ => SqlNode::aliased(node, name, &[]),
    };
    select_list.push(node);
}

/// Whether a projection passes every input field through unchanged, in
/// order, under the same names.
pub(crate) fn is_star(exprs: &[ScalarExpr], input_row: &RowType, project_row: &RowType) -> bool {
    if exprs.len() != input_row.field_count() {
        return false;
    }
    for (i, expr) in exprs.iter().enumerate() {
        match expr {
            ScalarExpr::ColumnRef(ordinal) if *ordinal == i => {}
            _ => return false,
        }
    }
    input_row.field_names() == project_row.field_names()
}

fn set_operator(kind: SetOpKind, all: bool) -> SqlOperator {
    let op_kind = match kind {
        SetOpKind::Union => OpKind::Union,
        SetOpKind::Intersect => OpKind::Intersect,
        SetOpKind::Except => OpKind::Except,
    };
    let base = SqlOperator::std(op_kind);
    if all {
        let name = format!("{} ALL", base.name);
        base.with_name(&name)
    } else {
        base
    }
}

/// Row type of `rel` adjusted to the names `node` actually exposes, for
/// `(query) AS t (a, b)` and re-aliased select lists.
fn adjusted_row_type(rel: &RelNode, node: &SqlNode) -> RowType {
    let row_type = rel.row_type();
    match node {
        SqlNode::Call(call)
            if matches!(call.op.kind, OpKind::Union | OpKind::Intersect | OpKind::Except) =>
        {
            adjusted_row_type(rel, &call.operands[0])
        }
        SqlNode::Select(select) => match &select.select_list {
            None => row_type.clone(),
            Some(items) => {
                let mut adjusted = RowType::default();
                for (item, field) in items.iter().zip(&row_type.fields) {
                    let name = item.alias().unwrap_or(&field.name);
                    adjusted.fields.push(crate::algebra::RelField::new(name, field.family));
                }
                adjusted
            }
        },
        SqlNode::Call(call) if call.op.kind == OpKind::As && call.operands.len() > 2 => {
            let mut adjusted = RowType::default();
            for (operand, field) in call.operands[2..].iter().zip(&row_type.fields) {
                let name = operand
                    .as_identifier()
                    .map(|id| id.simple_name())
                    .unwrap_or(&field.name);
                adjusted.fields.push(crate::algebra::RelField::new(name, field.family));
            }
            adjusted
        }
        _ => row_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::TypeFamily;

    #[test]
    fn is_star_requires_order_names_and_count() {
        let row = RowType::from_pairs(&[
            ("a", TypeFamily::ExactNumeric),
            ("b", TypeFamily::Character),
        ]);
        let pass_through = vec![ScalarExpr::ColumnRef(0), ScalarExpr::ColumnRef(1)];
        assert!(is_star(&pass_through, &row, &row));

        let reordered = vec![ScalarExpr::ColumnRef(1), ScalarExpr::ColumnRef(0)];
        assert!(!is_star(&reordered, &row, &row));

        let renamed = RowType::from_pairs(&[
            ("a", TypeFamily::ExactNumeric),
            ("b2", TypeFamily::Character),
        ]);
        assert!(!is_star(&pass_through, &row, &renamed));

        let narrowed = vec![ScalarExpr::ColumnRef(0)];
        assert!(!is_star(&narrowed, &row, &row));
    }

    #[test]
    fn add_select_aliases_only_when_names_differ() {
        let row = RowType::from_pairs(&[
            ("c1", TypeFamily::ExactNumeric),
            ("s", TypeFamily::ExactNumeric),
        ]);
        let mut list = Vec::new();
        add_select(&mut list, SqlNode::identifier("c1"), &row);
        add_select(&mut list, SqlNode::call_of(OpKind::Sum, vec![SqlNode::identifier("c2")]), &row);
        assert_eq!(list[0].to_string(), "c1");
        assert_eq!(list[1].to_string(), "SUM(c2) AS s");
    }

    #[test]
    fn set_operator_all_variant_extends_name() {
        assert_eq!(set_operator(SetOpKind::Union, true).name, "UNION ALL");
        assert_eq!(set_operator(SetOpKind::Except, false).name, "EXCEPT");
    }
}
