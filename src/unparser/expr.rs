use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::algebra::{
    AggregateCall, Direction, FieldCollation, LiteralValue, NullDirection, OpKind, Sarg,
    SargRange, ScalarExpr, SqlOperator, SubqueryKind, TypeFamily, WindowBound, WindowGroup,
    WindowSpec,
};
use crate::sql::{
    SqlCall, SqlCase, SqlIdentifier, SqlLiteral, SqlNode, SqlWindowBound, SqlWindowSpec,
};
use crate::unparser::{Context, JoinContext, SqlUnparser, UnparseError};

/// Logical inverses applied when NOT is pushed into its operand.
static NOT_INVERSE: Lazy<HashMap<OpKind, OpKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(OpKind::In, OpKind::NotIn);
    map.insert(OpKind::NotIn, OpKind::In);
    map.insert(OpKind::Like, OpKind::NotLike);
    map.insert(OpKind::NotLike, OpKind::Like);
    map.insert(OpKind::Similar, OpKind::NotSimilar);
    map.insert(OpKind::NotSimilar, OpKind::Similar);
    map
});

impl SqlUnparser {
    /// Translates one scalar expression under the given resolution context.
    pub fn expr_to_sql(&mut self, context: &Context, expr: &ScalarExpr) -> Result<SqlNode, UnparseError> {
        // Inside MATCH_RECOGNIZE definitions, string literals are pattern
        // variable names, not character data.
        if let Context::MatchRecognize(_) = context {
            if let ScalarExpr::Literal(LiteralValue::Char(name)) = expr {
                return Ok(SqlNode::identifier(name));
            }
        }
        match expr {
            ScalarExpr::LocalRef { index, exprs } => {
                let resolved = exprs
                    .get(*index)
                    .unwrap_or_else(|| panic!("local ref {} out of range", index))
                    .clone();
                self.expr_to_sql(context, &resolved)
            }
            ScalarExpr::ColumnRef(ordinal) => Ok(context.field(*ordinal)),
            ScalarExpr::Literal(value) => Ok(self.literal_to_sql(value)),
            ScalarExpr::DynamicParam(index) => Ok(SqlNode::DynamicParam(*index)),
            ScalarExpr::CorrelVariable(id) => {
                panic!("correlation variable {} must be dereferenced through a field access", id)
            }
            ScalarExpr::FieldAccess { .. } => self.field_access_to_sql(context, expr),
            ScalarExpr::PatternFieldRef { index, alpha } => {
                let node = context.field(*index);
                let SqlNode::Identifier(id) = node else {
                    panic!("pattern field reference must resolve to an identifier")
                };
                if id.names.len() > 1 {
                    Ok(SqlNode::Identifier(id.with_name(0, alpha)))
                } else {
                    Ok(SqlNode::Identifier(SqlIdentifier::qualified(&[alpha, id.simple_name()])))
                }
            }
            ScalarExpr::Over { op, operands, window, distinct } => {
                self.over_to_sql(context, op, operands, window, *distinct)
            }
            ScalarExpr::Subquery { kind, rel, operands } => {
                let result = self.visit(rel)?;
                let sub_query = result.as_query_or_values(self);
                match kind {
                    SubqueryKind::In => {
                        let left = if operands.len() == 1 {
                            self.expr_to_sql(context, &operands[0])?
                        } else {
                            // Multiple correlated operands form a row
                            // constructor on the left side.
                            let mut columns = Vec::new();
                            for operand in operands {
                                columns.push(self.expr_to_sql(context, operand)?);
                            }
                            SqlNode::call_of(OpKind::Row, columns)
                        };
                        Ok(SqlNode::call_of(OpKind::In, vec![left, sub_query]))
                    }
                    SubqueryKind::Exists => Ok(SqlNode::call_of(OpKind::Exists, vec![sub_query])),
                    SubqueryKind::Scalar => Ok(SqlNode::call_of(OpKind::ScalarQuery, vec![sub_query])),
                }
            }
            ScalarExpr::Call { op, operands, ty } => match op.kind {
                OpKind::Case => self.case_to_sql(context, operands),
                OpKind::Search => {
                    let operand_sql = self.expr_to_sql(context, &operands[0])?;
                    match operands.get(1) {
                        Some(ScalarExpr::Literal(LiteralValue::Sarg(sarg))) => {
                            Ok(self.sarg_to_sql(operand_sql, sarg))
                        }
                        other => panic!("SEARCH requires a sarg literal second operand, got {other:?}"),
                    }
                }
                OpKind::Not => self.negate_to_sql(context, &operands[0], true),
                OpKind::In | OpKind::NotIn => {
                    let first = self.expr_to_sql(context, &operands[0])?;
                    let mut rest = Vec::new();
                    for operand in &operands[1..] {
                        rest.push(self.expr_to_sql(context, operand)?);
                    }
                    Ok(SqlNode::call(op.clone(), vec![first, SqlNode::List(rest)]))
                }
                OpKind::IsTrue | OpKind::IsNotTrue => {
                    if !self.dialect.allow_is_true {
                        let substituted = self.dialect.substitute(op);
                        if substituted.name == op.name {
                            return UnparseError::unsupported(op.kind.default_name(), &self.dialect.name).err();
                        }
                        let mut nodes = Vec::new();
                        for operand in operands {
                            nodes.push(self.expr_to_sql(context, operand)?);
                        }
                        return Ok(SqlNode::call(substituted, nodes));
                    }
                    let mut nodes = Vec::new();
                    for operand in operands {
                        nodes.push(self.expr_to_sql(context, operand)?);
                    }
                    Ok(SqlNode::call(op.clone(), nodes))
                }
                _ => self.call_to_sql(context, op, operands, *ty),
            },
        }
    }

    /// Re-emits a run of nested field accesses outer-to-inner once the root
    /// is translated, so `a.b.c` comes out flat instead of right-nested.
    fn field_access_to_sql(&mut self, context: &Context, expr: &ScalarExpr) -> Result<SqlNode, UnparseError> {
        let mut accesses: Vec<(&str, usize)> = Vec::new();
        let mut root = expr;
        while let ScalarExpr::FieldAccess { expr: inner, field_name, field_index } = root {
            accesses.push((field_name.as_str(), *field_index));
            root = inner;
        }
        // accesses[0] is the outermost access, the last entry the innermost.
        let (mut node, skip_innermost) = match root {
            ScalarExpr::CorrelVariable(id) => {
                let correl_context = self
                    .correl_table
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| panic!("correlation variable {} is not registered", id));
                let (_, innermost_index) = *accesses.last().expect("field access chain");
                (correl_context.field(innermost_index), true)
            }
            other => (self.expr_to_sql(context, other)?, false),
        };
        let take = if skip_innermost { accesses.len() - 1 } else { accesses.len() };
        for (name, _) in accesses[..take].iter().rev() {
            node = append_field(node, name);
        }
        Ok(node)
    }

    /// NOT pushdown: double negation collapses, registered inverses replace
    /// the wrapping NOT, everything else keeps an explicit NOT call.
    fn negate_to_sql(&mut self, context: &Context, operand: &ScalarExpr, negate: bool) -> Result<SqlNode, UnparseError> {
        if let ScalarExpr::Call { op, operands, .. } = operand {
            if op.kind == OpKind::Not {
                return self.negate_to_sql(context, &operands[0], !negate);
            }
            if negate {
                if let Some(&inverse) = NOT_INVERSE.get(&op.kind) {
                    let mut nodes = Vec::new();
                    for inner in operands {
                        nodes.push(self.expr_to_sql(context, inner)?);
                    }
                    if matches!(inverse, OpKind::In | OpKind::NotIn) {
                        let first = nodes.remove(0);
                        return Ok(SqlNode::call_of(inverse, vec![first, SqlNode::List(nodes)]));
                    }
                    return Ok(SqlNode::call_of(inverse, nodes));
                }
            }
        }
        let node = self.expr_to_sql(context, operand)?;
        Ok(if negate {
            SqlNode::call_of(OpKind::Not, vec![node])
        } else {
            node
        })
    }

    fn call_to_sql(
        &mut self,
        context: &Context,
        op: &SqlOperator,
        operands: &[ScalarExpr],
        ty: TypeFamily,
    ) -> Result<SqlNode, UnparseError> {
        let operands = self.strip_comparison_casts(op, operands);
        let mut op = op.clone();
        match op.kind {
            OpKind::Sum0 => op = SqlOperator::std(OpKind::Sum),
            OpKind::Cast => {
                if ty == TypeFamily::Cursor {
                    // 'CAST($n): CURSOR' refers to the underlying column,
                    // not a real cast.
                    let ScalarExpr::ColumnRef(ordinal) = &operands[0] else {
                        panic!("cursor cast expects a column reference operand")
                    };
                    let field = context.field(*ordinal);
                    return Ok(SqlNode::call_of(OpKind::Cursor, vec![field]));
                }
                let node = self.expr_to_sql(context, &operands[0])?;
                let from = match &operands[0] {
                    ScalarExpr::Literal(value) => value.family(),
                    _ => TypeFamily::Any,
                };
                return Ok(self.dialect.cast_call(node, from, ty));
            }
            OpKind::Plus | OpKind::Minus | OpKind::OtherFunction => {
                op = self.dialect.substitute(&op);
            }
            _ => {}
        }
        let mut nodes = Vec::new();
        for operand in &operands {
            nodes.push(self.expr_to_sql(context, operand)?);
        }
        Ok(SqlNode::call(op, nodes))
    }

    /// Removes a cast around one comparison operand when the dialect
    /// coerces the bare literal implicitly: `x > CAST('2015-01-07' AS
    /// DATE)` becomes `x > '2015-01-07'`. Only one side may be a cast, so
    /// the strip never applies asymmetrically.
    fn strip_comparison_casts(&self, op: &SqlOperator, operands: &[ScalarExpr]) -> Vec<ScalarExpr> {
        if op.kind.is_comparison() && operands.len() == 2 {
            let is_cast =
                |e: &ScalarExpr| matches!(e, ScalarExpr::Call { op, .. } if op.kind == OpKind::Cast);
            if is_cast(&operands[0])
                && !is_cast(&operands[1])
                && self.dialect.supports_implicit_coercion_of(&operands[0])
            {
                if let ScalarExpr::Call { operands: inner, .. } = &operands[0] {
                    return vec![inner[0].clone(), operands[1].clone()];
                }
            }
            if is_cast(&operands[1])
                && !is_cast(&operands[0])
                && self.dialect.supports_implicit_coercion_of(&operands[1])
            {
                if let ScalarExpr::Call { operands: inner, .. } = &operands[1] {
                    return vec![operands[0].clone(), inner[0].clone()];
                }
            }
        }
        operands.to_vec()
    }

    fn case_to_sql(&mut self, context: &Context, operands: &[ScalarExpr]) -> Result<SqlNode, UnparseError> {
        let mut nodes = Vec::new();
        for operand in operands {
            nodes.push(self.expr_to_sql(context, operand)?);
        }
        let n = nodes.len();
        assert!(n >= 3, "CASE requires at least when, then and else parts");
        // An even node count means the switched form:
        //   CASE x WHEN v1 THEN t1 ... ELSE e END
        let (value, start) = if n % 2 == 0 {
            (Some(nodes[0].clone()), 1)
        } else {
            (None, 0)
        };
        let mut when_list = Vec::new();
        let mut then_list = Vec::new();
        let mut i = start;
        while i < n - 1 {
            when_list.push(nodes[i].clone());
            then_list.push(nodes[i + 1].clone());
            i += 2;
        }
        Ok(SqlNode::Case(Box::new(SqlCase {
            value,
            when_list,
            then_list,
            else_expr: Some(nodes[n - 1].clone()),
        })))
    }

    pub(crate) fn literal_to_sql(&self, value: &LiteralValue) -> SqlNode {
        let literal = match value {
            LiteralValue::Char(s) => SqlLiteral::CharString(s.clone()),
            LiteralValue::ExactNumeric(text) => SqlLiteral::ExactNumeric(text.clone()),
            LiteralValue::ApproxNumeric(n) => SqlLiteral::ApproxNumeric(n.into_inner().to_string()),
            LiteralValue::Bool(b) => SqlLiteral::Boolean(*b),
            LiteralValue::Interval { negative, value, qualifier } => SqlLiteral::Interval {
                sign: if *negative { -1 } else { 1 },
                value: value.clone(),
                qualifier: qualifier.clone(),
            },
            LiteralValue::Date(d) => self.dialect.date_literal(*d),
            LiteralValue::Time { value, precision } => self.dialect.time_literal(*value, *precision),
            LiteralValue::Timestamp { value, precision } => {
                self.dialect.timestamp_literal(*value, *precision)
            }
            LiteralValue::Null => SqlLiteral::Null,
            LiteralValue::Symbol(name) => SqlLiteral::Symbol(name.clone()),
            LiteralValue::Row(values) => {
                let nodes = values.iter().map(|v| self.literal_to_sql(v)).collect();
                return SqlNode::call_of(OpKind::Row, nodes);
            }
            LiteralValue::Sarg(sarg) => {
                panic!("sarg {:?} must be handled as part of a predicate, not as a literal", sarg)
            }
        };
        SqlNode::Literal(literal)
    }

    /// Decomposes a range set into the disjunction it denotes: `IS NULL`
    /// for the null marker, `=`/`IN` for point sets, bound comparisons for
    /// everything else.
    pub(crate) fn sarg_to_sql(&self, operand: SqlNode, sarg: &Sarg) -> SqlNode {
        let mut or_list = Vec::new();
        if sarg.contains_null {
            or_list.push(SqlNode::call_of(OpKind::IsNull, vec![operand.clone()]));
        }
        if sarg.is_points() {
            let values: Vec<SqlNode> = sarg
                .point_values()
                .into_iter()
                .map(|v| self.literal_to_sql(v))
                .collect();
            if values.len() == 1 {
                or_list.push(SqlNode::call_of(
                    OpKind::Equals,
                    vec![operand.clone(), values.into_iter().next().expect("one point")],
                ));
            } else {
                or_list.push(SqlNode::call_of(
                    OpKind::In,
                    vec![operand.clone(), SqlNode::List(values)],
                ));
            }
        } else {
            for range in &sarg.ranges {
                or_list.push(self.range_to_sql(&operand, range));
            }
        }
        assert!(!or_list.is_empty(), "empty sarg reached translation");
        if or_list.len() == 1 {
            or_list.into_iter().next().expect("single disjunct")
        } else {
            SqlNode::call_of(OpKind::Or, or_list)
        }
    }

    fn range_to_sql(&self, operand: &SqlNode, range: &SargRange) -> SqlNode {
        let bound = |kind: OpKind, value: &LiteralValue| {
            SqlNode::call_of(kind, vec![operand.clone(), self.literal_to_sql(value)])
        };
        let both = |low: SqlNode, high: SqlNode| SqlNode::call_of(OpKind::And, vec![low, high]);
        match range {
            SargRange::All => SqlNode::boolean(true),
            SargRange::Point(v) => bound(OpKind::Equals, v),
            SargRange::AtLeast(v) => bound(OpKind::GreaterThanOrEqual, v),
            SargRange::AtMost(v) => bound(OpKind::LessThanOrEqual, v),
            SargRange::GreaterThan(v) => bound(OpKind::GreaterThan, v),
            SargRange::LessThan(v) => bound(OpKind::LessThan, v),
            SargRange::Closed(lo, hi) => both(
                bound(OpKind::GreaterThanOrEqual, lo),
                bound(OpKind::LessThanOrEqual, hi),
            ),
            SargRange::ClosedOpen(lo, hi) => both(
                bound(OpKind::GreaterThanOrEqual, lo),
                bound(OpKind::LessThan, hi),
            ),
            SargRange::OpenClosed(lo, hi) => both(
                bound(OpKind::GreaterThan, lo),
                bound(OpKind::LessThanOrEqual, hi),
            ),
            SargRange::Open(lo, hi) => {
                both(bound(OpKind::GreaterThan, lo), bound(OpKind::LessThan, hi))
            }
        }
    }

    fn over_to_sql(
        &mut self,
        context: &Context,
        op: &SqlOperator,
        operands: &[ScalarExpr],
        window: &WindowSpec,
        distinct: bool,
    ) -> Result<SqlNode, UnparseError> {
        let mut partition_list = Vec::new();
        for key in &window.partition_keys {
            partition_list.push(self.expr_to_sql(context, key)?);
        }
        let mut order_list = Vec::new();
        for key in &window.order_keys {
            let node = self.expr_to_sql(context, &key.expr)?;
            self.push_order_node(&mut order_list, node, key.direction, key.null_direction);
        }
        let lower_bound = match &window.lower_bound {
            Some(bound) => Some(self.window_bound_to_sql(context, bound)?),
            None => None,
        };
        let upper_bound = match &window.upper_bound {
            Some(bound) => Some(self.window_bound_to_sql(context, bound)?),
            None => None,
        };
        let spec = SqlWindowSpec {
            partition_list,
            order_list,
            is_rows: window.is_rows,
            lower_bound,
            upper_bound,
        };
        let mut nodes = Vec::new();
        for operand in operands {
            nodes.push(self.expr_to_sql(context, operand)?);
        }
        Ok(over_call_node(op, nodes, spec, distinct))
    }

    fn window_bound_to_sql(&mut self, context: &Context, bound: &WindowBound) -> Result<SqlWindowBound, UnparseError> {
        Ok(match bound {
            WindowBound::CurrentRow => SqlWindowBound::CurrentRow,
            WindowBound::UnboundedPreceding => SqlWindowBound::UnboundedPreceding,
            WindowBound::UnboundedFollowing => SqlWindowBound::UnboundedFollowing,
            WindowBound::Preceding(offset) => {
                SqlWindowBound::Preceding(Box::new(self.expr_to_sql(context, offset)?))
            }
            WindowBound::Following(offset) => {
                SqlWindowBound::Following(Box::new(self.expr_to_sql(context, offset)?))
            }
        })
    }

    /// Translates the OVER calls of one window group, substituting the
    /// group's constants for field references past the input width.
    pub(crate) fn window_group_to_sql(
        &mut self,
        context: &Context,
        group: &WindowGroup,
        constants: &[LiteralValue],
        input_field_count: usize,
    ) -> Result<Vec<SqlNode>, UnparseError> {
        let mut partition_list = Vec::new();
        for &key in &group.keys {
            partition_list.push(context.field(key));
        }
        let mut order_list = Vec::new();
        for collation in &group.order_keys {
            self.add_order_item(&mut order_list, context, collation);
        }
        let lower_bound = match &group.lower_bound {
            Some(bound) => Some(self.window_bound_to_sql(context, bound)?),
            None => None,
        };
        let upper_bound = match &group.upper_bound {
            Some(bound) => Some(self.window_bound_to_sql(context, bound)?),
            None => None,
        };
        let mut overs = Vec::new();
        for agg in &group.agg_calls {
            let mut nodes = Vec::new();
            for operand in &agg.operands {
                let replaced = replace_constants(operand, constants, input_field_count);
                nodes.push(self.expr_to_sql(context, &replaced)?);
            }
            let spec = SqlWindowSpec {
                partition_list: partition_list.clone(),
                order_list: order_list.clone(),
                is_rows: group.is_rows,
                lower_bound: lower_bound.clone(),
                upper_bound: upper_bound.clone(),
            };
            overs.push(over_call_node(&agg.op, nodes, spec, agg.distinct));
        }
        Ok(overs)
    }

    /// Translates one aggregate call of an Aggregate node.
    pub(crate) fn agg_call_to_sql(&mut self, context: &Context, call: &AggregateCall) -> Result<SqlNode, UnparseError> {
        let operands: Vec<SqlNode> = call.args.iter().map(|&arg| context.field(arg)).collect();
        Ok(self.agg_parts_to_sql(context, &call.op, call.distinct, operands, call.filter_arg, &call.collation))
    }

    fn agg_parts_to_sql(
        &self,
        context: &Context,
        op: &SqlOperator,
        distinct: bool,
        operands: Vec<SqlNode>,
        filter_arg: Option<usize>,
        collation: &[FieldCollation],
    ) -> SqlNode {
        // SUM0 is SUM with empty groups mapped to zero.
        if op.kind == OpKind::Sum0 {
            let inner = self.agg_parts_to_sql(
                context,
                &SqlOperator::std(OpKind::Sum),
                distinct,
                operands,
                filter_arg,
                collation,
            );
            return SqlNode::call_of(
                OpKind::Coalesce,
                vec![inner, SqlNode::Literal(SqlLiteral::zero())],
            );
        }
        if let Some(filter) = filter_arg {
            if !self.dialect.supports_aggregate_function_filter {
                // agg(x) FILTER (WHERE b)    =>  agg(CASE WHEN b THEN x END)
                // COUNT(*) FILTER (WHERE b)  =>  COUNT(CASE WHEN b THEN 1 END)
                let when = context.field(filter);
                let then = operands
                    .first()
                    .cloned()
                    .unwrap_or(SqlNode::Literal(SqlLiteral::one()));
                let case = SqlNode::Case(Box::new(SqlCase::when_then(when, then)));
                let mut rewritten = vec![case];
                rewritten.extend(operands.into_iter().skip(1));
                return self.agg_parts_to_sql(context, op, distinct, rewritten, None, collation);
            }
        }
        let mut operands = operands;
        if op.kind == OpKind::Count && operands.is_empty() {
            operands.push(SqlNode::Identifier(SqlIdentifier::star()));
        }
        let call = SqlNode::Call(SqlCall { op: op.clone(), operands, distinct });
        let call = match filter_arg {
            Some(filter) => SqlNode::call_of(OpKind::Filter, vec![call, context.field(filter)]),
            None => call,
        };
        if collation.is_empty() {
            call
        } else {
            let mut order_list = Vec::new();
            for field_collation in collation {
                self.add_order_item(&mut order_list, context, field_collation);
            }
            SqlNode::call_of(OpKind::WithinGroup, vec![call, SqlNode::List(order_list)])
        }
    }

    /// Appends one ORDER BY item, emulating the null direction first when
    /// the dialect has no native NULLS FIRST/LAST.
    pub(crate) fn add_order_item(&self, order_list: &mut Vec<SqlNode>, context: &Context, collation: &FieldCollation) {
        let node = context.order_field(collation.field);
        self.push_order_node(order_list, node, collation.direction, collation.null_direction);
    }

    fn push_order_node(
        &self,
        order_list: &mut Vec<SqlNode>,
        node: SqlNode,
        direction: Direction,
        null_direction: NullDirection,
    ) {
        let mut null_direction = null_direction;
        if null_direction != NullDirection::Unspecified {
            let nulls_first = null_direction == NullDirection::First;
            if let Some(emulated) =
                self.dialect.emulate_null_direction(node.clone(), nulls_first, direction.is_descending())
            {
                order_list.push(emulated);
                null_direction = NullDirection::Unspecified;
            }
        }
        let mut node = node;
        if direction.is_descending() {
            node = SqlNode::call_of(OpKind::Desc, vec![node]);
        }
        if null_direction != NullDirection::Unspecified
            && null_direction != self.dialect.default_null_direction(direction)
        {
            node = match null_direction {
                NullDirection::First => SqlNode::call_of(OpKind::NullsFirst, vec![node]),
                NullDirection::Last => SqlNode::call_of(OpKind::NullsLast, vec![node]),
                NullDirection::Unspecified => node,
            };
        }
        order_list.push(node);
    }

    /// Translates a join condition. Flat AND/OR trees recurse; a two-sided
    /// comparison of plain column references resolves each side through its
    /// own context, flipping the operator when the operands arrive
    /// right-side-first; anything else goes through a join context.
    pub(crate) fn convert_condition(
        &mut self,
        condition: &ScalarExpr,
        left: &Context,
        right: &Context,
        left_field_count: usize,
    ) -> Result<SqlNode, UnparseError> {
        if condition.is_always_true() {
            return Ok(SqlNode::boolean(true));
        }
        if condition.is_always_false() {
            return Ok(SqlNode::boolean(false));
        }
        if let ScalarExpr::Call { op, operands, .. } = condition {
            match op.kind {
                OpKind::And | OpKind::Or => {
                    let mut nodes = Vec::new();
                    for operand in operands {
                        nodes.push(self.convert_condition(operand, left, right, left_field_count)?);
                    }
                    return Ok(SqlNode::call(op.clone(), nodes));
                }
                kind if kind.is_comparison()
                    || matches!(kind, OpKind::In | OpKind::NotIn | OpKind::Like | OpKind::Not) =>
                {
                    let operands = self.strip_comparison_casts(op, operands);
                    if let [ScalarExpr::ColumnRef(i0), ScalarExpr::ColumnRef(i1)] = operands.as_slice() {
                        if *i0 < left_field_count && *i1 >= left_field_count {
                            return Ok(SqlNode::call(
                                op.clone(),
                                vec![left.field(*i0), right.field(*i1 - left_field_count)],
                            ));
                        }
                        if *i1 < left_field_count && *i0 >= left_field_count {
                            return Ok(SqlNode::call(
                                op.reverse_direction(),
                                vec![left.field(*i1), right.field(*i0 - left_field_count)],
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
        let join_context = Context::Join(Box::new(JoinContext {
            left: left.clone(),
            right: right.clone(),
        }));
        self.expr_to_sql(&join_context, condition)
    }
}

fn append_field(node: SqlNode, name: &str) -> SqlNode {
    match node {
        SqlNode::Identifier(id) => {
            let mut names = id.names.clone();
            names.push(name.to_string());
            SqlNode::Identifier(SqlIdentifier::from_names(names))
        }
        other => SqlNode::call_of(OpKind::Dot, vec![other, SqlNode::identifier(name)]),
    }
}

fn over_call_node(op: &SqlOperator, operands: Vec<SqlNode>, window: SqlWindowSpec, distinct: bool) -> SqlNode {
    // SUM0(x) OVER w  =>  COALESCE(SUM(x) OVER w, 0)
    if op.kind == OpKind::Sum0 {
        let inner = over_call_node(&SqlOperator::std(OpKind::Sum), operands, window, distinct);
        return SqlNode::call_of(OpKind::Coalesce, vec![inner, SqlNode::Literal(SqlLiteral::zero())]);
    }
    let agg = SqlNode::Call(SqlCall { op: op.clone(), operands, distinct });
    SqlNode::call_of(OpKind::Over, vec![agg, SqlNode::Window(Box::new(window))])
}

/// Field references at or past the input width point into a window group's
/// constant pool.
fn replace_constants(expr: &ScalarExpr, constants: &[LiteralValue], input_field_count: usize) -> ScalarExpr {
    match expr {
        ScalarExpr::ColumnRef(i) if *i >= input_field_count => {
            ScalarExpr::Literal(constants[*i - input_field_count].clone())
        }
        ScalarExpr::Call { op, operands, ty } => ScalarExpr::Call {
            op: op.clone(),
            operands: operands
                .iter()
                .map(|operand| replace_constants(operand, constants, input_field_count))
                .collect(),
            ty: *ty,
        },
        other => other.clone(),
    }
}
