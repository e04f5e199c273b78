pub mod fixtures {
    use indexmap::IndexMap;

    use crate::algebra::{
        AggregateCall, JoinKind, LiteralValue, OpKind, RelNode, RowType, ScalarExpr, SqlOperator,
        TypeFamily, WindowSpec,
    };
    use crate::dialect::Dialect;
    use crate::unparser::{AliasContext, Context, SqlUnparser};

    pub fn scan(name: &str, fields: &[(&str, TypeFamily)]) -> RelNode {
        RelNode::Scan {
            table: vec![name.to_string()],
            row_type: RowType::from_pairs(fields),
        }
    }

    /// `t(c1 numeric, c2 numeric)`, the work-horse table of these tests.
    pub fn scan_t() -> RelNode {
        scan("t", &[("c1", TypeFamily::ExactNumeric), ("c2", TypeFamily::ExactNumeric)])
    }

    pub fn col(ordinal: usize) -> ScalarExpr {
        ScalarExpr::ColumnRef(ordinal)
    }

    pub fn lit_i(value: i64) -> ScalarExpr {
        ScalarExpr::Literal(LiteralValue::int(value))
    }

    pub fn lit_s(value: &str) -> ScalarExpr {
        ScalarExpr::Literal(LiteralValue::string(value))
    }

    pub fn gt(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
        ScalarExpr::call_of(OpKind::GreaterThan, vec![left, right])
    }

    pub fn eq(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
        ScalarExpr::call_of(OpKind::Equals, vec![left, right])
    }

    pub fn row_number_over(partition_key: usize, order_key: usize) -> ScalarExpr {
        ScalarExpr::Over {
            op: SqlOperator::function("ROW_NUMBER"),
            operands: vec![],
            window: WindowSpec {
                partition_keys: vec![col(partition_key)],
                order_keys: vec![crate::algebra::WindowOrderKey {
                    expr: col(order_key),
                    direction: crate::algebra::Direction::Ascending,
                    null_direction: crate::algebra::NullDirection::Unspecified,
                }],
                is_rows: false,
                lower_bound: None,
                upper_bound: None,
            },
            distinct: false,
        }
    }

    pub fn project(input: RelNode, exprs: Vec<ScalarExpr>, fields: &[(&str, TypeFamily)]) -> RelNode {
        RelNode::Project {
            input: Box::new(input),
            exprs,
            row_type: RowType::from_pairs(fields),
        }
    }

    /// `GROUP BY c1, SUM(c2) AS s` over its input.
    pub fn sum_aggregate(input: RelNode) -> RelNode {
        RelNode::Aggregate {
            input: Box::new(input),
            group_keys: vec![0],
            agg_calls: vec![AggregateCall::new(SqlOperator::std(OpKind::Sum), vec![1])],
            row_type: RowType::from_pairs(&[
                ("c1", TypeFamily::ExactNumeric),
                ("s", TypeFamily::ExactNumeric),
            ]),
        }
    }

    pub fn inner_join(left: RelNode, right: RelNode, condition: ScalarExpr) -> RelNode {
        let row_type = RowType::concat(left.row_type(), right.row_type());
        RelNode::Join {
            left: Box::new(left),
            right: Box::new(right),
            kind: JoinKind::Inner,
            condition,
            row_type,
        }
    }

    /// Dialect from the end-to-end scenario: no nested aggregation, GROUP BY
    /// aliases not resolved.
    pub fn plain_dialect() -> Dialect {
        Dialect {
            supports_nested_aggregations: false,
            group_by_alias: false,
            ..Dialect::ansi()
        }
    }

    pub fn translate(dialect: Dialect, rel: &RelNode) -> String {
        SqlUnparser::new(dialect)
            .translate_root(rel)
            .expect("translation should succeed")
            .to_string()
    }

    /// A free-standing alias context over one table, for expression-level
    /// tests.
    pub fn table_context(alias: &str, fields: &[(&str, TypeFamily)]) -> Context {
        let mut aliases = IndexMap::new();
        aliases.insert(alias.to_string(), RowType::from_pairs(fields));
        Context::Alias(AliasContext::new(aliases, false))
    }
}

mod statement_shapes {
    use super::fixtures::*;
    use crate::algebra::{
        Direction, FieldCollation, LiteralValue, NullDirection, OpKind, RelNode, RowType,
        ScalarExpr, SetOpKind, TypeFamily,
    };
    use crate::dialect::Dialect;

    #[test]
    fn project_over_scan_selects_columns() {
        let rel = project(scan_t(), vec![col(0)], &[("c1", TypeFamily::ExactNumeric)]);
        assert_eq!(translate(plain_dialect(), &rel), "SELECT c1 FROM t");
    }

    #[test]
    fn filter_over_scan_becomes_where() {
        let rel = RelNode::Filter {
            input: Box::new(scan_t()),
            condition: gt(col(0), lit_i(10)),
        };
        assert_eq!(translate(plain_dialect(), &rel), "SELECT * FROM t WHERE c1 > 10");
    }

    #[test]
    fn project_aggregate_scan_folds_into_one_select() {
        // Project(Aggregate(Scan t)) on a dialect that forbids nested
        // aggregation and does not resolve GROUP BY aliases.
        let rel = project(
            sum_aggregate(scan_t()),
            vec![col(0), col(1)],
            &[("c1", TypeFamily::ExactNumeric), ("s", TypeFamily::ExactNumeric)],
        );
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT c1, SUM(c2) AS s FROM t GROUP BY c1"
        );
    }

    #[test]
    fn sort_after_aggregate_appends_order_by_without_wrap() {
        let rel = RelNode::Sort {
            input: Box::new(project(
                sum_aggregate(scan_t()),
                vec![col(0), col(1)],
                &[("c1", TypeFamily::ExactNumeric), ("s", TypeFamily::ExactNumeric)],
            )),
            collation: vec![FieldCollation::new(1, Direction::Descending)],
            offset: None,
            fetch: None,
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT c1, SUM(c2) AS s FROM t GROUP BY c1 ORDER BY s DESC"
        );
    }

    #[test]
    fn filter_over_aggregate_becomes_having() {
        let rel = RelNode::Filter {
            input: Box::new(sum_aggregate(scan_t())),
            condition: gt(col(1), lit_i(100)),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT c1, SUM(c2) AS s FROM t GROUP BY c1 HAVING SUM(c2) > 100"
        );
    }

    #[test]
    fn where_after_group_by_wraps_into_sub_query() {
        // The pass-through projection keeps the aggregate's SELECT; a WHERE
        // on top of it must wrap because WHERE evaluates before GROUP BY.
        let rel = RelNode::Filter {
            input: Box::new(project(
                sum_aggregate(scan_t()),
                vec![col(0), col(1)],
                &[("c1", TypeFamily::ExactNumeric), ("s", TypeFamily::ExactNumeric)],
            )),
            condition: gt(col(1), lit_i(100)),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM (SELECT c1, SUM(c2) AS s FROM t GROUP BY c1) AS t1 WHERE s > 100"
        );
    }

    #[test]
    fn sort_with_fetch_and_offset() {
        let rel = RelNode::Sort {
            input: Box::new(scan_t()),
            collation: vec![FieldCollation::new(0, Direction::Ascending)],
            offset: Some(lit_i(10)),
            fetch: Some(lit_i(5)),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM t ORDER BY c1 OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn union_all_keeps_arms_unwrapped() {
        let rel = RelNode::SetOp {
            kind: SetOpKind::Union,
            all: true,
            inputs: vec![
                scan("a", &[("x", TypeFamily::ExactNumeric)]),
                scan("b", &[("x", TypeFamily::ExactNumeric)]),
            ],
            row_type: RowType::from_pairs(&[("x", TypeFamily::ExactNumeric)]),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM a UNION ALL SELECT * FROM b"
        );
    }

    #[test]
    fn sort_directly_over_intersect_wraps() {
        let rel = RelNode::Sort {
            input: Box::new(RelNode::SetOp {
                kind: SetOpKind::Intersect,
                all: false,
                inputs: vec![
                    scan("a", &[("x", TypeFamily::ExactNumeric)]),
                    scan("b", &[("x", TypeFamily::ExactNumeric)]),
                ],
                row_type: RowType::from_pairs(&[("x", TypeFamily::ExactNumeric)]),
            }),
            collation: vec![FieldCollation::new(0, Direction::Descending)],
            offset: None,
            fetch: None,
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM (SELECT * FROM a INTERSECT SELECT * FROM b) AS t ORDER BY x DESC"
        );
    }

    #[test]
    fn values_render_with_row_constructors_and_column_aliases() {
        let rel = RelNode::Values {
            tuples: vec![
                vec![LiteralValue::int(1), LiteralValue::string("a")],
                vec![LiteralValue::int(2), LiteralValue::string("b")],
            ],
            row_type: RowType::from_pairs(&[
                ("id", TypeFamily::ExactNumeric),
                ("name", TypeFamily::Character),
            ]),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM (VALUES (1, 'a'), (2, 'b')) AS t (id, name)"
        );
    }

    #[test]
    fn empty_values_become_an_impossible_where() {
        let rel = RelNode::Values {
            tuples: vec![],
            row_type: RowType::from_pairs(&[("id", TypeFamily::ExactNumeric)]),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT NULL AS id WHERE 1 = 0"
        );
    }

    #[test]
    fn table_function_scan_renders_table_call() {
        let rel = RelNode::TableFunctionScan {
            inputs: vec![],
            call: ScalarExpr::call(
                crate::algebra::SqlOperator::function("RAMP"),
                vec![lit_i(3)],
            ),
            row_type: RowType::from_pairs(&[("i", TypeFamily::ExactNumeric)]),
        };
        assert_eq!(translate(plain_dialect(), &rel), "SELECT * FROM TABLE(RAMP(3))");
    }

    #[test]
    fn window_node_appends_over_calls_to_input_fields() {
        let rel = RelNode::Window {
            input: Box::new(scan_t()),
            groups: vec![crate::algebra::WindowGroup {
                keys: vec![0],
                order_keys: vec![FieldCollation::new(1, Direction::Ascending)],
                is_rows: false,
                lower_bound: None,
                upper_bound: None,
                agg_calls: vec![crate::algebra::WindowAggCall {
                    op: crate::algebra::SqlOperator::std(OpKind::Sum),
                    operands: vec![col(1)],
                    distinct: false,
                }],
            }],
            constants: vec![],
            row_type: RowType::from_pairs(&[
                ("c1", TypeFamily::ExactNumeric),
                ("c2", TypeFamily::ExactNumeric),
                ("w", TypeFamily::ExactNumeric),
            ]),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT c1, c2, SUM(c2) OVER (PARTITION BY c1 ORDER BY c2) AS w FROM t"
        );
    }

    #[test]
    fn null_direction_uses_keywords_or_emulation() {
        let sorted = |dialect: Dialect| {
            translate(
                dialect,
                &RelNode::Sort {
                    input: Box::new(scan_t()),
                    collation: vec![FieldCollation::with_nulls(
                        0,
                        Direction::Ascending,
                        NullDirection::First,
                    )],
                    offset: None,
                    fetch: None,
                },
            )
        };
        assert_eq!(
            sorted(plain_dialect()),
            "SELECT * FROM t ORDER BY c1 NULLS FIRST"
        );
        let emulating = Dialect { supports_nulls_ordering: false, ..plain_dialect() };
        assert_eq!(
            sorted(emulating),
            "SELECT * FROM t ORDER BY c1 IS NULL DESC, c1"
        );
    }
}

mod joins {
    use super::fixtures::*;
    use crate::algebra::{OpKind, ScalarExpr, TypeFamily};

    fn ab_join(condition: ScalarExpr) -> crate::algebra::RelNode {
        inner_join(
            scan("a", &[
                ("x", TypeFamily::ExactNumeric),
                ("y", TypeFamily::ExactNumeric),
                ("z", TypeFamily::ExactNumeric),
            ]),
            scan("b", &[("d", TypeFamily::ExactNumeric), ("e", TypeFamily::ExactNumeric)]),
            condition,
        )
    }

    #[test]
    fn condition_splits_between_left_and_right_contexts() {
        let rel = ab_join(eq(col(0), col(3)));
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM a INNER JOIN b ON a.x = b.d"
        );
    }

    #[test]
    fn reversed_operands_flip_the_comparison() {
        // z of a (ordinal 4 is b.e, ordinal 2 is a.z): operands arrive
        // right-side-first, so the operator direction flips.
        let rel = ab_join(ScalarExpr::call_of(OpKind::GreaterThan, vec![col(4), col(2)]));
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM a INNER JOIN b ON a.z < b.e"
        );
    }

    #[test]
    fn always_true_condition_renders_boolean() {
        let rel = ab_join(ScalarExpr::Literal(crate::algebra::LiteralValue::Bool(true)));
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM a INNER JOIN b ON TRUE"
        );
    }

    #[test]
    fn self_join_aliases_stay_unique() {
        let rel = inner_join(scan_t(), scan_t(), eq(col(0), col(2)));
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT * FROM t INNER JOIN t AS t0 ON t.c1 = t0.c1"
        );
    }
}

mod analytic_merges {
    use super::fixtures::*;
    use crate::algebra::{RelNode, TypeFamily};
    use crate::dialect::Dialect;

    fn filtered_ranking(condition_analytic: bool) -> RelNode {
        let projected = project(
            scan("t1", &[
                ("c1", TypeFamily::Character),
                ("c2", TypeFamily::ExactNumeric),
                ("c3", TypeFamily::Character),
            ]),
            vec![col(0), row_number_over(0, 1)],
            &[("c1", TypeFamily::Character), ("rnk", TypeFamily::ExactNumeric)],
        );
        let condition = if condition_analytic {
            eq(row_number_over(0, 1), lit_i(1))
        } else {
            eq(col(1), lit_i(1))
        };
        RelNode::Filter { input: Box::new(projected), condition }
    }

    #[test]
    fn filter_over_analytic_project_merges_as_qualify() {
        let dialect = Dialect { supports_qualify_clause: true, ..plain_dialect() };
        assert_eq!(
            translate(dialect, &filtered_ranking(false)),
            "SELECT c1, ROW_NUMBER() OVER (PARTITION BY c1 ORDER BY c2) AS rnk FROM t1 \
             QUALIFY ROW_NUMBER() OVER (PARTITION BY c1 ORDER BY c2) = 1"
        );
    }

    #[test]
    fn filter_without_qualify_support_wraps() {
        assert_eq!(
            translate(plain_dialect(), &filtered_ranking(false)),
            "SELECT * FROM (SELECT c1, ROW_NUMBER() OVER (PARTITION BY c1 ORDER BY c2) AS rnk \
             FROM t1) AS t WHERE rnk = 1"
        );
    }

    #[test]
    fn analytic_filter_predicate_disables_the_qualify_merge() {
        let dialect = Dialect { supports_qualify_clause: true, ..plain_dialect() };
        assert_eq!(
            translate(dialect, &filtered_ranking(true)),
            "SELECT * FROM (SELECT c1, ROW_NUMBER() OVER (PARTITION BY c1 ORDER BY c2) AS rnk \
             FROM t1) AS t WHERE ROW_NUMBER() OVER (PARTITION BY c1 ORDER BY rnk) = 1"
        );
    }

    #[test]
    fn nested_aggregation_forces_a_sub_query() {
        // SUM over an aggregated column, on a dialect without nested
        // aggregation support.
        let rel = crate::algebra::RelNode::Aggregate {
            input: Box::new(sum_aggregate(scan_t())),
            group_keys: vec![],
            agg_calls: vec![crate::algebra::AggregateCall::new(
                crate::algebra::SqlOperator::std(crate::algebra::OpKind::Sum),
                vec![1],
            )],
            row_type: crate::algebra::RowType::from_pairs(&[("total", TypeFamily::ExactNumeric)]),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT SUM(s) AS total FROM (SELECT c1, SUM(c2) AS s FROM t GROUP BY c1) AS t0"
        );
    }
}

mod expressions {
    use super::fixtures::*;
    use crate::algebra::{
        LiteralValue, OpKind, Sarg, SargRange, ScalarExpr, SqlOperator, SubqueryKind, TypeFamily,
    };
    use crate::dialect::Dialect;
    use crate::unparser::SqlUnparser;

    fn to_sql(dialect: Dialect, expr: &ScalarExpr) -> String {
        let context = table_context("t", &[
            ("x", TypeFamily::ExactNumeric),
            ("b", TypeFamily::Boolean),
        ]);
        SqlUnparser::new(dialect)
            .expr_to_sql(&context, expr)
            .expect("expression translation")
            .to_string()
    }

    fn search(sarg: Sarg) -> ScalarExpr {
        ScalarExpr::call_of(OpKind::Search, vec![
            col(0),
            ScalarExpr::Literal(LiteralValue::Sarg(sarg)),
        ])
    }

    #[test]
    fn sarg_points_become_in_list() {
        let sarg = Sarg::points(vec![
            LiteralValue::int(1),
            LiteralValue::int(2),
            LiteralValue::int(3),
        ]);
        assert_eq!(to_sql(plain_dialect(), &search(sarg)), "x IN (1, 2, 3)");
    }

    #[test]
    fn sarg_single_point_becomes_equals() {
        let sarg = Sarg::points(vec![LiteralValue::int(5)]);
        assert_eq!(to_sql(plain_dialect(), &search(sarg)), "x = 5");
    }

    #[test]
    fn sarg_open_interval_becomes_greater_than() {
        let sarg = Sarg::new(false, vec![SargRange::GreaterThan(LiteralValue::int(3))]);
        assert_eq!(to_sql(plain_dialect(), &search(sarg)), "x > 3");
    }

    #[test]
    fn sarg_closed_interval_becomes_bound_conjunction() {
        let sarg = Sarg::new(false, vec![SargRange::Closed(LiteralValue::int(1), LiteralValue::int(5))]);
        assert_eq!(to_sql(plain_dialect(), &search(sarg)), "x >= 1 AND x <= 5");
    }

    #[test]
    fn sarg_with_null_marker_adds_is_null_disjunct() {
        let sarg = Sarg::new(
            true,
            vec![
                SargRange::Point(LiteralValue::int(1)),
                SargRange::Point(LiteralValue::int(2)),
            ],
        );
        assert_eq!(to_sql(plain_dialect(), &search(sarg)), "x IS NULL OR x IN (1, 2)");
    }

    #[test]
    fn sarg_interval_union_is_ored() {
        let sarg = Sarg::new(
            false,
            vec![
                SargRange::LessThan(LiteralValue::int(0)),
                SargRange::Closed(LiteralValue::int(10), LiteralValue::int(20)),
            ],
        );
        assert_eq!(
            to_sql(plain_dialect(), &search(sarg)),
            "x < 0 OR x >= 10 AND x <= 20"
        );
    }

    #[test]
    #[should_panic(expected = "SEARCH")]
    fn sarg_literal_outside_search_is_fatal() {
        let expr = ScalarExpr::Literal(LiteralValue::Sarg(Sarg::points(vec![LiteralValue::int(1)])));
        let _ = to_sql(plain_dialect(), &expr);
    }

    #[test]
    fn not_like_uses_registered_inverse() {
        let expr = ScalarExpr::call_of(OpKind::Not, vec![
            ScalarExpr::call_of(OpKind::Like, vec![col(0), lit_s("A%")]),
        ]);
        assert_eq!(to_sql(plain_dialect(), &expr), "x NOT LIKE 'A%'");
    }

    #[test]
    fn double_negation_collapses() {
        let plain = gt(col(0), lit_i(1));
        let doubled = ScalarExpr::call_of(OpKind::Not, vec![
            ScalarExpr::call_of(OpKind::Not, vec![plain.clone()]),
        ]);
        assert_eq!(to_sql(plain_dialect(), &doubled), to_sql(plain_dialect(), &plain));
    }

    #[test]
    fn negation_without_inverse_keeps_not() {
        let expr = ScalarExpr::call_of(OpKind::Not, vec![gt(col(0), lit_i(1))]);
        assert_eq!(to_sql(plain_dialect(), &expr), "NOT x > 1");
    }

    #[test]
    fn implicit_coercion_strips_literal_cast_in_comparison() {
        let expr = gt(
            col(0),
            ScalarExpr::cast(lit_s("2015-01-07"), TypeFamily::Date),
        );
        assert_eq!(to_sql(plain_dialect(), &expr), "x > '2015-01-07'");

        let strict = Dialect { supports_implicit_type_coercion: false, ..plain_dialect() };
        assert_eq!(to_sql(strict, &expr), "x > CAST('2015-01-07' AS DATE)");
    }

    #[test]
    fn cursor_cast_references_underlying_column() {
        let expr = ScalarExpr::cast(col(0), TypeFamily::Cursor);
        assert_eq!(to_sql(plain_dialect(), &expr), "CURSOR(x)");
    }

    #[test]
    fn sum0_becomes_sum() {
        let expr = ScalarExpr::call_of(OpKind::Sum0, vec![col(0)]);
        assert_eq!(to_sql(plain_dialect(), &expr), "SUM(x)");
    }

    #[test]
    fn sum0_over_window_coalesces_to_zero() {
        let expr = ScalarExpr::Over {
            op: SqlOperator::std(OpKind::Sum0),
            operands: vec![col(0)],
            window: crate::algebra::WindowSpec::default(),
            distinct: false,
        };
        assert_eq!(to_sql(plain_dialect(), &expr), "COALESCE(SUM(x) OVER (), 0)");
    }

    #[test]
    fn switched_case_reconstructs_value_form() {
        // Even operand count: CASE x WHEN 1 THEN 'one' ELSE 'other' END.
        let expr = ScalarExpr::call_of(OpKind::Case, vec![
            col(0),
            lit_i(1),
            lit_s("one"),
            lit_s("other"),
        ]);
        assert_eq!(
            to_sql(plain_dialect(), &expr),
            "CASE x WHEN 1 THEN 'one' ELSE 'other' END"
        );
    }

    #[test]
    fn boolean_case_reconstructs_when_form() {
        let expr = ScalarExpr::call_of(OpKind::Case, vec![
            gt(col(0), lit_i(0)),
            lit_s("pos"),
            lit_s("neg"),
        ]);
        assert_eq!(
            to_sql(plain_dialect(), &expr),
            "CASE WHEN x > 0 THEN 'pos' ELSE 'neg' END"
        );
    }

    #[test]
    fn in_subquery_translates_nested_statement() {
        let sub = project(
            scan("u", &[("uid", TypeFamily::ExactNumeric), ("created", TypeFamily::Date)]),
            vec![col(0)],
            &[("uid", TypeFamily::ExactNumeric)],
        );
        let expr = ScalarExpr::Subquery {
            kind: SubqueryKind::In,
            rel: Box::new(sub),
            operands: vec![col(0)],
        };
        assert_eq!(to_sql(plain_dialect(), &expr), "x IN (SELECT uid FROM u)");
    }

    #[test]
    fn multi_operand_in_subquery_builds_row_constructor() {
        let sub = project(
            scan("u", &[
                ("a", TypeFamily::ExactNumeric),
                ("b", TypeFamily::Boolean),
                ("c", TypeFamily::Character),
            ]),
            vec![col(0), col(1)],
            &[("a", TypeFamily::ExactNumeric), ("b", TypeFamily::Boolean)],
        );
        let expr = ScalarExpr::Subquery {
            kind: SubqueryKind::In,
            rel: Box::new(sub),
            operands: vec![col(0), col(1)],
        };
        assert_eq!(to_sql(plain_dialect(), &expr), "(x, b) IN (SELECT a, b FROM u)");
    }

    #[test]
    fn exists_subquery_wraps_statement() {
        let sub = scan("u", &[("uid", TypeFamily::ExactNumeric)]);
        let expr = ScalarExpr::Subquery {
            kind: SubqueryKind::Exists,
            rel: Box::new(sub),
            operands: vec![],
        };
        assert_eq!(to_sql(plain_dialect(), &expr), "EXISTS (SELECT * FROM u)");
    }

    #[test]
    fn dynamic_param_renders_marker() {
        let expr = eq(col(0), ScalarExpr::DynamicParam(0));
        assert_eq!(to_sql(plain_dialect(), &expr), "x = ?");
    }

    #[test]
    fn is_true_without_support_needs_substitution() {
        let expr = ScalarExpr::call_of(OpKind::IsTrue, vec![col(1)]);
        let strict = Dialect { allow_is_true: false, ..plain_dialect() };
        let err = SqlUnparser::new(strict.clone())
            .expr_to_sql(
                &table_context("t", &[("x", TypeFamily::ExactNumeric), ("b", TypeFamily::Boolean)]),
                &expr,
            )
            .expect_err("IS TRUE should be rejected");
        assert_eq!(
            err.to_string(),
            "UnparseError: 'IS TRUE' cannot be expressed in dialect 'ANSI'"
        );

        let substituting = strict.with_substitution("IS TRUE", "= TRUE");
        let node = crate::unparser::SqlUnparser::new(substituting)
            .expr_to_sql(
                &table_context("t", &[("x", TypeFamily::ExactNumeric), ("b", TypeFamily::Boolean)]),
                &expr,
            )
            .expect("substituted IS TRUE");
        assert_eq!(node.as_call().expect("call").op.name, "= TRUE");
    }

    #[test]
    fn operator_substitution_renames_functions() {
        let dialect = plain_dialect().with_substitution("SUBSTRING", "SUBSTR");
        let expr = ScalarExpr::call(
            SqlOperator::function("SUBSTRING"),
            vec![col(0), lit_i(1), lit_i(2)],
        );
        assert_eq!(to_sql(dialect, &expr), "SUBSTR(x, 1, 2)");
    }

    #[test]
    fn match_recognize_context_turns_string_literals_into_pattern_variables() {
        let inner = match table_context("t", &[("price", TypeFamily::ExactNumeric)]) {
            crate::unparser::Context::Alias(ctx) => ctx,
            _ => unreachable!(),
        };
        let context = crate::unparser::Context::MatchRecognize(inner);
        let node = SqlUnparser::new(plain_dialect())
            .expr_to_sql(&context, &lit_s("DOWN"))
            .expect("pattern variable");
        assert_eq!(node, crate::sql::SqlNode::identifier("DOWN"));
    }

    #[test]
    fn pattern_field_ref_prefixes_the_alternation_label() {
        let expr = ScalarExpr::PatternFieldRef { index: 0, alpha: "DOWN".to_string() };
        assert_eq!(to_sql(plain_dialect(), &expr), "DOWN.x");
    }

    #[test]
    fn local_ref_resolves_through_shared_expression_list() {
        let shared = std::sync::Arc::new(vec![gt(col(0), lit_i(7))]);
        let expr = ScalarExpr::LocalRef { index: 0, exprs: shared };
        assert_eq!(to_sql(plain_dialect(), &expr), "x > 7");
    }

    #[test]
    fn interval_literal_keeps_sign_and_qualifier() {
        let expr = ScalarExpr::Literal(LiteralValue::Interval {
            negative: true,
            value: "3".to_string(),
            qualifier: "DAY".to_string(),
        });
        assert_eq!(to_sql(plain_dialect(), &expr), "INTERVAL -'3' DAY");
    }

    #[test]
    fn temporal_literals_follow_the_dialect_factory() {
        let date = chrono::NaiveDate::from_ymd_opt(2015, 1, 7).expect("date");
        let expr = ScalarExpr::Literal(LiteralValue::Date(date));
        assert_eq!(to_sql(plain_dialect(), &expr), "DATE '2015-01-07'");

        let stringly = Dialect { datetime_literals_as_strings: true, ..plain_dialect() };
        assert_eq!(to_sql(stringly, &expr), "'2015-01-07'");
    }

    #[test]
    fn field_access_chain_renders_flat() {
        let expr = ScalarExpr::FieldAccess {
            expr: Box::new(ScalarExpr::FieldAccess {
                expr: Box::new(col(0)),
                field_name: "b".to_string(),
                field_index: 0,
            }),
            field_name: "c".to_string(),
            field_index: 0,
        };
        assert_eq!(to_sql(plain_dialect(), &expr), "x.b.c");
    }
}

mod correlation {
    use super::fixtures::*;
    use crate::algebra::{CorrelId, ScalarExpr, TypeFamily};
    use crate::unparser::SqlUnparser;

    #[test]
    fn correlation_variable_resolves_through_registered_context() {
        let mut unparser = SqlUnparser::new(plain_dialect());
        let outer = {
            let mut aliases = indexmap::IndexMap::new();
            aliases.insert(
                "emp".to_string(),
                crate::algebra::RowType::from_pairs(&[("deptno", TypeFamily::ExactNumeric)]),
            );
            crate::unparser::Context::Alias(crate::unparser::AliasContext::new(aliases, true))
        };
        unparser.register_correlation(CorrelId(0), outer);

        let expr = ScalarExpr::FieldAccess {
            expr: Box::new(ScalarExpr::CorrelVariable(CorrelId(0))),
            field_name: "deptno".to_string(),
            field_index: 0,
        };
        let inner = table_context("dept", &[("deptno", TypeFamily::ExactNumeric)]);
        let node = unparser.expr_to_sql(&inner, &expr).expect("correlated field");
        assert_eq!(node.to_string(), "emp.deptno");
    }

    #[test]
    fn remapped_column_overrides_field_resolution() {
        let mut unparser = SqlUnparser::new(plain_dialect());
        unparser.remap_column(
            "c1",
            crate::sql::SqlNode::Identifier(crate::sql::SqlIdentifier::qualified(&["outer", "c1"])),
        );
        let rel = crate::algebra::RelNode::Filter {
            input: Box::new(scan_t()),
            condition: gt(col(0), lit_i(10)),
        };
        let node = unparser.translate_root(&rel).expect("translation");
        assert_eq!(node.to_string(), "SELECT * FROM t WHERE outer.c1 > 10");
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn unregistered_correlation_is_fatal() {
        let mut unparser = SqlUnparser::new(plain_dialect());
        let expr = ScalarExpr::FieldAccess {
            expr: Box::new(ScalarExpr::CorrelVariable(CorrelId(9))),
            field_name: "x".to_string(),
            field_index: 0,
        };
        let inner = table_context("t", &[("x", TypeFamily::ExactNumeric)]);
        let _ = unparser.expr_to_sql(&inner, &expr);
    }
}

mod aggregate_filters {
    use super::fixtures::*;
    use crate::algebra::{
        AggregateCall, Direction, FieldCollation, OpKind, RelNode, RowType, SqlOperator, TypeFamily,
    };
    use crate::dialect::Dialect;

    fn filtered_sum_rel() -> RelNode {
        let scan = scan("t", &[
            ("c1", TypeFamily::ExactNumeric),
            ("c2", TypeFamily::ExactNumeric),
            ("b", TypeFamily::Boolean),
        ]);
        RelNode::Aggregate {
            input: Box::new(scan),
            group_keys: vec![0],
            agg_calls: vec![AggregateCall {
                op: SqlOperator::std(OpKind::Sum),
                distinct: false,
                args: vec![1],
                filter_arg: Some(2),
                collation: vec![],
            }],
            row_type: RowType::from_pairs(&[
                ("c1", TypeFamily::ExactNumeric),
                ("s", TypeFamily::ExactNumeric),
            ]),
        }
    }

    fn filtered_count_star_rel() -> RelNode {
        let scan = scan("t", &[
            ("c1", TypeFamily::ExactNumeric),
            ("c2", TypeFamily::ExactNumeric),
            ("b", TypeFamily::Boolean),
        ]);
        RelNode::Aggregate {
            input: Box::new(scan),
            group_keys: vec![0],
            agg_calls: vec![AggregateCall {
                op: SqlOperator::std(OpKind::Count),
                distinct: false,
                args: vec![],
                filter_arg: Some(2),
                collation: vec![],
            }],
            row_type: RowType::from_pairs(&[
                ("c1", TypeFamily::ExactNumeric),
                ("n", TypeFamily::ExactNumeric),
            ]),
        }
    }

    #[test]
    fn filter_clause_used_when_dialect_supports_it() {
        assert_eq!(
            translate(plain_dialect(), &filtered_sum_rel()),
            "SELECT c1, SUM(c2) FILTER (WHERE b) AS s FROM t GROUP BY c1"
        );
    }

    #[test]
    fn filter_rewrites_to_case_when_unsupported() {
        let dialect = Dialect { supports_aggregate_function_filter: false, ..plain_dialect() };
        assert_eq!(
            translate(dialect, &filtered_sum_rel()),
            "SELECT c1, SUM(CASE WHEN b THEN c2 END) AS s FROM t GROUP BY c1"
        );
    }

    #[test]
    fn count_star_filter_rewrites_to_case_one() {
        let dialect = Dialect { supports_aggregate_function_filter: false, ..plain_dialect() };
        assert_eq!(
            translate(dialect, &filtered_count_star_rel()),
            "SELECT c1, COUNT(CASE WHEN b THEN 1 END) AS n FROM t GROUP BY c1"
        );
    }

    #[test]
    fn count_without_arguments_gets_a_star() {
        let rel = RelNode::Aggregate {
            input: Box::new(scan_t()),
            group_keys: vec![0],
            agg_calls: vec![AggregateCall::new(SqlOperator::std(OpKind::Count), vec![])],
            row_type: RowType::from_pairs(&[
                ("c1", TypeFamily::ExactNumeric),
                ("n", TypeFamily::ExactNumeric),
            ]),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT c1, COUNT(*) AS n FROM t GROUP BY c1"
        );
    }

    #[test]
    fn ordered_aggregate_uses_within_group() {
        let rel = RelNode::Aggregate {
            input: Box::new(scan_t()),
            group_keys: vec![0],
            agg_calls: vec![AggregateCall {
                op: SqlOperator::function("LISTAGG"),
                distinct: false,
                args: vec![1],
                filter_arg: None,
                collation: vec![FieldCollation::new(1, Direction::Ascending)],
            }],
            row_type: RowType::from_pairs(&[
                ("c1", TypeFamily::ExactNumeric),
                ("l", TypeFamily::Character),
            ]),
        };
        assert_eq!(
            translate(plain_dialect(), &rel),
            "SELECT c1, LISTAGG(c2) WITHIN GROUP (ORDER BY c2) AS l FROM t GROUP BY c1"
        );
    }
}

mod dialect_config {
    use crate::dialect::{Dialect, NullCollation};

    #[test]
    fn dialect_deserializes_with_defaults() {
        let dialect: Dialect = serde_json::from_str(
            r#"{"name": "WAREHOUSE", "supports_qualify_clause": true, "null_collation": "low"}"#,
        )
        .expect("dialect config");
        assert_eq!(dialect.name, "WAREHOUSE");
        assert!(dialect.supports_qualify_clause);
        assert_eq!(dialect.null_collation, NullCollation::Low);
        // Unspecified flags keep the permissive defaults.
        assert!(dialect.supports_nested_aggregations);
        assert!(dialect.has_implicit_table_alias);
    }
}
