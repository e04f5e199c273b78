use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::algebra::{Direction, NullDirection, OpKind, ScalarExpr, SqlOperator, TypeFamily};
use crate::sql::{SqlLiteral, SqlNode};

/// Identifiers that can be emitted without quoting.
static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Where a dialect sorts NULL values by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullCollation {
    /// Nulls compare as the highest value.
    High,
    /// Nulls compare as the lowest value.
    Low,
    First,
    Last,
}

impl NullCollation {
    /// Whether nulls come last for the given sort direction.
    pub fn last(&self, descending: bool) -> bool {
        match self {
            NullCollation::First => false,
            NullCollation::Last => true,
            NullCollation::Low => descending,
            NullCollation::High => !descending,
        }
    }

    pub fn is_default_order(&self, nulls_first: bool, descending: bool) -> bool {
        self.last(descending) != nulls_first
    }
}

/// Capability descriptor for one target dialect. Owned and populated by the
/// integration layer; the unparser only reads it. Deserializable so dialect
/// profiles can live in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    pub name: String,

    // clause / construct support
    pub supports_qualify_clause: bool,
    pub supports_agg_in_group_by: bool,
    pub supports_nested_aggregations: bool,
    pub supports_nested_analytical_functions: bool,
    pub supports_analytical_function_in_aggregate: bool,
    pub supports_aggregate_function_filter: bool,
    pub supports_implicit_type_coercion: bool,
    /// Native `NULLS FIRST` / `NULLS LAST` keywords.
    pub supports_nulls_ordering: bool,

    // FROM-item aliasing
    pub requires_alias_for_from_items: bool,
    pub has_implicit_table_alias: bool,
    pub supports_identical_table_and_column_name: bool,

    // conformance: where aliases resolve
    pub group_by_alias: bool,
    pub having_alias: bool,
    pub sort_by_alias: bool,
    pub allow_is_true: bool,

    pub null_collation: NullCollation,

    /// Temporal literals spelled as plain strings instead of typed literals.
    pub datetime_literals_as_strings: bool,

    /// Operator substitution: canonical operator name to the name this
    /// dialect uses for the same operation (same arity).
    pub substitutions: HashMap<String, String>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::ansi()
    }
}

impl Dialect {
    /// Permissive baseline profile.
    pub fn ansi() -> Self {
        Dialect {
            name: "ANSI".to_string(),
            supports_qualify_clause: false,
            supports_agg_in_group_by: true,
            supports_nested_aggregations: true,
            supports_nested_analytical_functions: true,
            supports_analytical_function_in_aggregate: true,
            supports_aggregate_function_filter: true,
            supports_implicit_type_coercion: true,
            supports_nulls_ordering: true,
            requires_alias_for_from_items: false,
            has_implicit_table_alias: true,
            supports_identical_table_and_column_name: true,
            group_by_alias: false,
            having_alias: false,
            sort_by_alias: true,
            allow_is_true: true,
            null_collation: NullCollation::High,
            datetime_literals_as_strings: false,
            substitutions: HashMap::new(),
        }
    }

    pub fn with_substitution(mut self, canonical: &str, replacement: &str) -> Self {
        self.substitutions.insert(canonical.to_string(), replacement.to_string());
        self
    }

    /// Replacement operator for this dialect, or the operator unchanged.
    pub fn substitute(&self, op: &SqlOperator) -> SqlOperator {
        match self.substitutions.get(&op.name) {
            Some(name) => op.with_name(name),
            None => op.clone(),
        }
    }

    pub fn default_null_direction(&self, direction: Direction) -> NullDirection {
        if self.null_collation.last(direction.is_descending()) {
            NullDirection::Last
        } else {
            NullDirection::First
        }
    }

    /// Emulation node for an explicit null ordering, for dialects without
    /// `NULLS FIRST`/`NULLS LAST`. Returns a sort key to prepend
    /// (`expr IS NULL`, descending when nulls must come last), or `None`
    /// when the keywords can be used or the request matches the default.
    pub fn emulate_null_direction(
        &self,
        node: SqlNode,
        nulls_first: bool,
        descending: bool,
    ) -> Option<SqlNode> {
        if self.supports_nulls_ordering {
            return None;
        }
        if self.null_collation.is_default_order(nulls_first, descending) {
            return None;
        }
        let is_null = SqlNode::call_of(OpKind::IsNull, vec![node]);
        if nulls_first {
            Some(SqlNode::call_of(OpKind::Desc, vec![is_null]))
        } else {
            Some(is_null)
        }
    }

    /// Whether a cast around one comparison operand can be stripped: the
    /// dialect coerces character literals implicitly.
    pub fn supports_implicit_coercion_of(&self, cast_call: &ScalarExpr) -> bool {
        if !self.supports_implicit_type_coercion {
            return false;
        }
        match cast_call {
            ScalarExpr::Call { op, operands, .. } if op.kind == OpKind::Cast => matches!(
                operands.first(),
                Some(ScalarExpr::Literal(lit)) if lit.family() == TypeFamily::Character
            ),
            _ => false,
        }
    }

    /// CAST call in this dialect's shape.
    pub fn cast_call(&self, operand: SqlNode, _from: TypeFamily, to: TypeFamily) -> SqlNode {
        SqlNode::call_of(OpKind::Cast, vec![operand, SqlNode::identifier(to.sql_type_name())])
    }

    pub fn time_literal(&self, value: chrono::NaiveTime, precision: u8) -> SqlLiteral {
        if self.datetime_literals_as_strings {
            SqlLiteral::CharString(value.to_string())
        } else {
            SqlLiteral::Time { value, precision }
        }
    }

    pub fn timestamp_literal(&self, value: chrono::NaiveDateTime, precision: u8) -> SqlLiteral {
        if self.datetime_literals_as_strings {
            SqlLiteral::CharString(value.format("%Y-%m-%d %H:%M:%S").to_string())
        } else {
            SqlLiteral::Timestamp { value, precision }
        }
    }

    pub fn date_literal(&self, value: chrono::NaiveDate) -> SqlLiteral {
        if self.datetime_literals_as_strings {
            SqlLiteral::CharString(value.to_string())
        } else {
            SqlLiteral::Date(value)
        }
    }

    pub fn identifier_needs_quote(&self, name: &str) -> bool {
        !BARE_IDENTIFIER.is_match(name)
    }
}
