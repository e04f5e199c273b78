use std::collections::HashSet;

use crate::algebra::RelNode;

/// Makes `name` unique against the aliases already used in the statement,
/// registering the chosen name. Collisions get a numeric suffix: `t`, `t0`,
/// `t1`, ...
pub fn uniquify(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let mut attempt = 0usize;
    loop {
        let candidate = format!("{}{}", name, attempt);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        attempt += 1;
    }
}

/// Recovers an informative FROM alias by walking Filter/Project chains down
/// to the underlying scan. Nodes without a single base table yield nothing
/// and keep their synthetic alias.
pub fn derive_table_name(rel: &RelNode) -> Option<String> {
    match rel {
        RelNode::Scan { table, .. } => table.last().cloned(),
        RelNode::Filter { input, .. } | RelNode::Project { input, .. } => derive_table_name(input),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{LiteralValue, RowType, ScalarExpr, TypeFamily};

    #[test]
    fn uniquify_appends_numeric_suffixes() {
        let mut used = HashSet::new();
        assert_eq!(uniquify("t", &mut used), "t");
        assert_eq!(uniquify("t", &mut used), "t0");
        assert_eq!(uniquify("t", &mut used), "t1");
        assert_eq!(uniquify("emp", &mut used), "emp");
    }

    #[test]
    fn table_name_is_recovered_through_filter_and_project() {
        let scan = RelNode::Scan {
            table: vec!["sales".to_string(), "orders".to_string()],
            row_type: RowType::from_pairs(&[("id", TypeFamily::ExactNumeric)]),
        };
        let filtered = RelNode::Filter {
            input: Box::new(scan),
            condition: ScalarExpr::Literal(LiteralValue::Bool(true)),
        };
        let projected = RelNode::Project {
            input: Box::new(filtered),
            exprs: vec![ScalarExpr::ColumnRef(0)],
            row_type: RowType::from_pairs(&[("id", TypeFamily::ExactNumeric)]),
        };
        assert_eq!(derive_table_name(&projected).as_deref(), Some("orders"));
    }

    #[test]
    fn table_name_stops_at_non_chain_nodes() {
        let values = RelNode::Values {
            tuples: vec![],
            row_type: RowType::from_pairs(&[("x", TypeFamily::ExactNumeric)]),
        };
        assert_eq!(derive_table_name(&values), None);
    }
}
