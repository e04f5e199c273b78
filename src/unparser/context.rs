use indexmap::IndexMap;
use std::collections::HashMap;

use crate::algebra::{OpKind, RowType};
use crate::sql::{SqlIdentifier, SqlLiteral, SqlNode};

/// Resolves field references through the FROM aliases of the current
/// sub-query. A `column_remap` entry overrides resolution of one field name
/// with a pre-built expression (used when an enclosing correlation renamed
/// the column); keys are lower-cased field names.
#[derive(Debug, Clone)]
pub struct AliasContext {
    pub aliases: IndexMap<String, RowType>,
    pub qualified: bool,
    pub column_remap: HashMap<String, SqlNode>,
}

impl AliasContext {
    pub fn new(aliases: IndexMap<String, RowType>, qualified: bool) -> Self {
        Self { aliases, qualified, column_remap: HashMap::new() }
    }

    fn field_count(&self) -> usize {
        self.aliases.values().map(RowType::field_count).sum()
    }

    fn field(&self, ordinal: usize) -> SqlNode {
        let mut remaining = ordinal;
        for (alias, row_type) in &self.aliases {
            if remaining < row_type.field_count() {
                let field = row_type.field(remaining);
                if let Some(mapped) = self.column_remap.get(&field.name.to_lowercase()) {
                    return mapped.clone();
                }
                let identifier = if self.qualified {
                    SqlIdentifier::qualified(&[alias, &field.name])
                } else {
                    SqlIdentifier::simple(&field.name)
                };
                return SqlNode::Identifier(identifier);
            }
            remaining -= row_type.field_count();
        }
        panic!(
            "field ordinal {} out of range for aliases {:?}",
            ordinal,
            self.aliases.keys().collect::<Vec<_>>()
        );
    }
}

/// Resolves field references of a join condition: ordinals below the left
/// field count resolve through the left side, the rest through the right
/// side shifted down.
#[derive(Debug, Clone)]
pub struct JoinContext {
    pub left: Context,
    pub right: Context,
}

/// Direct positional lookup into SQL expressions that were already built
/// for a table function's inputs.
#[derive(Debug, Clone)]
pub struct TableFunctionScanContext {
    pub input_nodes: Vec<SqlNode>,
}

/// Resolves field references through the select list of the SELECT under
/// construction, after the name-resolution scope has moved past the FROM
/// aliases. `alias_ref` selects the alias operand of `expr AS alias` items
/// instead of the expression (dialects where HAVING or ORDER BY resolve
/// select-list aliases).
#[derive(Debug, Clone)]
pub struct SelectListContext {
    pub select_list: Vec<SqlNode>,
    pub alias_ref: bool,
}

impl SelectListContext {
    fn field(&self, ordinal: usize) -> SqlNode {
        let item = self
            .select_list
            .get(ordinal)
            .unwrap_or_else(|| panic!("field ordinal {} out of range for select list", ordinal));
        match item {
            SqlNode::Call(call) if call.op.kind == OpKind::As => {
                if self.alias_ref {
                    call.operands[1].clone()
                } else {
                    call.operands[0].clone()
                }
            }
            other => other.clone(),
        }
    }

    /// ORDER BY resolution. If the natural identifier would collide with a
    /// different select item's alias, falls back to a 1-based ordinal so
    /// the reference stays unambiguous.
    fn order_field(&self, ordinal: usize) -> SqlNode {
        let node = self.field(ordinal);
        if let SqlNode::Identifier(id) = &node {
            if id.is_simple() {
                let name = id.simple_name();
                for (i, item) in self.select_list.iter().enumerate() {
                    if i == ordinal {
                        continue;
                    }
                    if item.alias().is_some_and(|a| a.eq_ignore_ascii_case(name)) {
                        return SqlNode::Literal(SqlLiteral::ExactNumeric((ordinal + 1).to_string()));
                    }
                }
            }
        }
        node
    }
}

/// Maps a 0-based output-column ordinal to a SQL expression, under the
/// aliasing scheme in force at this point of the translation. Contexts are
/// read-only views; an out-of-range ordinal is a tree/row-type mismatch in
/// the producing layer and aborts.
#[derive(Debug, Clone)]
pub enum Context {
    Alias(AliasContext),
    /// Alias resolution plus the MATCH_RECOGNIZE quirk: string literals in
    /// pattern definitions are pattern-variable identifiers, handled by the
    /// expression translator.
    MatchRecognize(AliasContext),
    Join(Box<JoinContext>),
    TableFunctionScan(TableFunctionScanContext),
    SelectList(SelectListContext),
}

impl Context {
    pub fn field_count(&self) -> usize {
        match self {
            Context::Alias(ctx) | Context::MatchRecognize(ctx) => ctx.field_count(),
            Context::Join(ctx) => ctx.left.field_count() + ctx.right.field_count(),
            Context::TableFunctionScan(ctx) => ctx.input_nodes.len(),
            Context::SelectList(ctx) => ctx.select_list.len(),
        }
    }

    pub fn field(&self, ordinal: usize) -> SqlNode {
        match self {
            Context::Alias(ctx) | Context::MatchRecognize(ctx) => ctx.field(ordinal),
            Context::Join(ctx) => {
                let left_count = ctx.left.field_count();
                if ordinal < left_count {
                    ctx.left.field(ordinal)
                } else {
                    ctx.right.field(ordinal - left_count)
                }
            }
            Context::TableFunctionScan(ctx) => ctx
                .input_nodes
                .get(ordinal)
                .unwrap_or_else(|| panic!("field ordinal {} out of range for table function inputs", ordinal))
                .clone(),
            Context::SelectList(ctx) => ctx.field(ordinal),
        }
    }

    pub fn order_field(&self, ordinal: usize) -> SqlNode {
        match self {
            Context::SelectList(ctx) => ctx.order_field(ordinal),
            _ => self.field(ordinal),
        }
    }
}
