use std::fmt;

/// Operator kinds the translator dispatches on. Anything the rewrite rules
/// never need to recognize arrives as `OtherFunction` with only its display
/// name attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    And,
    Or,
    Not,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    IsNull,
    IsNotNull,
    IsTrue,
    IsNotTrue,
    IsDistinctFrom,
    IsNotDistinctFrom,
    Plus,
    Minus,
    Times,
    Divide,
    Cast,
    Case,
    Row,
    As,
    Dot,
    Over,
    Filter,
    WithinGroup,
    Desc,
    NullsFirst,
    NullsLast,
    In,
    NotIn,
    Exists,
    ScalarQuery,
    Search,
    Like,
    NotLike,
    Similar,
    NotSimilar,
    Cursor,
    Coalesce,
    Values,
    CollectionTable,
    Union,
    Intersect,
    Except,
    Sum,
    Sum0,
    Count,
    Min,
    Max,
    Avg,
    OtherFunction,
}

impl OpKind {
    pub fn default_name(&self) -> &'static str {
        match self {
            OpKind::And => "AND",
            OpKind::Or => "OR",
            OpKind::Not => "NOT",
            OpKind::Equals => "=",
            OpKind::NotEquals => "<>",
            OpKind::LessThan => "<",
            OpKind::LessThanOrEqual => "<=",
            OpKind::GreaterThan => ">",
            OpKind::GreaterThanOrEqual => ">=",
            OpKind::IsNull => "IS NULL",
            OpKind::IsNotNull => "IS NOT NULL",
            OpKind::IsTrue => "IS TRUE",
            OpKind::IsNotTrue => "IS NOT TRUE",
            OpKind::IsDistinctFrom => "IS DISTINCT FROM",
            OpKind::IsNotDistinctFrom => "IS NOT DISTINCT FROM",
            OpKind::Plus => "+",
            OpKind::Minus => "-",
            OpKind::Times => "*",
            OpKind::Divide => "/",
            OpKind::Cast => "CAST",
            OpKind::Case => "CASE",
            OpKind::Row => "ROW",
            OpKind::As => "AS",
            OpKind::Dot => ".",
            OpKind::Over => "OVER",
            OpKind::Filter => "FILTER",
            OpKind::WithinGroup => "WITHIN GROUP",
            OpKind::Desc => "DESC",
            OpKind::NullsFirst => "NULLS FIRST",
            OpKind::NullsLast => "NULLS LAST",
            OpKind::In => "IN",
            OpKind::NotIn => "NOT IN",
            OpKind::Exists => "EXISTS",
            OpKind::ScalarQuery => "SCALAR QUERY",
            OpKind::Search => "SEARCH",
            OpKind::Like => "LIKE",
            OpKind::NotLike => "NOT LIKE",
            OpKind::Similar => "SIMILAR TO",
            OpKind::NotSimilar => "NOT SIMILAR TO",
            OpKind::Cursor => "CURSOR",
            OpKind::Coalesce => "COALESCE",
            OpKind::Values => "VALUES",
            OpKind::CollectionTable => "TABLE",
            OpKind::Union => "UNION",
            OpKind::Intersect => "INTERSECT",
            OpKind::Except => "EXCEPT",
            OpKind::Sum => "SUM",
            OpKind::Sum0 => "$SUM0",
            OpKind::Count => "COUNT",
            OpKind::Min => "MIN",
            OpKind::Max => "MAX",
            OpKind::Avg => "AVG",
            OpKind::OtherFunction => "",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            OpKind::Equals
                | OpKind::NotEquals
                | OpKind::LessThan
                | OpKind::LessThanOrEqual
                | OpKind::GreaterThan
                | OpKind::GreaterThanOrEqual
                | OpKind::IsDistinctFrom
                | OpKind::IsNotDistinctFrom
        )
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            OpKind::Sum | OpKind::Sum0 | OpKind::Count | OpKind::Min | OpKind::Max | OpKind::Avg
        )
    }
}

/// The slice of the operator catalog the unparser consumes: a kind for the
/// rewrite rules plus the display name the dialect wants. Substitution
/// tables swap the name while keeping the kind.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SqlOperator {
    pub kind: OpKind,
    pub name: String,
}

impl SqlOperator {
    pub fn std(kind: OpKind) -> Self {
        Self { kind, name: kind.default_name().to_string() }
    }

    /// A function-style operator the rewrite rules have no opinion about.
    pub fn function(name: &str) -> Self {
        Self { kind: OpKind::OtherFunction, name: name.to_string() }
    }

    pub fn with_name(&self, name: &str) -> Self {
        Self { kind: self.kind, name: name.to_string() }
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind.is_aggregate()
    }

    /// Mirror image of a comparison, used when a join condition arrives with
    /// its operands right-side-first. Calling this on a non-comparison
    /// operator is a logic error.
    pub fn reverse_direction(&self) -> SqlOperator {
        let kind = match self.kind {
            OpKind::GreaterThan => OpKind::LessThan,
            OpKind::GreaterThanOrEqual => OpKind::LessThanOrEqual,
            OpKind::LessThan => OpKind::GreaterThan,
            OpKind::LessThanOrEqual => OpKind::GreaterThanOrEqual,
            OpKind::Equals | OpKind::NotEquals | OpKind::IsDistinctFrom | OpKind::IsNotDistinctFrom => {
                return self.clone()
            }
            other => panic!("cannot reverse operator {other:?}"),
        };
        SqlOperator::std(kind)
    }
}

impl fmt::Display for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SqlOperator({:?}, {})", self.kind, self.name)
    }
}
