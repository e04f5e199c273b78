use std::fmt;

/// Clauses of a SELECT statement, ordered by evaluation position. The
/// derived `Ord` on declaration order is what the merge decision compares.
/// `Select` is recorded only for a non-trivial select list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Clause {
    From,
    Where,
    GroupBy,
    Having,
    Qualify,
    Select,
    SetOp,
    OrderBy,
    Fetch,
    Offset,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::Qualify => "QUALIFY",
            Clause::Select => "SELECT",
            Clause::SetOp => "SET OP",
            Clause::OrderBy => "ORDER BY",
            Clause::Fetch => "FETCH",
            Clause::Offset => "OFFSET",
        };
        write!(f, "{}", name)
    }
}
