use crate::algebra::LiteralValue;

/// One maximal interval of a range set. Endpoints are literal values of the
/// column's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SargRange {
    /// The whole domain.
    All,
    /// A single value.
    Point(LiteralValue),
    /// `[lower, +inf)`
    AtLeast(LiteralValue),
    /// `(-inf, upper]`
    AtMost(LiteralValue),
    /// `(lower, +inf)`
    GreaterThan(LiteralValue),
    /// `(-inf, upper)`
    LessThan(LiteralValue),
    /// `[lower, upper]`
    Closed(LiteralValue, LiteralValue),
    /// `[lower, upper)`
    ClosedOpen(LiteralValue, LiteralValue),
    /// `(lower, upper]`
    OpenClosed(LiteralValue, LiteralValue),
    /// `(lower, upper)`
    Open(LiteralValue, LiteralValue),
}

/// A "searchable argument": a union of disjoint intervals over one column,
/// with an optional null marker. Produced by the optimizer's predicate
/// simplification; consumed by the SEARCH translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sarg {
    pub contains_null: bool,
    pub ranges: Vec<SargRange>,
}

impl Sarg {
    pub fn new(contains_null: bool, ranges: Vec<SargRange>) -> Self {
        Self { contains_null, ranges }
    }

    /// A sarg made of single points only.
    pub fn points(values: Vec<LiteralValue>) -> Self {
        Self {
            contains_null: false,
            ranges: values.into_iter().map(SargRange::Point).collect(),
        }
    }

    pub fn is_points(&self) -> bool {
        !self.ranges.is_empty()
            && self.ranges.iter().all(|r| matches!(r, SargRange::Point(_)))
    }

    pub fn point_values(&self) -> Vec<&LiteralValue> {
        self.ranges
            .iter()
            .filter_map(|r| match r {
                SargRange::Point(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}
