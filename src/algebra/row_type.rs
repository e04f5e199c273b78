use std::fmt;

/// Semantic family of a column or expression type. The unparser never needs
/// full type information; literal rendering and a handful of cast rules
/// dispatch on the family alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Character,
    ExactNumeric,
    ApproxNumeric,
    Boolean,
    Date,
    Time,
    Timestamp,
    Interval,
    Binary,
    Cursor,
    Null,
    Any,
}

impl TypeFamily {
    /// SQL type name used when a cast target must be spelled out.
    pub fn sql_type_name(&self) -> &'static str {
        match self {
            TypeFamily::Character => "VARCHAR",
            TypeFamily::ExactNumeric => "DECIMAL",
            TypeFamily::ApproxNumeric => "DOUBLE",
            TypeFamily::Boolean => "BOOLEAN",
            TypeFamily::Date => "DATE",
            TypeFamily::Time => "TIME",
            TypeFamily::Timestamp => "TIMESTAMP",
            TypeFamily::Interval => "INTERVAL",
            TypeFamily::Binary => "BINARY",
            TypeFamily::Cursor => "CURSOR",
            TypeFamily::Null => "NULL",
            TypeFamily::Any => "ANY",
        }
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_type_name())
    }
}

/// One output column of an algebra node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelField {
    pub name: String,
    pub family: TypeFamily,
}

impl RelField {
    pub fn new(name: &str, family: TypeFamily) -> Self {
        Self { name: name.to_string(), family }
    }
}

/// Ordered list of output columns of an algebra node. Field order is the
/// ordinal space that `ScalarExpr::ColumnRef` indexes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowType {
    pub fields: Vec<RelField>,
}

impl RowType {
    pub fn new(fields: Vec<RelField>) -> Self {
        Self { fields }
    }

    /// Convenience constructor: `RowType::from_pairs(&[("id", TypeFamily::ExactNumeric)])`.
    pub fn from_pairs(pairs: &[(&str, TypeFamily)]) -> Self {
        Self {
            fields: pairs.iter().map(|(n, t)| RelField::new(n, *t)).collect(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, ordinal: usize) -> &RelField {
        &self.fields[ordinal]
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Join output row type: left fields followed by right fields.
    pub fn concat(left: &RowType, right: &RowType) -> RowType {
        let mut fields = left.fields.clone();
        fields.extend(right.fields.iter().cloned());
        RowType { fields }
    }
}
