use std::fmt;

/// A possibly-qualified SQL identifier. `quoted` is a rendering hint for the
/// formatter; equality ignores it on purpose so alias comparisons stay
/// purely name-based.
#[derive(Clone, Eq)]
pub struct SqlIdentifier {
    pub names: Vec<String>,
    pub quoted: bool,
}

impl SqlIdentifier {
    pub fn simple(name: &str) -> Self {
        Self { names: vec![name.to_string()], quoted: false }
    }

    pub fn qualified(names: &[&str]) -> Self {
        Self { names: names.iter().map(|n| n.to_string()).collect(), quoted: false }
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self { names, quoted: false }
    }

    /// The `*` identifier used for `COUNT(*)`.
    pub fn star() -> Self {
        Self::simple("*")
    }

    pub fn is_simple(&self) -> bool {
        self.names.len() == 1
    }

    /// Last component: the column (or alias) name itself.
    pub fn simple_name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or("")
    }

    /// Copy with component `index` replaced, used to relabel pattern
    /// variables.
    pub fn with_name(&self, index: usize, name: &str) -> Self {
        let mut names = self.names.clone();
        names[index] = name.to_string();
        Self { names, quoted: self.quoted }
    }
}

impl PartialEq for SqlIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join("."))
    }
}

impl fmt::Debug for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self)
    }
}
