pub mod algebra;

pub mod sql;

pub mod dialect;
pub use dialect::{Dialect, NullCollation};

pub mod unparser;
pub use unparser::{Clause, SqlUnparser, UnparseError};
