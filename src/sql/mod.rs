pub mod identifier;
pub use identifier::*;

pub mod literal;
pub use literal::*;

pub mod call;
pub use call::*;

pub mod select;
pub use select::*;

pub mod join;
pub use join::*;

pub mod case;
pub use case::*;

pub mod window;
pub use window::*;

pub mod node;
pub use node::*;
