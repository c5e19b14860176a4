mod builder;
pub use builder::*;

mod facet;
pub use facet::*;

mod catalog;
pub use catalog::*;
