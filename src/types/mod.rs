mod facet;
pub use facet::*;

mod field;
pub use field::*;

/// Identifier carried by records not yet persisted
pub const UNREGISTERED: i64 = -1;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("unknown field entity `{0}`")]
    UnknownFieldEntity(String),
}
