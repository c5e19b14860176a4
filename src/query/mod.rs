//! Structured query requests.
//!
//! Requests are plain typed values: a backend either compiles them to SQL
//! (see [`ClausesCompiler`]) or evaluates them directly.

mod filter;
pub use filter::*;

mod builder;
pub use builder::*;

mod path;
pub use path::*;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("invalid facet field path `{path}`")]
    BadFieldPath { path: String },
    #[error("unknown property `{property}` in field path `{path}`")]
    UnknownProperty { path: String, property: String },
    #[error("unsupported operation on field `{field}`")]
    UnsupportedOp { field: String },
    #[error("unable to coerce `{value}` to {target}")]
    Coercion { value: String, target: ValueType },
}

/// Whether a read may be answered from the query-result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    Cacheable,
    Bypass,
}

impl CachePolicy {
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Cacheable)
    }
}
