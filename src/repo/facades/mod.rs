//! # Facade Module
//!
//! This module implements the **Facade** pattern, serving as an intermediate logic layer
//! between catalog and search business logic and the underlying persistence providers.
//!
//! * **Backend Abstraction:** Facades drive any [`QueryBackend`](super::QueryBackend), so
//!   callers do not depend on whether rows come from Postgres or from memory.
//! * **Explicit Sessions:** Every operation receives the session handle it runs on; the
//!   caller decides whether it is a plain connection or a transaction, and commits it.
//! * **Caching:** Read results may be kept in a shared [`QueryCache`](super::QueryCache),
//!   selected per call through [`CachePolicy`](crate::query::CachePolicy).

mod facade_error;
pub use facade_error::*;

mod facade_search_facet;
pub use facade_search_facet::*;
