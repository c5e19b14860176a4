//! Process-wide configuration.
//!
//! Values are read once from the environment (a `.env` file in the working
//! directory is loaded first, if present) and cached for the lifetime of the
//! process. Invalid values are reported and replaced by their defaults.

use crate::query::PathMatch;
use log::warn;
use std::str::FromStr;
use std::sync::OnceLock;

pub mod env {
    /// Connection string used by [`crate::repo::Repository::try_from_env`]
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Maximum number of cached query results, `0` disables the cache
    pub const QUERY_CACHE_CAPACITY: &str = "FACETS_QUERY_CACHE_CAPACITY";
    /// Field path prefix matching strategy (`prefix` or `substring`)
    pub const PATH_MATCH: &str = "FACETS_PATH_MATCH";
    /// Upper bound of pooled database connections
    pub const MAX_DB_CONNECTIONS: &str = "FACETS_MAX_DB_CONNECTIONS";
}

pub const DEFAULT_QUERY_CACHE_CAPACITY: usize = 256;
pub const DEFAULT_MAX_DB_CONNECTIONS: u32 = 8;

#[derive(Debug, Clone)]
pub struct Configurables {
    pub query_cache_capacity: usize,
    pub path_match: PathMatch,
    pub max_db_connections: u32,
}

impl Default for Configurables {
    fn default() -> Self {
        Self {
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
            path_match: PathMatch::default(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
        }
    }
}

impl Configurables {
    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            query_cache_capacity: parse_or(
                &lookup,
                env::QUERY_CACHE_CAPACITY,
                defaults.query_cache_capacity,
            ),
            path_match: parse_or(&lookup, env::PATH_MATCH, defaults.path_match),
            max_db_connections: parse_or(
                &lookup,
                env::MAX_DB_CONNECTIONS,
                defaults.max_db_connections,
            ),
        }
    }

    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("invalid value `{raw}` for `{key}`, using default");
            default
        }),
        None => default,
    }
}

static CONFIGURABLES: OnceLock<Configurables> = OnceLock::new();

/// Returns the process-wide configuration, loading it on first access.
pub fn configurables() -> &'static Configurables {
    CONFIGURABLES.get_or_init(Configurables::from_env)
}
