//! # Repository
//!
//! Persistence layer of the catalog facets. It owns the Postgres connection
//! pool ([`Repository`]) and hands out explicit session handles: [`Cx`] for
//! auto-committed statements on a pooled connection and [`Tx`] for an open
//! transaction the caller commits or drops.
//!
//! Queries are free functions generic over [`AsExec`], so they run unchanged
//! on either handle. Facades drive them through the [`QueryBackend`] trait,
//! which [`MemoryStore`] also implements.

use log::debug;

use crate::{params, query};

mod backend;
pub use backend::*;

mod cache;
pub use cache::*;

mod memory;
pub use memory::*;

mod facades;
pub use facades::*;

mod sql_models;
pub use sql_models::*;

pub type Database = sqlx::Postgres;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("backend error :: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("migration error :: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("constraint violation :: {0}")]
    ConstraintViolation(String),
    #[error("corrupted record :: {0}")]
    CorruptedRecord(String),
    #[error("query error :: {0}")]
    Query(#[from] query::Error),
    #[error("missing configuration variable `{0}`")]
    MissingConfiguration(&'static str),
}

/// Shared handle on the connection pool, cheap to clone.
#[derive(Clone)]
pub struct Repository {
    pool: sqlx::Pool<Database>,
}

impl Repository {
    pub fn new(pool: sqlx::Pool<Database>) -> Self {
        Self { pool }
    }

    pub async fn try_new(database_url: &str) -> Result<Self, Error> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(params::configurables().max_db_connections)
            .connect(database_url)
            .await?;

        debug!("connected to catalog database");

        Ok(Self { pool })
    }

    /// Connects using the `DATABASE_URL` environment variable.
    pub async fn try_from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let url = std::env::var(params::env::DATABASE_URL)
            .map_err(|_| Error::MissingConfiguration(params::env::DATABASE_URL))?;
        Self::try_new(&url).await
    }

    /// Applies the catalog schema migrations.
    pub async fn migrate(&self) -> Result<(), Error> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub fn connection(&self) -> Cx<'_> {
        Cx { pool: &self.pool }
    }

    pub async fn transaction(&self) -> Result<Tx<'_>, Error> {
        Ok(Tx {
            inner: self.pool.begin().await?,
        })
    }
}

/// Auto-commit session on the pool.
pub struct Cx<'a> {
    pool: &'a sqlx::Pool<Database>,
}

/// Open transaction, rolled back on drop unless committed.
pub struct Tx<'a> {
    inner: sqlx::Transaction<'a, Database>,
}

impl Tx<'_> {
    pub async fn commit(self) -> Result<(), Error> {
        self.inner.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), Error> {
        self.inner.rollback().await?;
        Ok(())
    }
}

/// Gives access to a sqlx executor for the lifetime of a borrow.
pub trait AsExec {
    type Exec<'e>: sqlx::PgExecutor<'e>
    where
        Self: 'e;

    fn as_exec(&mut self) -> Self::Exec<'_>;
}

impl AsExec for Cx<'_> {
    type Exec<'e>
        = &'e sqlx::Pool<Database>
    where
        Self: 'e;

    fn as_exec(&mut self) -> Self::Exec<'_> {
        self.pool
    }
}

impl AsExec for Tx<'_> {
    type Exec<'e>
        = &'e mut sqlx::PgConnection
    where
        Self: 'e;

    fn as_exec(&mut self) -> Self::Exec<'_> {
        &mut *self.inner
    }
}
