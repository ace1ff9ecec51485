//! Data Source port.
//!
//! The repository consumes a live data source handed to it at construction;
//! it never opens or closes the underlying connection (dependency injection
//! contract).

pub mod inmemory;

pub use inmemory::InMemoryDataSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Record, Value};

/// Driver-level failure raised by a data source.
///
/// Repositories catch this at their boundary and translate it into the
/// single public [`RepositoryError`](crate::domain::RepositoryError) kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Connectivity failure (connection refused, dropped, unreachable)
    #[error("connection failure: {0}")]
    Connection(String),

    /// Constraint violation (e.g. uniqueness)
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The driver gave up waiting for a response
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Any other driver failure
    #[error("{0}")]
    Other(String),
}

/// Parameterized query execution capability.
///
/// `query` carries only trusted text (fixed fragments and validated
/// identifiers); every caller-supplied value travels in `params`, bound out
/// of band. Implementations must treat bound parameters as literal values,
/// never as query syntax.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Run a query expected to yield at most one record.
    async fn fetch_one(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Option<Record>, DataSourceError>;

    /// Run a query yielding any number of records, in storage order.
    async fn fetch_all(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Record>, DataSourceError>;

    /// Run a statement and report the number of affected rows.
    async fn execute(&self, query: &str, params: &[Value]) -> Result<u64, DataSourceError>;
}
