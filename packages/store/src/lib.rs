//! Typed record store built on the repository pattern.
//!
//! A generic, injection-safe data access layer: domain types and the
//! [`RecordRepository`] trait live in [`domain`], and [`infrastructure`]
//! provides the SQL-backed implementation over an injected [`DataSource`].
//! All record reads and writes observe a soft-delete lifecycle and stamp
//! `created_at`/`updated_at` from an injected clock.

pub mod domain;
pub mod infrastructure;
pub mod logger;
pub mod time;

pub use domain::{
    FieldName, FilterSet, MAX_RESULT_ROWS, Patch, Record, RecordId, RecordRepository,
    RepositoryError, TableName, Value, ValueObjectError,
};
pub use infrastructure::{
    DataSource, DataSourceError, InMemoryDataSource, SqlRecordRepository, UserRepository,
};
pub use time::{Clock, FixedClock, SystemClock};
