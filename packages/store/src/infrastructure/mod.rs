//! インフラストラクチャ層。
//!
//! データソースとリポジトリの具体的な実装を提供する。

pub mod datasource;
pub mod repository;

pub use datasource::{DataSource, DataSourceError, InMemoryDataSource};
pub use repository::{SqlRecordRepository, UserRepository};
