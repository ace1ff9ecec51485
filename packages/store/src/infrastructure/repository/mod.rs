//! Repository パターンの実装。
//!
//! ドメイン層の `RecordRepository` トレイトに対するインフラ層の実装を提供
//! する。クエリ構築（`query`）、汎用 SQL リポジトリ（`sql`）、エンティティ
//! 固有のリポジトリ（`users`）から成る。

pub mod query;
pub mod sql;
pub mod users;

pub use query::{RowScope, SqlQuery};
pub use sql::SqlRecordRepository;
pub use users::UserRepository;
