//! User 集約のリポジトリ実装。
//!
//! 汎用の `SqlRecordRepository` を `users` テーブルに固定し、
//! メールアドレスによる検索などエンティティ固有の操作を追加する。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    FieldName, FilterSet, Patch, Record, RecordId, RecordRepository, RepositoryError, TableName,
};
use crate::infrastructure::datasource::DataSource;
use crate::time::Clock;

use super::sql::SqlRecordRepository;

const USERS_TABLE: &str = "users";
const EMAIL_FIELD: &str = "email";

/// Repository for user records.
///
/// Wraps the generic record repository fixed to the `users` table and adds
/// the email lookup. Standard operations delegate unchanged, so users follow
/// the same timestamping and soft-delete lifecycle as every other entity.
pub struct UserRepository {
    records: SqlRecordRepository,
}

impl UserRepository {
    pub fn new(datasource: Arc<dyn DataSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: SqlRecordRepository::new(datasource, clock, TableName::known(USERS_TABLE)),
        }
    }

    /// Find the live user with this email address.
    ///
    /// Soft-deleted users never match, so a deleted account frees its
    /// address for re-registration. Returns `None` when no live user has
    /// the address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Record>, RepositoryError> {
        self.records
            .find_by_field(&FieldName::known(EMAIL_FIELD), email.into())
            .await
    }

    /// Underlying generic repository, for audit readers such as
    /// [`SqlRecordRepository::find_by_id_with_deleted`].
    pub fn records(&self) -> &SqlRecordRepository {
        &self.records
    }
}

#[async_trait]
impl RecordRepository for UserRepository {
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>, RepositoryError> {
        self.records.find_by_id(id).await
    }

    async fn find_all(&self, filters: FilterSet) -> Result<Vec<Record>, RepositoryError> {
        self.records.find_all(filters).await
    }

    async fn create(&self, data: Record) -> Result<Record, RepositoryError> {
        self.records.create(data).await
    }

    async fn update(
        &self,
        id: &RecordId,
        patch: Patch,
    ) -> Result<Option<Record>, RepositoryError> {
        self.records.update(id, patch).await
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, RepositoryError> {
        self.records.delete(id).await
    }
}
