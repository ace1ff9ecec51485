//! SQL-backed generic record repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::domain::{
    FieldName, FilterSet, ID_FIELD, Patch, Record, RecordId, RecordRepository, RepositoryError,
    TableName, Value,
};
use crate::infrastructure::datasource::{DataSource, DataSourceError};
use crate::time::Clock;

use super::query::{self, RowScope};

/// Generic repository over one entity table, delegating execution to an
/// injected [`DataSource`].
///
/// The data source handle, clock, and table name are fixed at construction
/// and the repository holds no other state, so a call cancelled while
/// awaiting the data source leaves nothing to corrupt. Soft-deleted records
/// are excluded from every standard read and from updates; audit access goes
/// through the explicit `*_with_deleted` readers.
pub struct SqlRecordRepository {
    datasource: Arc<dyn DataSource>,
    clock: Arc<dyn Clock>,
    table: TableName,
}

impl SqlRecordRepository {
    /// Create a repository for `table` backed by an already-open data source.
    pub fn new(datasource: Arc<dyn DataSource>, clock: Arc<dyn Clock>, table: TableName) -> Self {
        Self {
            datasource,
            clock,
            table,
        }
    }

    /// Table this repository operates on.
    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Fetch at most one live record whose `field` equals `value`.
    ///
    /// Building block for entity-specific finders on alternate unique
    /// attributes; soft-deleted records are excluded.
    pub async fn find_by_field(
        &self,
        field: &FieldName,
        value: Value,
    ) -> Result<Option<Record>, RepositoryError> {
        let query = query::select_by_field(&self.table, field, value, RowScope::Active);
        let found = self
            .datasource
            .fetch_one(&query.text, &query.params)
            .await
            .map_err(|e| self.translate("find", field.as_str(), &e))?;
        match &found {
            Some(record) => debug!(
                table = %self.table,
                field = %field,
                id = record.id().unwrap_or_default(),
                "record found"
            ),
            None => debug!(table = %self.table, field = %field, "record not found"),
        }
        Ok(found)
    }

    /// Id lookup without the soft-delete exclusion, for audit access.
    pub async fn find_by_id_with_deleted(
        &self,
        id: &RecordId,
    ) -> Result<Option<Record>, RepositoryError> {
        let query = query::select_by_field(
            &self.table,
            &FieldName::known(ID_FIELD),
            Value::from(id.as_str()),
            RowScope::All,
        );
        self.datasource
            .fetch_one(&query.text, &query.params)
            .await
            .map_err(|e| self.translate("find", id.as_str(), &e))
    }

    /// Filtered scan without the soft-delete exclusion, for audit access.
    /// The row cap still applies.
    pub async fn find_all_with_deleted(
        &self,
        filters: FilterSet,
    ) -> Result<Vec<Record>, RepositoryError> {
        let query = query::select_filtered(&self.table, &filters, RowScope::All);
        self.datasource
            .fetch_all(&query.text, &query.params)
            .await
            .map_err(|e| self.translate("list", "unscoped", &e))
    }

    /// Translation boundary: log the failure with its context and wrap it in
    /// the single public error kind. Driver error types never leak to
    /// callers.
    fn translate(&self, operation: &str, context: &str, err: &DataSourceError) -> RepositoryError {
        error!(
            table = %self.table,
            operation,
            context,
            error = %err,
            "data source operation failed"
        );
        RepositoryError::new(format!(
            "failed to {operation} {} record: {err}",
            self.table
        ))
    }
}

#[async_trait]
impl RecordRepository for SqlRecordRepository {
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>, RepositoryError> {
        self.find_by_field(&FieldName::known(ID_FIELD), Value::from(id.as_str()))
            .await
    }

    async fn find_all(&self, filters: FilterSet) -> Result<Vec<Record>, RepositoryError> {
        let query = query::select_filtered(&self.table, &filters, RowScope::Active);
        let records = self
            .datasource
            .fetch_all(&query.text, &query.params)
            .await
            .map_err(|e| self.translate("list", "filtered", &e))?;
        debug!(table = %self.table, count = records.len(), "records listed");
        Ok(records)
    }

    async fn create(&self, data: Record) -> Result<Record, RepositoryError> {
        let now = self.clock.now();
        let query = query::insert(&self.table, &data, now).map_err(|e| {
            error!(table = %self.table, operation = "create", error = %e, "rejected field name");
            RepositoryError::new(format!("failed to create {} record: {e}", self.table))
        })?;
        let created = self
            .datasource
            .fetch_one(&query.text, &query.params)
            .await
            .map_err(|e| self.translate("create", "new record", &e))?
            .ok_or_else(|| {
                RepositoryError::new(format!(
                    "failed to create {} record: insert returned no row",
                    self.table
                ))
            })?;
        info!(
            table = %self.table,
            id = created.id().unwrap_or_default(),
            "record created"
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: &RecordId,
        patch: Patch,
    ) -> Result<Option<Record>, RepositoryError> {
        let now = self.clock.now();
        let query = query::update_by_id(&self.table, id, &patch, now);
        let updated = self
            .datasource
            .fetch_one(&query.text, &query.params)
            .await
            .map_err(|e| self.translate("update", id.as_str(), &e))?;
        match &updated {
            Some(_) => info!(table = %self.table, id = %id, "record updated"),
            None => debug!(table = %self.table, id = %id, "no live record to update"),
        }
        Ok(updated)
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, RepositoryError> {
        let now = self.clock.now();
        let query = query::soft_delete_by_id(&self.table, id, now);
        let affected = self
            .datasource
            .execute(&query.text, &query.params)
            .await
            .map_err(|e| self.translate("delete", id.as_str(), &e))?;
        if affected == 1 {
            info!(table = %self.table, id = %id, "record soft-deleted");
        } else {
            debug!(table = %self.table, id = %id, "no live record to delete");
        }
        Ok(affected == 1)
    }
}
