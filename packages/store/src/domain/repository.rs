//! Repository contract for typed record storage.

use async_trait::async_trait;

use super::entity::Record;
use super::error::RepositoryError;
use super::value_object::{FilterSet, Patch, RecordId};

/// Maximum number of records a single `find_all` call returns.
///
/// Caps result sets to bound memory regardless of how many records match.
pub const MAX_RESULT_ROWS: usize = 1000;

/// Standard CRUD contract every entity repository provides.
///
/// "Not found" is expected absence, never an error: lookups return
/// `Ok(None)`, scans an empty vector, and `delete` reports `Ok(false)`.
/// Failures of the underlying data source surface as [`RepositoryError`].
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Fetch at most one record whose identifier equals `id`.
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>, RepositoryError>;

    /// Fetch all records matching the equality conjunction in `filters`,
    /// in storage order, capped at [`MAX_RESULT_ROWS`] rows. An empty filter
    /// set places no restriction.
    async fn find_all(&self, filters: FilterSet) -> Result<Vec<Record>, RepositoryError>;

    /// Persist a new record, stamping `created_at` and `updated_at` to the
    /// same instant. Returns the fully materialized record, including any
    /// generated identifier.
    async fn create(&self, data: Record) -> Result<Record, RepositoryError>;

    /// Apply a partial update to the record with the given id, stamping
    /// `updated_at`. The identifier field is dropped from the patch by
    /// contract. Returns `None` if no live record matches.
    async fn update(&self, id: &RecordId, patch: Patch)
    -> Result<Option<Record>, RepositoryError>;

    /// Soft-delete the record with the given id by stamping `deleted_at` and
    /// `updated_at`. Returns `true` iff exactly one live record was marked;
    /// `false` when the record is missing or already deleted.
    async fn delete(&self, id: &RecordId) -> Result<bool, RepositoryError>;
}
