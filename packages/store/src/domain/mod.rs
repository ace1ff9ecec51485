//! Domain layer for record storage.
//!
//! This module contains the storage contracts and data model that are
//! independent of any concrete data source.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, Record, UPDATED_AT_FIELD, Value};
pub use error::{RepositoryError, ValueObjectError};
pub use repository::{MAX_RESULT_ROWS, RecordRepository};
pub use value_object::{FieldName, FilterSet, Patch, RecordId, TableName};
