//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RecordId validation error
    #[error("RecordId cannot be empty")]
    RecordIdEmpty,

    /// FieldName validation error
    #[error("FieldName cannot be empty")]
    FieldNameEmpty,

    /// FieldName too long error
    #[error("FieldName cannot exceed {max} characters (got {actual})")]
    FieldNameTooLong { max: usize, actual: usize },

    /// FieldName invalid character error (not an ASCII identifier)
    #[error("FieldName must match [A-Za-z_][A-Za-z0-9_]* (got: {0})")]
    FieldNameInvalid(String),

    /// TableName validation error
    #[error("TableName cannot be empty")]
    TableNameEmpty,

    /// TableName too long error
    #[error("TableName cannot exceed {max} characters (got {actual})")]
    TableNameTooLong { max: usize, actual: usize },

    /// TableName invalid character error (not an ASCII identifier)
    #[error("TableName must match [A-Za-z_][A-Za-z0-9_]* (got: {0})")]
    TableNameInvalid(String),
}

/// Error returned by repository operations.
///
/// Every public operation catches the underlying data-source failure at its
/// boundary and converts it into this single kind, carrying a human-readable
/// message naming the failed operation and entity. Callers never see
/// driver-specific error types. "Not found" is not an error and is reported
/// as an absent value instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RepositoryError {
    message: String,
}

impl RepositoryError {
    /// Create a new RepositoryError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}
