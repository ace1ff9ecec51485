//! Safe dynamic query construction.
//!
//! Query text is assembled only from trusted fragments: fixed SQL keywords,
//! validated table and field names, `$n` placeholders, and internal integer
//! constants. Every caller-supplied value is returned in the parameter
//! vector, bound out of band, and is never concatenated into the text.

use chrono::{DateTime, Utc};

use crate::domain::{
    CREATED_AT_FIELD, DELETED_AT_FIELD, FieldName, FilterSet, ID_FIELD, MAX_RESULT_ROWS, Patch,
    Record, RecordId, TableName, UPDATED_AT_FIELD, Value, ValueObjectError,
};

/// Query text plus the values bound to its `$n` placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    /// Trusted query text
    pub text: String,
    /// Bound parameter values; `params[0]` backs `$1`
    pub params: Vec<Value>,
}

/// Which rows a read considers with respect to the soft-delete lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    /// Live records only (`deleted_at IS NULL`)
    Active,
    /// Every physically present record, including soft-deleted ones
    All,
}

/// Single-record lookup on one field.
pub fn select_by_field(
    table: &TableName,
    field: &FieldName,
    value: Value,
    scope: RowScope,
) -> SqlQuery {
    let mut text = format!("SELECT * FROM {table} WHERE {field} = $1");
    if scope == RowScope::Active {
        text.push_str(&format!(" AND {DELETED_AT_FIELD} IS NULL"));
    }
    SqlQuery {
        text,
        params: vec![value],
    }
}

/// Filtered scan: equality conjunction over the filter set, capped at
/// [`MAX_RESULT_ROWS`] rows.
pub fn select_filtered(table: &TableName, filters: &FilterSet, scope: RowScope) -> SqlQuery {
    let mut conditions = Vec::new();
    let mut params = Vec::new();
    if scope == RowScope::Active {
        conditions.push(format!("{DELETED_AT_FIELD} IS NULL"));
    }
    for (field, value) in filters.iter() {
        params.push(value.clone());
        conditions.push(format!("{field} = ${}", params.len()));
    }

    let mut text = format!("SELECT * FROM {table}");
    if !conditions.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&conditions.join(" AND "));
    }
    text.push_str(&format!(" LIMIT {MAX_RESULT_ROWS}"));
    SqlQuery { text, params }
}

/// Insert all provided fields plus the `created_at`/`updated_at` stamps,
/// returning the materialized row.
///
/// Column names come from the record's keys and are re-validated here; a
/// record built with an untrusted name fails before any query is issued.
/// New records are born live: a caller-supplied `deleted_at` is dropped, and
/// the stamps overwrite any caller-supplied `created_at`/`updated_at`.
pub fn insert(table: &TableName, data: &Record, now: DateTime<Utc>) -> Result<SqlQuery, ValueObjectError> {
    let mut fields = data.clone();
    fields.set(CREATED_AT_FIELD, now);
    fields.set(UPDATED_AT_FIELD, now);

    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut params = Vec::new();
    for (name, value) in fields.iter() {
        if name == DELETED_AT_FIELD {
            continue;
        }
        FieldName::new(name.to_string())?;
        params.push(value.clone());
        columns.push(name.to_string());
        placeholders.push(format!("${}", params.len()));
    }

    let text = format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
        columns.join(", "),
        placeholders.join(", ")
    );
    Ok(SqlQuery { text, params })
}

/// Partial update of one live record: applies the patch minus the identifier
/// field, stamps `updated_at`, and returns the updated row.
pub fn update_by_id(
    table: &TableName,
    id: &RecordId,
    patch: &Patch,
    now: DateTime<Utc>,
) -> SqlQuery {
    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for (field, value) in patch.iter() {
        // The identifier is immutable by contract; our stamp wins over any
        // caller-supplied updated_at.
        if field.as_str() == ID_FIELD || field.as_str() == UPDATED_AT_FIELD {
            continue;
        }
        params.push(value.clone());
        assignments.push(format!("{field} = ${}", params.len()));
    }
    params.push(Value::Timestamp(now));
    assignments.push(format!("{UPDATED_AT_FIELD} = ${}", params.len()));
    params.push(Value::Text(id.as_str().to_string()));

    let text = format!(
        "UPDATE {table} SET {} WHERE {ID_FIELD} = ${} AND {DELETED_AT_FIELD} IS NULL RETURNING *",
        assignments.join(", "),
        params.len()
    );
    SqlQuery { text, params }
}

/// Soft delete: stamp `deleted_at` and `updated_at` on a not-yet-deleted
/// record. One statement; the affected-row count tells whether it applied.
pub fn soft_delete_by_id(table: &TableName, id: &RecordId, now: DateTime<Utc>) -> SqlQuery {
    let text = format!(
        "UPDATE {table} SET {DELETED_AT_FIELD} = $1, {UPDATED_AT_FIELD} = $2 \
         WHERE {ID_FIELD} = $3 AND {DELETED_AT_FIELD} IS NULL"
    );
    SqlQuery {
        text,
        params: vec![
            Value::Timestamp(now),
            Value::Timestamp(now),
            Value::Text(id.as_str().to_string()),
        ],
    }
}
