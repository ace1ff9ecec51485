//! Value Objects for the record domain.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity. `FieldName` and
//! `TableName` are the only route by which an identifier reaches query text,
//! so their validation is what keeps dynamic query construction safe.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{ID_FIELD, Value};
use super::error::ValueObjectError;

/// Maximum identifier length accepted for field and table names.
const MAX_IDENTIFIER_LEN: usize = 63;

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Record identifier value object.
///
/// Represents the unique identifier of a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new RecordId.
    ///
    /// # Returns
    ///
    /// A Result containing the RecordId or an error if validation fails
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::RecordIdEmpty);
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Field name value object.
///
/// A validated column identifier. Only values of this type may be rendered
/// into query text; everything else is bound as a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(String);

impl FieldName {
    /// Create a new FieldName.
    ///
    /// # Returns
    ///
    /// A Result containing the FieldName or an error if the name is not an
    /// ASCII identifier of bounded length
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        if name.is_empty() {
            return Err(ValueObjectError::FieldNameEmpty);
        }
        let len = name.len();
        if len > MAX_IDENTIFIER_LEN {
            return Err(ValueObjectError::FieldNameTooLong {
                max: MAX_IDENTIFIER_LEN,
                actual: len,
            });
        }
        if !is_valid_identifier(&name) {
            return Err(ValueObjectError::FieldNameInvalid(name));
        }
        Ok(Self(name))
    }

    /// Construct from a fixed schema identifier known at compile time.
    ///
    /// Callers outside the crate go through [`FieldName::new`], which
    /// validates.
    pub(crate) fn known(name: &str) -> Self {
        debug_assert!(is_valid_identifier(name));
        Self(name.to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Table name value object.
///
/// Same identifier rule as [`FieldName`]; fixed at repository construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Create a new TableName.
    ///
    /// # Returns
    ///
    /// A Result containing the TableName or an error if the name is not an
    /// ASCII identifier of bounded length
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        if name.is_empty() {
            return Err(ValueObjectError::TableNameEmpty);
        }
        let len = name.len();
        if len > MAX_IDENTIFIER_LEN {
            return Err(ValueObjectError::TableNameTooLong {
                max: MAX_IDENTIFIER_LEN,
                actual: len,
            });
        }
        if !is_valid_identifier(&name) {
            return Err(ValueObjectError::TableNameInvalid(name));
        }
        Ok(Self(name))
    }

    /// Construct from a fixed schema identifier known at compile time.
    pub(crate) fn known(name: &str) -> Self {
        debug_assert!(is_valid_identifier(name));
        Self(name.to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Equality conditions used to narrow a query.
///
/// All conditions are AND-ed; insertion order is irrelevant; an empty set
/// means no restriction.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    conditions: BTreeMap<FieldName, Value>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`, replacing any previous condition on
    /// the same field.
    pub fn insert(&mut self, field: FieldName, value: impl Into<Value>) {
        self.conditions.insert(field, value.into());
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the set places no restriction.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterate over conditions in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &Value)> {
        self.conditions.iter()
    }
}

/// A partial update: only the supplied fields are modified, untouched fields
/// retain their prior values.
///
/// The identifier field is excluded by contract; a patch entry for it is
/// silently dropped when the update is applied.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    fields: BTreeMap<FieldName, Value>,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`, replacing any previous entry.
    pub fn insert(&mut self, field: FieldName, value: impl Into<Value>) {
        self.fields.insert(field, value.into());
    }

    /// Number of fields in the patch.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the patch supplies no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over patch entries in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &Value)> {
        self.fields.iter()
    }

    /// Whether the patch attempts to modify the identifier field.
    pub fn touches_identifier(&self) -> bool {
        self.fields.keys().any(|field| field.as_str() == ID_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_new_success() {
        // テスト項目: 有効なレコード ID を作成できる
        // when (操作):
        let result = RecordId::new("user-1".to_string());

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "user-1");
    }

    #[test]
    fn test_record_id_new_empty_fails() {
        // テスト項目: 空のレコード ID は作成できない
        // when (操作):
        let result = RecordId::new("".to_string());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::RecordIdEmpty);
    }

    #[test]
    fn test_field_name_new_success() {
        // テスト項目: 有効な識別子からフィールド名を作成できる
        // when (操作):
        let result = FieldName::new("display_name".to_string());

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "display_name");
    }

    #[test]
    fn test_field_name_rejects_sql_metacharacters() {
        // テスト項目: SQL メタ文字を含む名前はフィールド名として拒否される
        // given (前提条件):
        let hostile = "name = '' OR 1=1 --".to_string();

        // when (操作):
        let result = FieldName::new(hostile.clone());

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::FieldNameInvalid(hostile)
        );
    }

    #[test]
    fn test_field_name_rejects_leading_digit() {
        // テスト項目: 数字で始まる名前は拒否される
        // when (操作):
        let result = FieldName::new("1name".to_string());

        // then (期待する結果):
        assert!(matches!(
            result.unwrap_err(),
            ValueObjectError::FieldNameInvalid(_)
        ));
    }

    #[test]
    fn test_field_name_new_too_long_fails() {
        // テスト項目: 64 文字以上のフィールド名は作成できない
        // when (操作):
        let result = FieldName::new("a".repeat(64));

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::FieldNameTooLong {
                max: 63,
                actual: 64
            }
        );
    }

    #[test]
    fn test_table_name_rejects_invalid_identifier() {
        // テスト項目: 不正な識別子はテーブル名として拒否される
        // when (操作):
        let result = TableName::new("users; DROP TABLE users".to_string());

        // then (期待する結果):
        assert!(matches!(
            result.unwrap_err(),
            ValueObjectError::TableNameInvalid(_)
        ));
    }

    #[test]
    fn test_filter_set_orders_conditions_by_field_name() {
        // テスト項目: 条件はフィールド名の辞書順で列挙される
        // given (前提条件):
        let mut filters = FilterSet::new();
        filters.insert(FieldName::new("role".to_string()).unwrap(), "admin");
        filters.insert(FieldName::new("email".to_string()).unwrap(), "a@b.c");

        // when (操作):
        let names: Vec<&str> = filters.iter().map(|(field, _)| field.as_str()).collect();

        // then (期待する結果):
        assert_eq!(names, vec!["email", "role"]);
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn test_patch_touches_identifier() {
        // テスト項目: id フィールドを含むパッチを検出できる
        // given (前提条件):
        let mut patch = Patch::new();
        assert!(!patch.touches_identifier());

        // when (操作):
        patch.insert(FieldName::new("id".to_string()).unwrap(), "forged");

        // then (期待する結果):
        assert!(patch.touches_identifier());
    }
}
