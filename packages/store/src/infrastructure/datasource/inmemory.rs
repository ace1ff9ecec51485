//! InMemory DataSource 実装
//!
//! クエリビルダが生成する正規形のクエリのみを解釈するインメモリ実装。
//! テーブルごとの `Vec<Record>` をストレージとして使用し、挿入順を保持します。
//! バインドパラメータは常にリテラル値として扱われ、クエリ構文として解釈される
//! ことはありません。未知のクエリ形式は `DataSourceError` として拒否します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{ID_FIELD, Record, Value};

use super::{DataSource, DataSourceError};

/// In-memory data source for tests and as a reference backend.
///
/// Enforces id uniqueness per table and generates a UUID v4 identifier on
/// insert when the caller supplies none.
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    tables: Mutex<HashMap<String, Vec<Record>>>,
}

/// One parsed `field = $n` or `field IS NULL` fragment.
struct Condition<'a> {
    field: &'a str,
    kind: ConditionKind,
}

enum ConditionKind {
    Bound(usize),
    IsNull,
}

/// Parsed `SELECT * FROM t [WHERE ...] [LIMIT n]` statement.
struct SelectStatement<'a> {
    table: &'a str,
    conditions: Vec<Condition<'a>>,
    limit: Option<usize>,
}

fn unsupported(fragment: &str) -> DataSourceError {
    DataSourceError::Other(format!("unsupported query shape: {fragment}"))
}

fn parse_placeholder(token: &str, params_len: usize) -> Result<usize, DataSourceError> {
    let index = token
        .strip_prefix('$')
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| unsupported(token))?;
    if index == 0 || index > params_len {
        return Err(DataSourceError::Other(format!(
            "parameter ${index} out of range"
        )));
    }
    Ok(index - 1)
}

fn parse_conditions<'a>(
    clause: &'a str,
    params_len: usize,
) -> Result<Vec<Condition<'a>>, DataSourceError> {
    clause
        .split(" AND ")
        .map(|part| {
            if let Some(field) = part.strip_suffix(" IS NULL") {
                Ok(Condition {
                    field,
                    kind: ConditionKind::IsNull,
                })
            } else if let Some((field, token)) = part.split_once(" = ") {
                Ok(Condition {
                    field,
                    kind: ConditionKind::Bound(parse_placeholder(token, params_len)?),
                })
            } else {
                Err(unsupported(part))
            }
        })
        .collect()
}

/// One parsed `field = $n` fragment of a SET list.
struct Assignment<'a> {
    field: &'a str,
    index: usize,
}

// SET lists are comma-joined, unlike WHERE clauses, and never contain
// IS NULL.
fn parse_assignments<'a>(
    clause: &'a str,
    params_len: usize,
) -> Result<Vec<Assignment<'a>>, DataSourceError> {
    clause
        .split(", ")
        .map(|part| {
            let (field, token) = part.split_once(" = ").ok_or_else(|| unsupported(part))?;
            Ok(Assignment {
                field,
                index: parse_placeholder(token, params_len)?,
            })
        })
        .collect()
}

fn parse_select<'a>(
    query: &'a str,
    params_len: usize,
) -> Result<SelectStatement<'a>, DataSourceError> {
    let rest = query
        .strip_prefix("SELECT * FROM ")
        .ok_or_else(|| unsupported(query))?;
    let (rest, limit) = match rest.rsplit_once(" LIMIT ") {
        Some((head, n)) => (
            head,
            Some(n.parse::<usize>().map_err(|_| unsupported(query))?),
        ),
        None => (rest, None),
    };
    let (table, conditions) = match rest.split_once(" WHERE ") {
        Some((table, clause)) => (table, parse_conditions(clause, params_len)?),
        None => (rest, Vec::new()),
    };
    Ok(SelectStatement {
        table,
        conditions,
        limit,
    })
}

/// Bound parameters are compared as literal values; `IS NULL` matches both an
/// explicit null and an absent field.
fn matches_all(record: &Record, conditions: &[Condition<'_>], params: &[Value]) -> bool {
    conditions.iter().all(|condition| match condition.kind {
        ConditionKind::IsNull => record.get(condition.field).is_none_or(Value::is_null),
        ConditionKind::Bound(index) => record.get(condition.field) == params.get(index),
    })
}

impl InMemoryDataSource {
    /// Create an empty in-memory data source.
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, query: &str, params: &[Value]) -> Result<Vec<Record>, DataSourceError> {
        let statement = parse_select(query, params.len())?;
        let tables = self.tables.lock().await;
        let rows = tables
            .get(statement.table)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let mut matched: Vec<Record> = rows
            .iter()
            .filter(|row| matches_all(row, &statement.conditions, params))
            .cloned()
            .collect();
        if let Some(limit) = statement.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    // INSERT INTO t (a, b) VALUES ($1, $2) RETURNING *
    async fn insert_record(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Record, DataSourceError> {
        let rest = query
            .strip_prefix("INSERT INTO ")
            .ok_or_else(|| unsupported(query))?;
        let rest = rest
            .strip_suffix(" RETURNING *")
            .ok_or_else(|| unsupported(query))?;
        let (head, placeholders) = rest
            .split_once(") VALUES (")
            .ok_or_else(|| unsupported(query))?;
        let placeholders = placeholders
            .strip_suffix(')')
            .ok_or_else(|| unsupported(query))?;
        let (table, columns) = head.split_once(" (").ok_or_else(|| unsupported(query))?;

        let columns: Vec<&str> = columns.split(", ").collect();
        let tokens: Vec<&str> = placeholders.split(", ").collect();
        if columns.len() != tokens.len() {
            return Err(unsupported(query));
        }

        let mut record = Record::new();
        for (column, token) in columns.iter().zip(tokens) {
            let index = parse_placeholder(token, params.len())?;
            record.set(*column, params[index].clone());
        }
        if record.get(ID_FIELD).is_none_or(Value::is_null) {
            record.set(ID_FIELD, Uuid::new_v4().to_string());
        }

        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|row| row.get(ID_FIELD) == record.get(ID_FIELD)) {
            return Err(DataSourceError::Constraint(format!(
                "duplicate id in {table}"
            )));
        }
        rows.push(record.clone());
        Ok(record)
    }

    // UPDATE t SET a = $1, b = $2 WHERE id = $3 [RETURNING *]
    async fn update_records(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Record>, DataSourceError> {
        let rest = query
            .strip_prefix("UPDATE ")
            .ok_or_else(|| unsupported(query))?;
        let rest = rest.strip_suffix(" RETURNING *").unwrap_or(rest);
        let (table, rest) = rest.split_once(" SET ").ok_or_else(|| unsupported(query))?;
        let (assignments, clause) = rest
            .split_once(" WHERE ")
            .ok_or_else(|| unsupported(query))?;

        let assignments = parse_assignments(assignments, params.len())?;
        let conditions = parse_conditions(clause, params.len())?;

        let mut tables = self.tables.lock().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let mut touched = Vec::new();
        for row in rows.iter_mut() {
            if !matches_all(row, &conditions, params) {
                continue;
            }
            for assignment in &assignments {
                row.set(assignment.field, params[assignment.index].clone());
            }
            touched.push(row.clone());
        }
        Ok(touched)
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn fetch_one(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Option<Record>, DataSourceError> {
        if query.starts_with("SELECT") {
            Ok(self.select(query, params).await?.into_iter().next())
        } else if query.starts_with("INSERT") {
            self.insert_record(query, params).await.map(Some)
        } else if query.starts_with("UPDATE") {
            Ok(self.update_records(query, params).await?.into_iter().next())
        } else {
            Err(unsupported(query))
        }
    }

    async fn fetch_all(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Record>, DataSourceError> {
        if query.starts_with("SELECT") {
            self.select(query, params).await
        } else {
            Err(unsupported(query))
        }
    }

    async fn execute(&self, query: &str, params: &[Value]) -> Result<u64, DataSourceError> {
        if query.starts_with("UPDATE") {
            Ok(self.update_records(query, params).await?.len() as u64)
        } else {
            Err(unsupported(query))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Value {
        Value::Text(value.to_string())
    }

    async fn seed_user(source: &InMemoryDataSource, id: &str, name: &str) -> Record {
        source
            .fetch_one(
                "INSERT INTO users (id, name) VALUES ($1, $2) RETURNING *",
                &[text(id), text(name)],
            )
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_select_round_trip() {
        // テスト項目: INSERT したレコードを SELECT で取得できる
        // given (前提条件):
        let source = InMemoryDataSource::new();
        seed_user(&source, "u-1", "alice").await;

        // when (操作):
        let found = source
            .fetch_one("SELECT * FROM users WHERE id = $1", &[text("u-1")])
            .await
            .unwrap();

        // then (期待する結果):
        let record = found.unwrap();
        assert_eq!(record.id(), Some("u-1"));
        assert_eq!(record.get("name"), Some(&text("alice")));
    }

    #[tokio::test]
    async fn test_insert_generates_id_when_missing() {
        // テスト項目: id 列なしの INSERT では UUID が生成される
        // given (前提条件):
        let source = InMemoryDataSource::new();

        // when (操作):
        let record = source
            .fetch_one(
                "INSERT INTO users (name) VALUES ($1) RETURNING *",
                &[text("alice")],
            )
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert_eq!(record.id().unwrap().len(), 36);
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_is_constraint_violation() {
        // テスト項目: 同一 id の二重 INSERT は制約違反になる
        // given (前提条件):
        let source = InMemoryDataSource::new();
        seed_user(&source, "u-1", "alice").await;

        // when (操作):
        let result = source
            .fetch_one(
                "INSERT INTO users (id, name) VALUES ($1, $2) RETURNING *",
                &[text("u-1"), text("bob")],
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(DataSourceError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_is_null_matches_absent_and_null_fields() {
        // テスト項目: IS NULL は欠落フィールドと明示的 NULL の両方にマッチする
        // given (前提条件):
        let source = InMemoryDataSource::new();
        seed_user(&source, "u-1", "alice").await;
        source
            .fetch_one(
                "INSERT INTO users (deleted_at, id, name) VALUES ($1, $2, $3) RETURNING *",
                &[Value::Null, text("u-2"), text("bob")],
            )
            .await
            .unwrap();

        // when (操作):
        let live = source
            .fetch_all("SELECT * FROM users WHERE deleted_at IS NULL", &[])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(live.len(), 2);
    }

    #[tokio::test]
    async fn test_select_preserves_insertion_order_and_limit() {
        // テスト項目: SELECT は挿入順を保持し LIMIT で切り詰める
        // given (前提条件):
        let source = InMemoryDataSource::new();
        for i in 0..5 {
            seed_user(&source, &format!("u-{i}"), "user").await;
        }

        // when (操作):
        let rows = source
            .fetch_all("SELECT * FROM users LIMIT 3", &[])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id(), Some("u-0"));
        assert_eq!(rows[2].id(), Some("u-2"));
    }

    #[tokio::test]
    async fn test_update_applies_assignments_and_counts_rows() {
        // テスト項目: UPDATE は代入を適用し影響行数を返す
        // given (前提条件):
        let source = InMemoryDataSource::new();
        seed_user(&source, "u-1", "alice").await;

        // when (操作):
        let affected = source
            .execute(
                "UPDATE users SET name = $1 WHERE id = $2",
                &[text("alicia"), text("u-1")],
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(affected, 1);
        let record = source
            .fetch_one("SELECT * FROM users WHERE id = $1", &[text("u-1")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.get("name"), Some(&text("alicia")));
    }

    #[tokio::test]
    async fn test_update_with_multiple_assignments_and_returning() {
        // テスト項目: 複数代入かつ RETURNING * の UPDATE が更新後の行を返す
        // given (前提条件):
        let source = InMemoryDataSource::new();
        seed_user(&source, "u-1", "alice").await;

        // when (操作):
        let updated = source
            .fetch_one(
                "UPDATE users SET email = $1, name = $2 \
                 WHERE id = $3 AND deleted_at IS NULL RETURNING *",
                &[text("alicia@example.com"), text("alicia"), text("u-1")],
            )
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert_eq!(updated.get("email"), Some(&text("alicia@example.com")));
        assert_eq!(updated.get("name"), Some(&text("alicia")));
        assert_eq!(updated.id(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_two_assignment_update_marks_live_row_once() {
        // テスト項目: deleted_at と updated_at を同時に代入する UPDATE は
        //             未削除の行に一度だけ適用される
        // given (前提条件):
        let source = InMemoryDataSource::new();
        seed_user(&source, "u-1", "alice").await;
        let stamp = Value::Timestamp(chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let statement = "UPDATE users SET deleted_at = $1, updated_at = $2 \
                         WHERE id = $3 AND deleted_at IS NULL";

        // when (操作):
        let first = source
            .execute(statement, &[stamp.clone(), stamp.clone(), text("u-1")])
            .await
            .unwrap();
        let second = source
            .execute(statement, &[stamp.clone(), stamp.clone(), text("u-1")])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first, 1);
        assert_eq!(second, 0);
        let row = source
            .fetch_one("SELECT * FROM users WHERE id = $1", &[text("u-1")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.get("deleted_at"), Some(&stamp));
    }

    #[tokio::test]
    async fn test_unknown_query_shape_is_rejected() {
        // テスト項目: 未知のクエリ形式はエラーとして拒否される
        // given (前提条件):
        let source = InMemoryDataSource::new();

        // when (操作):
        let result = source.fetch_all("DELETE FROM users", &[]).await;

        // then (期待する結果):
        assert!(matches!(result, Err(DataSourceError::Other(_))));
    }

    #[tokio::test]
    async fn test_bound_parameter_is_never_query_syntax() {
        // テスト項目: バインドパラメータはリテラル値としてのみ比較される
        // given (前提条件):
        let source = InMemoryDataSource::new();
        seed_user(&source, "u-1", "a' OR '1'='1").await;
        seed_user(&source, "u-2", "bob").await;

        // when (操作):
        let rows = source
            .fetch_all(
                "SELECT * FROM users WHERE name = $1",
                &[text("a' OR '1'='1")],
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), Some("u-1"));
    }
}
