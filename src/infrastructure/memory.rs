use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::query::{Command, Filter, FilterOperator, Query};
use crate::domain::store::{Row, StoreError, TableStore};

/// In-memory table store.
///
/// Interprets the same query plans the hosted backend receives, against
/// plain vectors of rows. Meant for tests and local development; tables
/// appear on first insert, and reads against unknown tables fail the way
/// the remote store would.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of a table, mainly for test assertions.
    pub fn snapshot(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn unknown_table(table: &str) -> StoreError {
        StoreError::Remote {
            status: 404,
            message: format!("relation \"{table}\" does not exist"),
        }
    }
}

fn matches_filters(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| eval_filter(row, f))
}

fn eval_filter(row: &Row, filter: &Filter) -> bool {
    let row_value = match row.get(&filter.field) {
        Some(v) => v,
        // 存在しないフィールドは IS NULL のみ一致
        None => return filter.operator == FilterOperator::Is && filter.value.is_null(),
    };

    match filter.operator {
        FilterOperator::Eq => row_value == &filter.value,
        FilterOperator::Neq => row_value != &filter.value,
        FilterOperator::Gt => compare(row_value, &filter.value, |o| o.is_gt()),
        FilterOperator::Gte => compare(row_value, &filter.value, |o| o.is_ge()),
        FilterOperator::Lt => compare(row_value, &filter.value, |o| o.is_lt()),
        FilterOperator::Lte => compare(row_value, &filter.value, |o| o.is_le()),
        FilterOperator::Like => like_match(row_value, &filter.value, false),
        FilterOperator::Ilike => like_match(row_value, &filter.value, true),
        FilterOperator::Is => row_value == &filter.value,
        FilterOperator::In => match &filter.value {
            Value::Array(items) => items.contains(row_value),
            _ => false,
        },
    }
}

// Ordering comparisons are defined for number/number and string/string
// pairs; every other combination is simply no match.
fn compare(left: &Value, right: &Value, check: fn(std::cmp::Ordering) -> bool) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).is_some_and(check),
            _ => false,
        },
        (Value::String(a), Value::String(b)) => check(a.cmp(b)),
        _ => false,
    }
}

// シンプルなLIKE演算子の実装（%のみサポート）
fn like_match(value: &Value, pattern: &Value, case_insensitive: bool) -> bool {
    let (Value::String(text), Value::String(pattern)) = (value, pattern) else {
        return false;
    };

    let (text, pattern) = if case_insensitive {
        (text.to_lowercase(), pattern.to_lowercase())
    } else {
        (text.clone(), pattern.clone())
    };

    if pattern.starts_with('%') && pattern.ends_with('%') && pattern.len() >= 2 {
        text.contains(&pattern[1..pattern.len() - 1])
    } else if let Some(suffix) = pattern.strip_prefix('%') {
        text.ends_with(suffix)
    } else if let Some(prefix) = pattern.strip_suffix('%') {
        text.starts_with(prefix)
    } else {
        text == pattern
    }
}

fn project(row: &Row, columns: &str) -> Row {
    if columns.trim() == "*" {
        return row.clone();
    }

    columns
        .split(',')
        .map(str::trim)
        .filter_map(|col| row.get(col).map(|v| (col.to_string(), v.clone())))
        .collect()
}

fn as_rows(data: &Value) -> Result<Vec<Row>, StoreError> {
    match data {
        Value::Object(row) => Ok(vec![row.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row.clone()),
                other => Err(StoreError::InvalidPayload(format!(
                    "expected row object, got {other}"
                ))),
            })
            .collect(),
        other => Err(StoreError::InvalidPayload(format!(
            "expected row object, got {other}"
        ))),
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn execute(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        match &query.command {
            Command::Insert(data) => {
                let new_rows = as_rows(data)?;
                let mut tables = self.tables.write().unwrap();
                let rows = tables.entry(query.table.clone()).or_default();
                rows.extend(new_rows.iter().cloned());
                Ok(new_rows)
            }
            Command::Select { columns } => {
                let tables = self.tables.read().unwrap();
                let rows = tables
                    .get(&query.table)
                    .ok_or_else(|| Self::unknown_table(&query.table))?;
                Ok(rows
                    .iter()
                    .filter(|row| matches_filters(row, &query.filters))
                    .map(|row| project(row, columns))
                    .collect())
            }
            Command::Update(data) => {
                let updates = match data {
                    Value::Object(map) => map.clone(),
                    other => {
                        return Err(StoreError::InvalidPayload(format!(
                            "expected row object, got {other}"
                        )))
                    }
                };
                let mut tables = self.tables.write().unwrap();
                let rows = tables
                    .get_mut(&query.table)
                    .ok_or_else(|| Self::unknown_table(&query.table))?;

                let mut updated = Vec::new();
                for row in rows.iter_mut() {
                    if matches_filters(row, &query.filters) {
                        for (column, value) in &updates {
                            row.insert(column.clone(), value.clone());
                        }
                        updated.push(row.clone());
                    }
                }
                Ok(updated)
            }
            Command::Delete => {
                let mut tables = self.tables.write().unwrap();
                let rows = tables
                    .get_mut(&query.table)
                    .ok_or_else(|| Self::unknown_table(&query.table))?;

                let (deleted, kept): (Vec<Row>, Vec<Row>) = rows
                    .drain(..)
                    .partition(|row| matches_filters(row, &query.filters));
                *rows = kept;
                Ok(deleted)
            }
        }
    }
}
