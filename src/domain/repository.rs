use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::domain::query::{Filter, Query};
use crate::domain::store::{Row, TableStore};
use crate::{Error, Result};

/// リポジトリ操作の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Filter,
}

/// Data access for one named table.
///
/// A repository is three immutable pieces: a table name, the column used
/// as the default filter target, and a shared [`TableStore`] handle. Each
/// method translates to exactly one remote call; no state survives
/// between calls and nothing is retried.
pub struct Repository {
    table: String,
    primary_key: String,
    store: Arc<dyn TableStore>,
}

impl Repository {
    pub fn new(
        table: impl Into<String>,
        primary_key: impl Into<String>,
        store: Arc<dyn TableStore>,
    ) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
            store,
        }
    }

    /// Builds a repository on the process-wide shared store handle.
    ///
    /// Fails with [`Error::Config`] when the connection credentials are
    /// not available in the environment.
    pub fn connect(table: impl Into<String>, primary_key: impl Into<String>) -> Result<Self> {
        let store = crate::client::shared_store()?;
        Ok(Self::new(table, primary_key, store))
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Inserts one row and returns the stored representation.
    pub async fn create(&self, data: Value) -> Result<Vec<Row>> {
        let query = Query::insert(&self.table, data);
        self.execute(Operation::Create, query).await
    }

    /// Reads rows where `column` (default: primary key) equals `value`.
    pub async fn read(&self, value: Value, column: Option<&str>) -> Result<Vec<Row>> {
        let column = column.unwrap_or(&self.primary_key);
        let query = Query::select(&self.table, "*").eq(column, value);
        self.execute(Operation::Read, query).await
    }

    /// Updates rows where `column` (default: primary key) equals `value`
    /// and returns the updated rows.
    pub async fn update(&self, value: Value, data: Value, column: Option<&str>) -> Result<Vec<Row>> {
        let column = column.unwrap_or(&self.primary_key);
        let query = Query::update(&self.table, data).eq(column, value);
        self.execute(Operation::Update, query).await
    }

    /// Deletes rows where `column` (default: primary key) equals `value`
    /// and returns the deleted rows.
    pub async fn delete(&self, value: Value, column: Option<&str>) -> Result<Vec<Row>> {
        let column = column.unwrap_or(&self.primary_key);
        let query = Query::delete(&self.table).eq(column, value);
        self.execute(Operation::Delete, query).await
    }

    /// Reads rows matching every filter condition, in the given order.
    ///
    /// `select` narrows the returned columns; `None` selects all.
    pub async fn filter(&self, filters: Vec<Filter>, select: Option<&str>) -> Result<Vec<Row>> {
        let mut query = Query::select(&self.table, select.unwrap_or("*"));
        for filter in filters {
            query = query.filter(filter);
        }
        self.execute(Operation::Filter, query).await
    }

    // 全操作共通の実行パス：成功をINFO、失敗をERRORで記録し、
    // ストアエラーをドメインエラーに包み直す
    async fn execute(&self, operation: Operation, query: Query) -> Result<Vec<Row>> {
        match self.store.execute(&query).await {
            Ok(rows) => {
                info!(
                    %operation,
                    table = %self.table,
                    rows = rows.len(),
                    "operation successful"
                );
                Ok(rows)
            }
            Err(e) => {
                error!(%operation, table = %self.table, error = %e, "operation failed");
                Err(Error::Database {
                    operation,
                    table: self.table.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}
