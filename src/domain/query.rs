use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::Error;

/// フィルター演算子
///
/// Comparison operators understood by the remote table store. The wire
/// names (`eq`, `neq`, ...) match the remote query language one to one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    Is,
    In,
}

impl FilterOperator {
    /// Parses a wire-format operator name.
    ///
    /// Anything outside the enumerated set is rejected before a query is
    /// ever built, so no remote call is attempted for a bad operator.
    pub fn parse(op: &str) -> crate::Result<Self> {
        Self::from_str(op).map_err(|_| Error::InvalidFilter(format!("unknown operator `{op}`")))
    }
}

/// 単一フィルター条件（フィールド名、演算子、値）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Builds a filter from an untyped operator name, validating it first.
    pub fn from_parts(
        field: impl Into<String>,
        operator: &str,
        value: Value,
    ) -> crate::Result<Self> {
        Ok(Self::new(field, FilterOperator::parse(operator)?, value))
    }
}

/// クエリの種別
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert one row and return its representation.
    Insert(Value),
    /// Select the given column list (`"*"` for all columns).
    Select { columns: String },
    /// Update matching rows with the given partial row.
    Update(Value),
    /// Delete matching rows.
    Delete,
}

impl Command {
    /// Wire-level verb, used in log and error text.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Insert(_) => "insert",
            Command::Select { .. } => "select",
            Command::Update(_) => "update",
            Command::Delete => "delete",
        }
    }
}

/// One prepared query against a named table.
///
/// A `Query` is plain data: a table, a command, and an ordered filter
/// list. Filters are AND-composed left to right. Execution is entirely up
/// to the [`TableStore`](crate::TableStore) that receives it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub command: Command,
    pub filters: Vec<Filter>,
}

impl Query {
    fn new(table: impl Into<String>, command: Command) -> Self {
        Self {
            table: table.into(),
            command,
            filters: Vec::new(),
        }
    }

    pub fn insert(table: impl Into<String>, data: Value) -> Self {
        Self::new(table, Command::Insert(data))
    }

    pub fn select(table: impl Into<String>, columns: impl Into<String>) -> Self {
        Self::new(
            table,
            Command::Select {
                columns: columns.into(),
            },
        )
    }

    pub fn update(table: impl Into<String>, data: Value) -> Self {
        Self::new(table, Command::Update(data))
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self::new(table, Command::Delete)
    }

    /// Appends one filter condition. Conditions accumulate in call order.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Shorthand for the equality filter every CRUD path uses.
    pub fn eq(self, field: impl Into<String>, value: Value) -> Self {
        self.filter(Filter::new(field, FilterOperator::Eq, value))
    }
}
