use async_trait::async_trait;
use thiserror::Error;

use crate::domain::query::Query;

/// One record as the remote store represents it: a JSON object.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// ストアエラー
#[derive(Error, Debug)]
pub enum StoreError {
    // Transport failures pass the client's message through untouched so
    // the repository error keeps the original text.
    #[error("{0}")]
    Transport(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),
}

/// テーブルストア - プリペアドクエリの実行のための抽象インターフェース
///
/// The narrow seam between the repository layer and whatever actually
/// holds the data. The hosted HTTP backend and the in-memory fake both
/// implement it, so repositories and their tests never depend on a
/// concrete client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Executes one prepared query and returns the affected rows.
    async fn execute(&self, query: &Query) -> Result<Vec<Row>, StoreError>;
}
