pub mod client;
pub mod domain;
pub mod infrastructure;

pub use client::{shared_store, ClientConfig, SharedStore};
pub use domain::query::{Command, Filter, FilterOperator, Query};
pub use domain::repository::{Operation, Repository};
pub use domain::store::{Row, StoreError, TableStore};
pub use infrastructure::memory::MemoryTableStore;
pub use infrastructure::rest::RestTableStore;

// restbase version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Library result type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to {operation} record: {message} (table: {table})")]
    Database {
        operation: Operation,
        table: String,
        message: String,
    },
}

impl Error {
    /// Operation the error originated from, when it came from a remote call.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Error::Database { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
