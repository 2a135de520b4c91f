pub mod query;
pub mod repository;
pub mod store;

pub use query::{Command, Filter, FilterOperator, Query};
pub use repository::{Operation, Repository};
pub use store::{Row, StoreError, TableStore};
