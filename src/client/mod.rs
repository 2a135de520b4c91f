pub mod connection;

pub use connection::{shared_store, ClientConfig, SharedStore};
