pub mod memory;
pub mod rest;

pub use memory::MemoryTableStore;
pub use rest::RestTableStore;
