// Service exports
pub mod catalog;
pub mod memory;
pub mod postgres;
pub mod storage;

pub use memory::{InMemoryStore, StoredFeedback};
pub use postgres::PostgresStore;
pub use storage::{Storage, StorageError};
