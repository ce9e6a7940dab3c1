pub mod migrations;
pub mod repository;

pub use repository::{KvStore, SqliteKv};
#[cfg(test)]
pub use repository::MemoryKv;
