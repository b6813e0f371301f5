// Expose modules as public for use by the binary and benchmarks
pub mod db;
pub mod graph;
pub mod ingest;
pub mod prompt;
pub mod query;

// Re-export core types for convenience
pub use db::Database;
pub use graph::entity;
pub use graph::relationship;
pub use graph::{GraphStore, MemoryGraph, StoreError};
