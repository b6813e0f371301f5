pub mod entity;
pub mod memory;
pub mod relationship;
pub mod store;

pub use crate::graph::memory::MemoryGraph;
pub use crate::graph::store::{GraphStore, StoreError, WriteOutcome};
