use thiserror::Error;

use super::entity::{Node, NodeLabel};
use super::relationship::{RelationshipSpec, RelationshipType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{label} node not found: {name}")]
    NodeNotFound { label: NodeLabel, name: String },

    #[error("Corrupt graph data: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// What a merge-style write did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Matched,
}

/// A transactional property-graph store.
///
/// Each call is one logical operation; implementations scope their
/// connection or lock to the call.
pub trait GraphStore: Send + Sync {
    /// Always adds a new node, even when one with the same label and name exists
    fn create_node(&self, node: &Node) -> Result<(), StoreError>;

    /// Updates the first node with the same label and name, or creates it
    fn merge_node(&self, node: &Node) -> Result<WriteOutcome, StoreError>;

    /// Matches both endpoints by label and name and creates the typed edge
    /// between every matching pair, returning how many edges were written.
    /// Fails with `NodeNotFound` when either endpoint is absent.
    fn create_relationship(&self, spec: &RelationshipSpec) -> Result<usize, StoreError>;

    fn relationship_exists(&self, spec: &RelationshipSpec) -> Result<bool, StoreError>;

    /// Nodes whose name contains `fragment`, ignoring case by Unicode rules,
    /// ordered by name
    fn find_nodes_containing(
        &self,
        label: NodeLabel,
        fragment: &str,
    ) -> Result<Vec<Node>, StoreError>;

    /// Distinct node names for a label, ordered
    fn node_names(&self, label: NodeLabel) -> Result<Vec<String>, StoreError>;

    /// The earliest stored node with this label and name
    fn get_node(&self, label: NodeLabel, name: &str) -> Result<Option<Node>, StoreError>;

    /// Distinct, ordered names reachable from the named site over one edge type
    fn neighbor_names(
        &self,
        source: &str,
        relationship_type: RelationshipType,
    ) -> Result<Vec<String>, StoreError>;

    fn count_nodes(&self, label: NodeLabel) -> Result<usize, StoreError>;

    fn count_relationships(&self, relationship_type: RelationshipType)
        -> Result<usize, StoreError>;

    /// Creates the edge unless an identical one is already stored
    fn merge_relationship(&self, spec: &RelationshipSpec) -> Result<WriteOutcome, StoreError> {
        if self.relationship_exists(spec)? {
            return Ok(WriteOutcome::Matched);
        }
        self.create_relationship(spec)?;
        Ok(WriteOutcome::Created)
    }
}
