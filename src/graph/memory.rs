use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use super::entity::{Node, NodeLabel};
use super::relationship::{RelationshipSpec, RelationshipType};
use super::store::{GraphStore, StoreError, WriteOutcome};

#[derive(Debug, Clone)]
struct StoredRelationship {
    source: usize,
    target: usize,
    relationship_type: RelationshipType,
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: Vec<Node>,
    relationships: Vec<StoredRelationship>,
}

impl MemoryState {
    fn indices(&self, label: NodeLabel, name: &str) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.label == label && node.name == name)
            .map(|(index, _)| index)
            .collect()
    }

    fn endpoints(&self, spec: &RelationshipSpec) -> Result<(Vec<usize>, Vec<usize>), StoreError> {
        let sources = self.indices(spec.source_label(), &spec.source);
        if sources.is_empty() {
            return Err(StoreError::NodeNotFound {
                label: spec.source_label(),
                name: spec.source.clone(),
            });
        }

        let targets = self.indices(spec.target_label(), &spec.target);
        if targets.is_empty() {
            return Err(StoreError::NodeNotFound {
                label: spec.target_label(),
                name: spec.target.clone(),
            });
        }

        Ok((sources, targets))
    }
}

/// In-process graph store with the same create and query contract as the
/// SQLite database. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: Mutex<MemoryState>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory graph lock poisoned".to_string()))
    }
}

impl GraphStore for MemoryGraph {
    fn create_node(&self, node: &Node) -> Result<(), StoreError> {
        self.state()?.nodes.push(node.clone());
        Ok(())
    }

    fn merge_node(&self, node: &Node) -> Result<WriteOutcome, StoreError> {
        let mut state = self.state()?;
        let position = state
            .nodes
            .iter()
            .position(|existing| existing.label == node.label && existing.name == node.name);

        match position {
            Some(index) => {
                state.nodes[index].properties = node.properties.clone();
                Ok(WriteOutcome::Matched)
            }
            None => {
                state.nodes.push(node.clone());
                Ok(WriteOutcome::Created)
            }
        }
    }

    fn create_relationship(&self, spec: &RelationshipSpec) -> Result<usize, StoreError> {
        let mut state = self.state()?;
        let (sources, targets) = state.endpoints(spec)?;

        for &source in &sources {
            for &target in &targets {
                state.relationships.push(StoredRelationship {
                    source,
                    target,
                    relationship_type: spec.relationship_type,
                });
            }
        }

        Ok(sources.len() * targets.len())
    }

    fn relationship_exists(&self, spec: &RelationshipSpec) -> Result<bool, StoreError> {
        let state = self.state()?;
        let sources = state.indices(spec.source_label(), &spec.source);
        let targets = state.indices(spec.target_label(), &spec.target);

        Ok(state.relationships.iter().any(|rel| {
            rel.relationship_type == spec.relationship_type
                && sources.contains(&rel.source)
                && targets.contains(&rel.target)
        }))
    }

    fn find_nodes_containing(
        &self,
        label: NodeLabel,
        fragment: &str,
    ) -> Result<Vec<Node>, StoreError> {
        let needle = fragment.to_lowercase();
        let state = self.state()?;
        let mut found: Vec<Node> = state
            .nodes
            .iter()
            .filter(|node| node.label == label && node.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        // stable sort keeps insertion order between equal names
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn node_names(&self, label: NodeLabel) -> Result<Vec<String>, StoreError> {
        let state = self.state()?;
        let names: BTreeSet<String> = state
            .nodes
            .iter()
            .filter(|node| node.label == label)
            .map(|node| node.name.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn get_node(&self, label: NodeLabel, name: &str) -> Result<Option<Node>, StoreError> {
        let state = self.state()?;
        Ok(state
            .nodes
            .iter()
            .find(|node| node.label == label && node.name == name)
            .cloned())
    }

    fn neighbor_names(
        &self,
        source: &str,
        relationship_type: RelationshipType,
    ) -> Result<Vec<String>, StoreError> {
        let state = self.state()?;
        let sources = state.indices(NodeLabel::HeritageSite, source);
        let names: BTreeSet<String> = state
            .relationships
            .iter()
            .filter(|rel| rel.relationship_type == relationship_type && sources.contains(&rel.source))
            .map(|rel| state.nodes[rel.target].name.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn count_nodes(&self, label: NodeLabel) -> Result<usize, StoreError> {
        let state = self.state()?;
        Ok(state.nodes.iter().filter(|node| node.label == label).count())
    }

    fn count_relationships(
        &self,
        relationship_type: RelationshipType,
    ) -> Result<usize, StoreError> {
        let state = self.state()?;
        Ok(state
            .relationships
            .iter()
            .filter(|rel| rel.relationship_type == relationship_type)
            .count())
    }
}
