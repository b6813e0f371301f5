use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::accumulator::GraphAccumulator;
use crate::graph::entity::{Node, NodeLabel};
use crate::graph::relationship::{EdgePair, RelationshipSpec, RelationshipType};
use crate::graph::store::{GraphStore, StoreError, WriteOutcome};

/// How the loader treats data already present in the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum WriteMode {
    /// Always create nodes and edges; reloading duplicates them
    #[default]
    Create,
    /// Match nodes by label and name, skip edges that already exist
    Merge,
}

/// Outcome counts for one batch of writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    pub attempted: usize,
    pub created: usize,
    pub matched: usize,
    pub failed: usize,
}

impl WriteStats {
    fn record(&mut self, result: &Result<WriteOutcome, StoreError>) {
        self.attempted += 1;
        match result {
            Ok(WriteOutcome::Created) => self.created += 1,
            Ok(WriteOutcome::Matched) => self.matched += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for WriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} created", self.created)?;
        if self.matched > 0 {
            write!(f, ", {} already present", self.matched)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

/// Per-label and per-type results of a load run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub nodes: BTreeMap<NodeLabel, WriteStats>,
    pub relationships: BTreeMap<RelationshipType, WriteStats>,
}

impl LoadReport {
    pub fn failures(&self) -> usize {
        self.nodes
            .values()
            .chain(self.relationships.values())
            .map(|stats| stats.failed)
            .sum()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, stats) in &self.nodes {
            writeln!(f, "  - {} nodes: {}", label, stats)?;
        }
        for (relationship_type, stats) in &self.relationships {
            writeln!(f, "  - {} edges: {}", relationship_type, stats)?;
        }
        Ok(())
    }
}

/// Collapse duplicate (site, target) pairs, keeping first-seen order
pub fn dedup_edges(edges: &[EdgePair]) -> Vec<&EdgePair> {
    let mut seen = HashSet::new();
    edges
        .iter()
        .filter(|edge| seen.insert((edge.source.as_str(), edge.target.as_str())))
        .collect()
}

/// Writes accumulated nodes and edges into a graph store.
///
/// Every write is independent: a failure is logged and counted, and the batch
/// carries on. Nodes must be loaded before any relationship that refers to
/// them.
pub struct GraphLoader<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    mode: WriteMode,
}

impl<'a, S: GraphStore + ?Sized> GraphLoader<'a, S> {
    pub fn new(store: &'a S, mode: WriteMode) -> Self {
        Self { store, mode }
    }

    /// Node pass followed by the relationship pass
    pub fn load(&self, accumulator: &GraphAccumulator) -> LoadReport {
        LoadReport {
            nodes: self.create_nodes(accumulator),
            relationships: self.create_all_relationships(accumulator),
        }
    }

    /// Create one node per site descriptor and one per unique secondary entity
    pub fn create_nodes(&self, accumulator: &GraphAccumulator) -> BTreeMap<NodeLabel, WriteStats> {
        let mut report = BTreeMap::new();

        let site_nodes: Vec<Node> = accumulator.sites().iter().map(|site| site.to_node()).collect();
        report.insert(NodeLabel::HeritageSite, self.write_nodes(&site_nodes));

        for relationship_type in RelationshipType::ALL {
            let label = relationship_type.target_label();
            let nodes: Vec<Node> = accumulator
                .entities(relationship_type)
                .iter()
                .map(|name| Node::named(label, name.as_str()))
                .collect();
            report.insert(label, self.write_nodes(&nodes));
        }

        report
    }

    fn write_nodes(&self, nodes: &[Node]) -> WriteStats {
        let mut stats = WriteStats::default();
        let total = nodes.len();

        for (count, node) in nodes.iter().enumerate() {
            let result = match self.mode {
                WriteMode::Create => self.store.create_node(node).map(|_| WriteOutcome::Created),
                WriteMode::Merge => self.store.merge_node(node),
            };

            match &result {
                Ok(outcome) => tracing::debug!(
                    "{:?} {} node ({}/{}): {}",
                    outcome,
                    node.label,
                    count + 1,
                    total,
                    node.name
                ),
                Err(e) => tracing::warn!(
                    "Failed to create {} node ({}/{}): {}, Error: {}",
                    node.label,
                    count + 1,
                    total,
                    node.name,
                    e
                ),
            }
            stats.record(&result);
        }

        stats
    }

    pub fn create_all_relationships(
        &self,
        accumulator: &GraphAccumulator,
    ) -> BTreeMap<RelationshipType, WriteStats> {
        RelationshipType::ALL
            .into_iter()
            .map(|relationship_type| {
                let stats =
                    self.create_relationships(accumulator.edges(relationship_type), relationship_type);
                (relationship_type, stats)
            })
            .collect()
    }

    /// Deduplicate `edges` and write one typed edge per unique pair.
    ///
    /// Each edge carries the relationship type's fixed descriptive label.
    pub fn create_relationships(
        &self,
        edges: &[EdgePair],
        relationship_type: RelationshipType,
    ) -> WriteStats {
        let unique = dedup_edges(edges);
        let total = unique.len();
        let mut stats = WriteStats::default();

        for (count, pair) in unique.into_iter().enumerate() {
            let spec = RelationshipSpec::new(relationship_type, pair);
            let result = match self.mode {
                WriteMode::Create => self
                    .store
                    .create_relationship(&spec)
                    .map(|_| WriteOutcome::Created),
                WriteMode::Merge => self.store.merge_relationship(&spec),
            };

            match &result {
                Ok(outcome) => tracing::debug!(
                    "{:?} relationship {} ({}/{}): {} -> {}",
                    outcome,
                    relationship_type,
                    count + 1,
                    total,
                    pair.source,
                    pair.target
                ),
                Err(e) => tracing::warn!(
                    "Failed to create relationship {} ({}/{}): {} -> {}, Error: {}",
                    relationship_type,
                    count + 1,
                    total,
                    pair.source,
                    pair.target,
                    e
                ),
            }
            stats.record(&result);
        }

        tracing::info!("{} relationships: {}", relationship_type, stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::memory::MemoryGraph;
    use crate::ingest::record::RawRecord;
    use serde_json::json;

    fn accumulate(values: Vec<serde_json::Value>) -> GraphAccumulator {
        let records: Vec<RawRecord> = values
            .into_iter()
            .map(|value| RawRecord::from_value(value).unwrap())
            .collect();
        GraphAccumulator::from_records(&records)
    }

    fn sample() -> GraphAccumulator {
        accumulate(vec![
            json!({
                "Name": "Summer Palace",
                "Category of property": "Cultural",
                "Criteria": "(i)(ii)(iii)",
                "Dynasty": "Qing",
                "Links": ["https://whc.unesco.org/en/list/880"]
            }),
            json!({
                "Name": "Temple of Heaven",
                "Category of property": "Cultural",
                "Criteria": "(i)(ii)(iii)",
                "Dynasty": ["Ming", "Qing"]
            }),
        ])
    }

    #[test]
    fn test_dedup_collapses_repeated_pairs() {
        let edges = vec![
            EdgePair::new("A", "B"),
            EdgePair::new("A", "C"),
            EdgePair::new("A", "B"),
        ];
        let unique = dedup_edges(&edges);
        assert_eq!(unique, vec![&edges[0], &edges[1]]);
    }

    #[test]
    fn test_duplicate_pairs_produce_one_edge() {
        let graph = MemoryGraph::new();
        graph
            .create_node(&Node::named(NodeLabel::HeritageSite, "A"))
            .unwrap();
        graph
            .create_node(&Node::named(NodeLabel::Category, "B"))
            .unwrap();

        let loader = GraphLoader::new(&graph, WriteMode::Create);
        let stats = loader.create_relationships(
            &[EdgePair::new("A", "B"), EdgePair::new("A", "B")],
            RelationshipType::HasCategory,
        );

        assert_eq!(stats.attempted, 1);
        assert_eq!(stats.created, 1);
        assert_eq!(
            graph
                .count_relationships(RelationshipType::HasCategory)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_load_creates_nodes_then_edges() {
        let graph = MemoryGraph::new();
        let report = GraphLoader::new(&graph, WriteMode::Create).load(&sample());

        assert_eq!(report.failures(), 0);
        assert_eq!(report.nodes[&NodeLabel::HeritageSite].created, 2);
        assert_eq!(report.nodes[&NodeLabel::Category].created, 1);
        assert_eq!(report.nodes[&NodeLabel::Criteria].created, 3);
        assert_eq!(report.nodes[&NodeLabel::Dynasty].created, 2);
        assert_eq!(report.nodes[&NodeLabel::Culture].attempted, 0);
        assert_eq!(report.relationships[&RelationshipType::HasCriteria].created, 6);
        assert_eq!(report.relationships[&RelationshipType::HasDynasty].created, 3);

        assert_eq!(
            graph
                .neighbor_names("Temple of Heaven", RelationshipType::HasDynasty)
                .unwrap(),
            vec!["Ming".to_string(), "Qing".to_string()]
        );
    }

    #[test]
    fn test_failed_edge_does_not_stop_the_batch() {
        let graph = MemoryGraph::new();
        graph
            .create_node(&Node::named(NodeLabel::HeritageSite, "Yin Xu"))
            .unwrap();
        graph
            .create_node(&Node::named(NodeLabel::Dynasty, "Shang"))
            .unwrap();

        let loader = GraphLoader::new(&graph, WriteMode::Create);
        let stats = loader.create_relationships(
            &[
                EdgePair::new("Yin Xu", "Zhou"),
                EdgePair::new("Nowhere", "Shang"),
                EdgePair::new("Yin Xu", "Shang"),
            ],
            RelationshipType::HasDynasty,
        );

        assert_eq!(stats.attempted, 3);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.created, 1);
        assert_eq!(
            graph
                .neighbor_names("Yin Xu", RelationshipType::HasDynasty)
                .unwrap(),
            vec!["Shang".to_string()]
        );
    }

    #[test]
    fn test_create_mode_reload_duplicates_sites() {
        let graph = MemoryGraph::new();
        let acc = sample();
        let loader = GraphLoader::new(&graph, WriteMode::Create);

        loader.load(&acc);
        loader.load(&acc);

        assert_eq!(graph.count_nodes(NodeLabel::HeritageSite).unwrap(), 4);
        assert_eq!(graph.count_nodes(NodeLabel::Category).unwrap(), 2);
    }

    #[test]
    fn test_merge_mode_reload_is_idempotent() {
        let graph = MemoryGraph::new();
        let acc = sample();
        let loader = GraphLoader::new(&graph, WriteMode::Merge);

        let first = loader.load(&acc);
        let second = loader.load(&acc);

        for label in NodeLabel::ALL {
            assert_eq!(
                graph.count_nodes(label).unwrap(),
                first.nodes[&label].created
            );
            assert_eq!(second.nodes[&label].created, 0);
        }
        for relationship_type in RelationshipType::ALL {
            assert_eq!(
                graph.count_relationships(relationship_type).unwrap(),
                first.relationships[&relationship_type].created
            );
            assert_eq!(
                second.relationships[&relationship_type].matched,
                first.relationships[&relationship_type].created
            );
        }
    }

    #[test]
    fn test_report_display() {
        let mut report = LoadReport::default();
        report.nodes.insert(
            NodeLabel::Category,
            WriteStats {
                attempted: 3,
                created: 2,
                matched: 0,
                failed: 1,
            },
        );

        assert_eq!(report.to_string(), "  - Category nodes: 2 created, 1 failed\n");
        assert_eq!(report.failures(), 1);
    }
}
