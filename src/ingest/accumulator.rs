use std::collections::{BTreeMap, BTreeSet};

use super::normalizer::{normalize_record, NormalizedRecord};
use super::record::RawRecord;
use crate::graph::entity::HeritageSite;
use crate::graph::relationship::{EdgePair, RelationshipType};

static NO_NAMES: BTreeSet<String> = BTreeSet::new();

/// Corpus-wide fold of normalized records.
///
/// Secondary entities are kept as sets, so feeding the same record twice never
/// grows them. Edge lists and the site list are append-only: duplicate edges
/// are collapsed by the loader, and duplicate site names are loaded as
/// separate nodes.
#[derive(Debug, Default, Clone)]
pub struct GraphAccumulator {
    site_names: BTreeSet<String>,
    entities: BTreeMap<RelationshipType, BTreeSet<String>>,
    edges: BTreeMap<RelationshipType, Vec<EdgePair>>,
    sites: Vec<HeritageSite>,
}

impl GraphAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and accumulate every record in corpus order
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a RawRecord>) -> Self {
        let mut accumulator = Self::new();
        for record in records {
            accumulator.add(normalize_record(record));
        }
        accumulator
    }

    pub fn add(&mut self, record: NormalizedRecord) {
        let NormalizedRecord { site, edges } = record;

        for edge in edges {
            self.entities
                .entry(edge.relationship_type)
                .or_default()
                .insert(edge.target.clone());
            self.edges
                .entry(edge.relationship_type)
                .or_default()
                .push(EdgePair::new(site.name.clone(), edge.target));
        }

        self.site_names.insert(site.name.clone());
        self.sites.push(site);
    }

    /// Unique site names, for reporting
    pub fn site_names(&self) -> &BTreeSet<String> {
        &self.site_names
    }

    /// Site descriptors in corpus order, duplicates included
    pub fn sites(&self) -> &[HeritageSite] {
        &self.sites
    }

    /// Unique names of the secondary entities reached by `relationship_type`
    pub fn entities(&self, relationship_type: RelationshipType) -> &BTreeSet<String> {
        self.entities.get(&relationship_type).unwrap_or(&NO_NAMES)
    }

    /// Raw (site, target) pairs for `relationship_type`, duplicates included
    pub fn edges(&self, relationship_type: RelationshipType) -> &[EdgePair] {
        self.edges
            .get(&relationship_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
        values
            .into_iter()
            .map(|value| RawRecord::from_value(value).unwrap())
            .collect()
    }

    #[test]
    fn test_shared_values_become_single_entities() {
        let corpus = records(vec![
            json!({"Name": "Mount Huangshan", "Category of property": "Mixed", "Dynasty": "Tang", "Links": ["https://a"]}),
            json!({"Name": "Mount Wuyi", "Category of property": ["Mixed"], "Dynasty": ["Tang", "Song"], "Links": ["https://a"]}),
        ]);

        let acc = GraphAccumulator::from_records(&corpus);

        assert_eq!(acc.entities(RelationshipType::HasCategory).len(), 1);
        assert_eq!(
            acc.entities(RelationshipType::HasDynasty)
                .iter()
                .collect::<Vec<_>>(),
            vec!["Song", "Tang"]
        );
        assert_eq!(acc.entities(RelationshipType::HasLink).len(), 1);
        assert!(acc.entities(RelationshipType::HasCulture).is_empty());

        assert_eq!(acc.edges(RelationshipType::HasCategory).len(), 2);
        assert_eq!(acc.edges(RelationshipType::HasDynasty).len(), 3);
        assert!(acc.edges(RelationshipType::HasCriteria).is_empty());
    }

    #[test]
    fn test_accumulating_twice_keeps_sets_but_appends_lists() {
        let corpus = records(vec![json!({
            "Name": "Mogao Caves",
            "Criteria": "(i)(ii)(iii)(iv)(v)(vi)",
            "Culture": "Buddhism"
        })]);

        let once = GraphAccumulator::from_records(&corpus);
        let twice = GraphAccumulator::from_records(corpus.iter().chain(corpus.iter()));

        for rt in RelationshipType::ALL {
            assert_eq!(once.entities(rt), twice.entities(rt));
            assert_eq!(twice.edges(rt).len(), once.edges(rt).len() * 2);
        }
        assert_eq!(once.site_names(), twice.site_names());
        assert_eq!(once.sites().len(), 1);
        assert_eq!(twice.sites().len(), 2);
    }

    #[test]
    fn test_sites_keep_corpus_order() {
        let corpus = records(vec![
            json!({"Name": "Yin Xu"}),
            json!({"Name": "Dazu Rock Carvings"}),
            json!({}),
        ]);

        let acc = GraphAccumulator::from_records(&corpus);
        let names: Vec<&str> = acc.sites().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Yin Xu", "Dazu Rock Carvings", ""]);
        assert_eq!(acc.site_names().len(), 3);
    }

    #[test]
    fn test_edges_record_site_and_target() {
        let corpus = records(vec![json!({"Name": "Fujian Tulou", "Criteria": "(iii)(iv)"})]);
        let acc = GraphAccumulator::from_records(&corpus);

        assert_eq!(
            acc.edges(RelationshipType::HasCriteria),
            &[
                EdgePair::new("Fujian Tulou", "iii"),
                EdgePair::new("Fujian Tulou", "iv"),
            ]
        );
    }
}
