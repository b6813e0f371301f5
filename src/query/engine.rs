use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::graph::entity::{HeritageSite, Node, NodeLabel};
use crate::graph::relationship::RelationshipType;
use crate::graph::{GraphStore, StoreError};

/// Which lookup stage located the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStage {
    /// Case-insensitive substring match on the site name
    Exact,
    /// Space-tolerant regular expression match
    Fuzzy,
}

/// A site with the distinct names of its neighbors, grouped by edge kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteProfile {
    pub site: HeritageSite,
    pub matched_by: MatchStage,
    pub categories: Vec<String>,
    pub criteria: Vec<String>,
    pub cultures: Vec<String>,
    pub dynasties: Vec<String>,
    pub links: Vec<String>,
}

impl SiteProfile {
    pub fn neighbors(&self, relationship_type: RelationshipType) -> &[String] {
        match relationship_type {
            RelationshipType::HasCategory => &self.categories,
            RelationshipType::HasCriteria => &self.criteria,
            RelationshipType::HasDynasty => &self.dynasties,
            RelationshipType::HasCulture => &self.cultures,
            RelationshipType::HasLink => &self.links,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(Box<SiteProfile>),
    NotFound,
    Failed(String),
}

/// Two-stage site lookup with neighborhood aggregation
pub struct GraphQueryEngine<'a, S: GraphStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: GraphStore + ?Sized> GraphQueryEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Look a site up by its canonical name.
    ///
    /// Store errors never escape; they come back as `Failed`.
    pub fn lookup(&self, name: &str) -> LookupOutcome {
        let name = name.trim();
        if name.is_empty() {
            tracing::info!("No heritage name to look up");
            return LookupOutcome::NotFound;
        }

        match self.try_lookup(name) {
            Ok(Some(profile)) => LookupOutcome::Found(Box::new(profile)),
            Ok(None) => {
                tracing::info!("No heritage site matches '{}'", name);
                LookupOutcome::NotFound
            }
            Err(e) => {
                tracing::error!("Knowledge graph lookup for '{}' failed: {}", name, e);
                LookupOutcome::Failed(e.to_string())
            }
        }
    }

    fn try_lookup(&self, name: &str) -> Result<Option<SiteProfile>, StoreError> {
        if let Some(node) = self.find_exact(name)? {
            return self.build_profile(&node, MatchStage::Exact).map(Some);
        }

        match self.find_fuzzy(name)? {
            Some(node) => self.build_profile(&node, MatchStage::Fuzzy).map(Some),
            None => Ok(None),
        }
    }

    fn find_exact(&self, name: &str) -> Result<Option<Node>, StoreError> {
        let candidates = self
            .store
            .find_nodes_containing(NodeLabel::HeritageSite, name)?;

        if candidates.len() > 1 {
            tracing::warn!(
                "{} heritage sites contain '{}'; using '{}'",
                candidates.len(),
                name,
                candidates[0].name
            );
        }

        Ok(candidates.into_iter().next())
    }

    fn find_fuzzy(&self, name: &str) -> Result<Option<Node>, StoreError> {
        let pattern = fuzzy_pattern(name)
            .map_err(|e| StoreError::Corrupt(format!("invalid fuzzy pattern: {}", e)))?;

        let candidates: Vec<String> = self
            .store
            .node_names(NodeLabel::HeritageSite)?
            .into_iter()
            .filter(|candidate| pattern.is_match(candidate))
            .collect();

        let Some(first) = candidates.first() else {
            return Ok(None);
        };

        if candidates.len() > 1 {
            tracing::warn!(
                "{} heritage sites match /{}/; using '{}'",
                candidates.len(),
                pattern.as_str(),
                first
            );
        } else {
            tracing::debug!("Fuzzy match /{}/ -> '{}'", pattern.as_str(), first);
        }

        self.store.get_node(NodeLabel::HeritageSite, first)
    }

    fn build_profile(&self, node: &Node, matched_by: MatchStage) -> Result<SiteProfile, StoreError> {
        let neighbors = |relationship_type: RelationshipType| {
            self.store.neighbor_names(&node.name, relationship_type)
        };

        Ok(SiteProfile {
            site: HeritageSite::from_node(node),
            matched_by,
            categories: neighbors(RelationshipType::HasCategory)?,
            criteria: neighbors(RelationshipType::HasCriteria)?,
            cultures: neighbors(RelationshipType::HasCulture)?,
            dynasties: neighbors(RelationshipType::HasDynasty)?,
            links: neighbors(RelationshipType::HasLink)?,
        })
    }
}

/// Case-insensitive pattern tolerating spacing differences both ways.
///
/// Each space in `name` stands for any run of characters, and optional
/// whitespace may appear between the characters of a word, so "Mount Tai"
/// finds "MountTai" and "MountTai" finds "Mount Tai".
pub fn fuzzy_pattern(name: &str) -> Result<Regex, regex::Error> {
    let pattern = name
        .split_whitespace()
        .map(spaced_word)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

fn spaced_word(word: &str) -> String {
    let mut buf = [0u8; 4];
    word.chars()
        .map(|c| regex::escape(c.encode_utf8(&mut buf)))
        .collect::<Vec<_>>()
        .join(r"\s*")
}
