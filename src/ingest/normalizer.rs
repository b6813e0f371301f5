use std::collections::HashSet;

use super::record::{fields, RawRecord};
use crate::graph::entity::HeritageSite;
use crate::graph::relationship::RelationshipType;

/// A secondary entity a site should be linked to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeCandidate {
    pub relationship_type: RelationshipType,
    pub target: String,
}

impl EdgeCandidate {
    pub fn new(relationship_type: RelationshipType, target: impl Into<String>) -> Self {
        Self {
            relationship_type,
            target: target.into(),
        }
    }
}

/// A record reduced to its site descriptor and the edges it implies
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub site: HeritageSite,
    pub edges: Vec<EdgeCandidate>,
}

impl NormalizedRecord {
    /// Targets of one relationship type, in record order
    pub fn targets(&self, relationship_type: RelationshipType) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.relationship_type == relationship_type)
            .map(|edge| edge.target.as_str())
            .collect()
    }
}

/// Turn one raw record into a site descriptor plus edge candidates.
///
/// Never fails: absent or mistyped fields become empty values. A record
/// without a `Name` yields a site with an empty name.
pub fn normalize_record(record: &RawRecord) -> NormalizedRecord {
    let site = HeritageSite {
        name: record.text(fields::NAME),
        danger: record.list(fields::DANGER),
        construction_time: record.text(fields::CONSTRUCTION_TIME),
        integrity: record.text(fields::INTEGRITY),
        authenticity: record.text(fields::AUTHENTICITY),
        protection_and_management: record.text(fields::PROTECTION),
        myths_and_books: record.list(fields::MYTHS_AND_BOOKS),
        accessible: record.text(fields::ACCESSIBLE),
        culture: record.list(fields::CULTURE),
        links: record.list(fields::LINKS),
    };

    let criteria = record
        .list(fields::CRITERIA)
        .iter()
        .flat_map(|raw| parse_criteria(raw))
        .collect::<Vec<_>>();

    let candidates = [
        (RelationshipType::HasCategory, record.list(fields::CATEGORY)),
        (RelationshipType::HasCriteria, criteria),
        (RelationshipType::HasDynasty, record.list(fields::DYNASTY)),
        (RelationshipType::HasCulture, site.culture.clone()),
        (RelationshipType::HasLink, site.links.clone()),
    ];

    let mut seen = HashSet::new();
    let edges = candidates
        .into_iter()
        .flat_map(|(relationship_type, targets)| {
            targets
                .into_iter()
                .map(move |target| EdgeCandidate::new(relationship_type, target))
        })
        .filter(|edge| seen.insert(edge.clone()))
        .collect();

    NormalizedRecord { site, edges }
}

/// Split a compound criteria string such as `"(iii)(vi)"` into its tokens
pub fn parse_criteria(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_matches(|c: char| c == '(' || c == ')')
        .split(")(")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
