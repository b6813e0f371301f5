use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::NodeLabel;

/// The five directed edge kinds linking a site to a secondary entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipType {
    HasCategory,
    HasCriteria,
    HasDynasty,
    HasCulture,
    HasLink,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 5] = [
        RelationshipType::HasCategory,
        RelationshipType::HasCriteria,
        RelationshipType::HasDynasty,
        RelationshipType::HasCulture,
        RelationshipType::HasLink,
    ];

    /// Name of the edge type as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::HasCategory => "HAS_CATEGORY",
            RelationshipType::HasCriteria => "HAS_CRITERIA",
            RelationshipType::HasDynasty => "HAS_DYNASTY",
            RelationshipType::HasCulture => "HAS_CULTURE",
            RelationshipType::HasLink => "HAS_LINK",
        }
    }

    /// Label of the node at the end of the edge
    pub fn target_label(&self) -> NodeLabel {
        match self {
            RelationshipType::HasCategory => NodeLabel::Category,
            RelationshipType::HasCriteria => NodeLabel::Criteria,
            RelationshipType::HasDynasty => NodeLabel::Dynasty,
            RelationshipType::HasCulture => NodeLabel::Culture,
            RelationshipType::HasLink => NodeLabel::Link,
        }
    }

    /// Fixed descriptive `name` attribute carried by every edge of this type
    pub fn description(&self) -> &'static str {
        match self {
            RelationshipType::HasCategory => "Heritage Category",
            RelationshipType::HasCriteria => "Heritage Criteria",
            RelationshipType::HasDynasty => "Heritage Dynasty",
            RelationshipType::HasCulture => "Heritage Culture",
            RelationshipType::HasLink => "Heritage Link",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (site, target) name pair collected during ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgePair {
    pub source: String,
    pub target: String,
}

impl EdgePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Everything a store needs to write one typed edge.
///
/// The source is always a `HeritageSite`; the target label follows from the
/// relationship type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipSpec {
    pub relationship_type: RelationshipType,
    pub source: String,
    pub target: String,
}

impl RelationshipSpec {
    pub fn new(relationship_type: RelationshipType, pair: &EdgePair) -> Self {
        Self {
            relationship_type,
            source: pair.source.clone(),
            target: pair.target.clone(),
        }
    }

    pub fn source_label(&self) -> NodeLabel {
        NodeLabel::HeritageSite
    }

    pub fn target_label(&self) -> NodeLabel {
        self.relationship_type.target_label()
    }

    pub fn name(&self) -> &'static str {
        self.relationship_type.description()
    }
}

impl fmt::Display for RelationshipSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -[{}]-> {}",
            self.source, self.relationship_type, self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_targets_cover_every_secondary_label() {
        let targets: Vec<NodeLabel> = RelationshipType::ALL
            .iter()
            .map(|rt| rt.target_label())
            .collect();

        assert_eq!(
            targets,
            vec![
                NodeLabel::Category,
                NodeLabel::Criteria,
                NodeLabel::Dynasty,
                NodeLabel::Culture,
                NodeLabel::Link,
            ]
        );
    }

    #[test]
    fn test_spec_display() {
        let spec = RelationshipSpec::new(
            RelationshipType::HasCriteria,
            &EdgePair::new("Mount Taishan", "vi"),
        );
        assert_eq!(spec.to_string(), "Mount Taishan -[HAS_CRITERIA]-> vi");
        assert_eq!(spec.name(), "Heritage Criteria");
        assert_eq!(spec.source_label(), NodeLabel::HeritageSite);
    }
}
