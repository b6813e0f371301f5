use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Label attached to every node in the heritage graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeLabel {
    HeritageSite,
    Category,
    Criteria,
    Dynasty,
    Culture,
    Link,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 6] = [
        NodeLabel::HeritageSite,
        NodeLabel::Category,
        NodeLabel::Criteria,
        NodeLabel::Dynasty,
        NodeLabel::Culture,
        NodeLabel::Link,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::HeritageSite => "HeritageSite",
            NodeLabel::Category => "Category",
            NodeLabel::Criteria => "Criteria",
            NodeLabel::Dynasty => "Dynasty",
            NodeLabel::Culture => "Culture",
            NodeLabel::Link => "Link",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labelled node as held by a graph store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub label: NodeLabel,
    pub name: String,
    pub properties: Map<String, Value>,
}

impl Node {
    /// A bare node carrying nothing but its name
    pub fn named(label: NodeLabel, name: impl Into<String>) -> Self {
        Self {
            label,
            name: name.into(),
            properties: Map::new(),
        }
    }
}

/// A heritage site with its descriptive attributes.
///
/// Every field defaults to empty so partially described sites stay loadable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeritageSite {
    pub name: String,
    pub danger: Vec<String>,
    pub construction_time: String,
    pub integrity: String,
    pub authenticity: String,
    pub protection_and_management: String,
    pub myths_and_books: Vec<String>,
    pub accessible: String,
    pub culture: Vec<String>,
    pub links: Vec<String>,
}

impl HeritageSite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Convert into a `HeritageSite` node; the name becomes the node identity
    pub fn to_node(&self) -> Node {
        let mut properties = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        properties.remove("name");

        Node {
            label: NodeLabel::HeritageSite,
            name: self.name.clone(),
            properties,
        }
    }

    /// Rebuild a site from a stored node, falling back to a bare site when the
    /// stored properties do not have the expected shape
    pub fn from_node(node: &Node) -> Self {
        let mut properties = node.properties.clone();
        properties.insert("name".to_string(), Value::String(node.name.clone()));

        match serde_json::from_value(Value::Object(properties)) {
            Ok(site) => site,
            Err(e) => {
                tracing::warn!(
                    "Stored properties of site '{}' are malformed: {}",
                    node.name,
                    e
                );
                HeritageSite::new(node.name.clone())
            }
        }
    }
}
