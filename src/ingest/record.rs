use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names used by the heritage corpus
pub mod fields {
    pub const NAME: &str = "Name";
    pub const CATEGORY: &str = "Category of property";
    pub const CRITERIA: &str = "Criteria";
    pub const DYNASTY: &str = "Dynasty";
    pub const CULTURE: &str = "Culture";
    pub const LINKS: &str = "Links";
    pub const DANGER: &str = "Danger";
    pub const CONSTRUCTION_TIME: &str = "Construction time";
    pub const INTEGRITY: &str = "Integrity";
    pub const AUTHENTICITY: &str = "Authenticity";
    pub const PROTECTION: &str = "Protection and management requirements";
    pub const MYTHS_AND_BOOKS: &str = "Myths and books";
    pub const ACCESSIBLE: &str = "Accessible";
}

/// One heritage record exactly as it appears in the corpus.
///
/// Fields may be absent, scalar or list-valued. The accessors below are the
/// only place that inspects raw JSON types: everything downstream sees either
/// a string or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Wrap a corpus entry, rejecting anything that is not a JSON object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// A text field; numbers and booleans are rendered, lists are joined,
    /// anything else reads as empty
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
            Some(value) => scalar_text(value).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// A string-or-list field as a list. A non-empty string becomes a
    /// singleton; blank and non-scalar elements are dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        let values: Vec<String> = match self.0.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            Some(value) => scalar_text(value).into_iter().collect(),
            None => Vec::new(),
        };

        values
            .into_iter()
            .filter(|value| !value.trim().is_empty())
            .collect()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_text_accessor_degrades_gracefully() {
        let rec = record(json!({
            "Integrity": "intact",
            "Construction time": 1420,
            "Accessible": true,
            "Authenticity": null,
            "Danger": {"level": 3},
            "Myths and books": ["Journey to the West", 7, null]
        }));

        assert_eq!(rec.text("Integrity"), "intact");
        assert_eq!(rec.text("Construction time"), "1420");
        assert_eq!(rec.text("Accessible"), "true");
        assert_eq!(rec.text("Authenticity"), "");
        assert_eq!(rec.text("Danger"), "");
        assert_eq!(rec.text("Myths and books"), "Journey to the West, 7");
        assert_eq!(rec.text("Missing"), "");
    }

    #[test]
    fn test_list_accessor_normalizes_string_or_list() {
        let rec = record(json!({
            "Dynasty": "Ming",
            "Culture": ["Buddhism", "", "  ", {"x": 1}, "Taoism"],
            "Category of property": "",
            "Links": null
        }));

        assert_eq!(rec.list("Dynasty"), vec!["Ming"]);
        assert_eq!(rec.list("Culture"), vec!["Buddhism", "Taoism"]);
        assert!(rec.list("Category of property").is_empty());
        assert!(rec.list("Links").is_empty());
        assert!(rec.list("Missing").is_empty());
    }

    #[test]
    fn test_non_object_entries_are_rejected() {
        assert!(RawRecord::from_value(json!("Great Wall")).is_none());
        assert!(RawRecord::from_value(json!([1, 2])).is_none());
        assert!(RawRecord::from_value(json!({})).is_some());
    }
}
