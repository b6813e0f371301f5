use anyhow::Result;

use super::engine::{LookupOutcome, SiteProfile};
use crate::graph::relationship::RelationshipType;

pub const NOT_FOUND_MESSAGE: &str = "No heritage information found.";

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            _ => Ok(OutputFormat::Text), // Default to text format
        }
    }
}

/// Renders a lookup outcome as the final answer
pub struct ResultFormatter {
    format: OutputFormat,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, outcome: &LookupOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(format_text(outcome)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        }
    }
}

fn format_text(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found(profile) => format_profile(profile),
        LookupOutcome::NotFound => NOT_FOUND_MESSAGE.to_string(),
        LookupOutcome::Failed(message) => {
            format!("Error querying the knowledge graph: {}", message)
        }
    }
}

fn format_profile(profile: &SiteProfile) -> String {
    let site = &profile.site;
    let culture = site.culture.join(", ");
    let links = site.links.join(", ");

    let basics = [
        ("Name", site.name.as_str()),
        ("Construction time", site.construction_time.as_str()),
        ("Integrity", site.integrity.as_str()),
        ("Authenticity", site.authenticity.as_str()),
        ("Culture", culture.as_str()),
        ("Protection and management", site.protection_and_management.as_str()),
        ("Links", links.as_str()),
    ];

    let mut sections = Vec::new();

    let basic_lines: Vec<String> = basics
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect();
    if !basic_lines.is_empty() {
        sections.push(format!("[Basic Information]\n{}", basic_lines.join("\n")));
    }

    let lists = [
        ("Category", RelationshipType::HasCategory),
        ("Criteria", RelationshipType::HasCriteria),
        ("Culture", RelationshipType::HasCulture),
        ("Dynasty", RelationshipType::HasDynasty),
    ];
    for (title, relationship_type) in lists {
        let values = profile.neighbors(relationship_type);
        if !values.is_empty() {
            sections.push(format!("[{}]\n{}", title, values.join(", ")));
        }
    }

    if sections.is_empty() {
        return NOT_FOUND_MESSAGE.to_string();
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::entity::HeritageSite;
    use crate::query::engine::MatchStage;

    fn palace_profile() -> SiteProfile {
        let mut site = HeritageSite::new("Summer Palace, an Imperial Garden in Beijing");
        site.construction_time = "1750".to_string();
        site.culture = vec!["Royal garden culture".to_string()];

        SiteProfile {
            site,
            matched_by: MatchStage::Exact,
            categories: vec!["Cultural".to_string()],
            criteria: vec!["i".to_string(), "ii".to_string(), "iii".to_string()],
            cultures: vec!["Royal garden culture".to_string()],
            dynasties: Vec::new(),
            links: Vec::new(),
        }
    }

    #[test]
    fn test_text_sections_in_order_without_empties() {
        let formatter = ResultFormatter::new(OutputFormat::Text);
        let text = formatter
            .format(&LookupOutcome::Found(Box::new(palace_profile())))
            .unwrap();

        assert_eq!(
            text,
            "[Basic Information]\n\
             Name: Summer Palace, an Imperial Garden in Beijing\n\
             Construction time: 1750\n\
             Culture: Royal garden culture\n\
             \n\
             [Category]\n\
             Cultural\n\
             \n\
             [Criteria]\n\
             i, ii, iii\n\
             \n\
             [Culture]\n\
             Royal garden culture"
        );
        assert!(!text.contains("[Dynasty]"));
        assert!(!text.contains("Integrity"));
    }

    #[test]
    fn test_sentinels() {
        let formatter = ResultFormatter::new(OutputFormat::Text);

        assert_eq!(
            formatter.format(&LookupOutcome::NotFound).unwrap(),
            NOT_FOUND_MESSAGE
        );
        assert_eq!(
            formatter
                .format(&LookupOutcome::Failed("database is locked".to_string()))
                .unwrap(),
            "Error querying the knowledge graph: database is locked"
        );
    }

    #[test]
    fn test_json_output() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        let json = formatter
            .format(&LookupOutcome::Found(Box::new(palace_profile())))
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "found");
        assert_eq!(value["result"]["matched_by"], "exact");
        assert_eq!(value["result"]["categories"][0], "Cultural");

        let json = formatter.format(&LookupOutcome::NotFound).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "not_found");
    }

    #[test]
    fn test_format_parsing_defaults_to_text() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("tree".parse::<OutputFormat>(), Ok(OutputFormat::Text));
    }
}
