use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

pub const DEFAULT_SCREENSHOT_URL: &str = "/default-screenshot.png";
pub const DEFAULT_TOOL_TYPE: &str = "personal";

/// Sectors listed under "All AI Tools".
pub const AI_SECTORS: [&str; 6] = [
    "Agent Builders",
    "LLM Frameworks & Orchestration",
    "Model Hubs & Customization",
    "AI Coding & App Platforms",
    "Embeddings & Vector Search",
    "Enterprise Search & QA",
];

/// Sectors listed under "All Sports Tools".
pub const SPORTS_SECTORS: [&str; 5] = [
    "Fan Intelligence",
    "Advertising & Media",
    "Creative & Personalization",
    "Sponsorship & Revenue",
    "Measurement & Analytics",
];

/// A named bundle of sectors, selected with `?group=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SectorGroup {
    Ai,
    Sports,
}

impl SectorGroup {
    pub fn sectors(&self) -> &'static [&'static str] {
        match self {
            SectorGroup::Ai => &AI_SECTORS,
            SectorGroup::Sports => &SPORTS_SECTORS,
        }
    }

    pub fn contains(&self, sector: &str) -> bool {
        self.sectors().contains(&sector)
    }
}

/// One directory entry. Every field is display text; the catalog tolerates
/// missing values and fills them with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub source_url: String,
    pub short_description: String,
    pub screenshot_url: String,
    pub category: String,
    /// `personal` or `enterprise`
    #[serde(rename = "type")]
    pub tool_type: String,
    pub sector: String,
}

/// Tools read from JSON accept strings, numbers, booleans or null in any
/// field. Absent fields are empty.
impl<'de> Deserialize<'de> for Tool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let mut text = |key: &str| match fields.remove(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        Ok(Tool {
            id: text("id"),
            name: text("name"),
            source_url: text("source_url"),
            short_description: text("short_description"),
            screenshot_url: text("screenshot_url"),
            category: text("category"),
            tool_type: text("type"),
            sector: text("sector"),
        })
    }
}

impl Tool {
    /// Build a tool from a sheet-export row laid out as columns A-H:
    /// id, name, source_url, short_description, screenshot_url, category, type, sector.
    pub fn from_sheet_row(row: &[String]) -> Self {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();

        Tool {
            id: cell(0),
            name: cell(1),
            source_url: cell(2),
            short_description: cell(3),
            screenshot_url: cell(4),
            category: cell(5),
            tool_type: cell(6),
            sector: cell(7),
        }
        .normalized()
    }

    /// Apply the display defaults: a screenshot placeholder, the `/static/`
    /// to `/` path rewrite, and `personal` for an unset type.
    pub fn normalized(mut self) -> Self {
        if self.screenshot_url.is_empty() {
            self.screenshot_url = DEFAULT_SCREENSHOT_URL.to_string();
        }
        if let Some(rest) = self.screenshot_url.strip_prefix("/static/") {
            self.screenshot_url = format!("/{rest}");
        }
        if self.tool_type.is_empty() {
            self.tool_type = DEFAULT_TOOL_TYPE.to_string();
        }
        self
    }

    /// Placeholder enterprise entry shown when a sector has no real tools yet.
    pub fn sample_for_sector(index: usize, sector: &str) -> Self {
        Tool {
            id: format!("sample-{index}"),
            name: format!("Sample {sector} Tool"),
            source_url: "https://example.com".to_string(),
            short_description: format!("This is a sample {sector} tool for enterprise."),
            screenshot_url: DEFAULT_SCREENSHOT_URL.to_string(),
            category: String::new(),
            tool_type: "enterprise".to_string(),
            sector: sector.to_string(),
        }
    }

    pub fn is_type(&self, tool_type: &str) -> bool {
        self.tool_type.to_lowercase() == tool_type.to_lowercase()
    }
}

/// Number of tools filed under one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CategoryCount {
    pub sector: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn sheet_row_maps_columns_in_order() {
        let tool = Tool::from_sheet_row(&row(&[
            "7",
            "Notion AI",
            "https://notion.so",
            "Notes with AI",
            "/static/screenshots/notion.png",
            "Writing & Editing",
            "personal",
            "",
        ]));

        assert_eq!(tool.id, "7");
        assert_eq!(tool.name, "Notion AI");
        assert_eq!(tool.screenshot_url, "/screenshots/notion.png");
        assert_eq!(tool.category, "Writing & Editing");
        assert_eq!(tool.tool_type, "personal");
    }

    #[test]
    fn short_sheet_row_gets_defaults() {
        let tool = Tool::from_sheet_row(&row(&["1", "Bare"]));
        assert_eq!(tool.screenshot_url, DEFAULT_SCREENSHOT_URL);
        assert_eq!(tool.tool_type, DEFAULT_TOOL_TYPE);
        assert_eq!(tool.sector, "");
    }

    #[test]
    fn json_tool_tolerates_numbers_and_nulls() {
        let tool: Tool = serde_json::from_str(
            r#"{"id": 12, "name": "Glean", "type": "enterprise", "sector": null}"#,
        )
        .unwrap();
        let tool = tool.normalized();

        assert_eq!(tool.id, "12");
        assert_eq!(tool.sector, "");
        assert_eq!(tool.screenshot_url, DEFAULT_SCREENSHOT_URL);
        assert!(tool.is_type("ENTERPRISE"));
    }

    #[test]
    fn json_tool_rejects_non_objects() {
        assert!(serde_json::from_str::<Tool>("[1, 2]").is_err());
        let tools: Vec<Tool> =
            serde_json::from_str(r#"[{"name": "Glean", "source_url": true}]"#).unwrap();
        assert_eq!(tools[0].source_url, "true");
        assert_eq!(tools[0].tool_type, "");
    }

    #[test]
    fn typescript_declaration_uses_the_wire_names() {
        let decl = Tool::decl();
        assert!(decl.contains("type: string"), "{decl}");
        assert!(decl.contains("short_description: string"), "{decl}");
        assert!(!decl.contains("tool_type"), "{decl}");
    }

    #[test]
    fn tool_serializes_type_field() {
        let value = serde_json::to_value(Tool::sample_for_sector(0, "Agent Builders")).unwrap();
        assert_eq!(value["type"], "enterprise");
        assert_eq!(value["name"], "Sample Agent Builders Tool");
    }

    #[test]
    fn sector_groups_parse_from_query_values() {
        let group: SectorGroup = "ai".parse().unwrap();
        assert!(group.contains("Enterprise Search & QA"));
        assert!(!group.contains("Fan Intelligence"));
        assert!("sports".parse::<SectorGroup>().unwrap().contains("Fan Intelligence"));
        assert!("".parse::<SectorGroup>().is_err());
    }
}
