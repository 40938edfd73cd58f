//! The AI tool directory: loading the exported catalog and filtering it by
//! audience type, sector and sector group.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::Path,
};

use db::models::tool::{AI_SECTORS, CategoryCount, SectorGroup, Tool};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ToolCatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),
}

/// Query parameters accepted by the directory listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolQuery {
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    pub sector: Option<String>,
    pub group: Option<String>,
}

impl ToolQuery {
    fn tool_type(&self) -> &str {
        match self.tool_type.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "personal",
        }
    }

    fn sector(&self) -> &str {
        self.sector.as_deref().unwrap_or_default()
    }

    fn group(&self) -> &str {
        self.group.as_deref().unwrap_or_default()
    }
}

/// In-memory tool catalog, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<Tool>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<Tool>) -> Self {
        Self {
            tools: tools.into_iter().map(Tool::normalized).collect(),
        }
    }

    /// Load a catalog export. `.json` files hold an array of tool objects;
    /// `.csv` files are a sheet export with a header row and columns A-H.
    pub fn load(path: &Path) -> Result<Self, ToolCatalogError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let tools = match extension.as_str() {
            "json" => {
                let reader = BufReader::new(File::open(path)?);
                serde_json::from_reader::<_, Vec<Tool>>(reader)?
            }
            "csv" => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(true)
                    .flexible(true)
                    .from_path(path)?;
                let mut tools = Vec::new();
                for record in reader.records() {
                    let row: Vec<String> = record?.iter().map(|cell| cell.to_string()).collect();
                    tools.push(Tool::from_sheet_row(&row));
                }
                tools
            }
            other => return Err(ToolCatalogError::UnsupportedFormat(other.to_string())),
        };

        let catalog = Self::new(tools);
        info!(path = %path.display(), tools = catalog.len(), "Loaded tool catalog");
        if let Some(first) = catalog.tools.first() {
            debug!(
                name = %first.name,
                screenshot_url = %first.screenshot_url,
                tool_type = %first.tool_type,
                sector = %first.sector,
                "Sample tool"
            );
        }
        Ok(catalog)
    }

    /// Load the catalog, or serve an empty directory if it cannot be read.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Could not load tool catalog, serving an empty directory");
            Self::default()
        })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Filter by type first, then by group or by exact sector. An empty
    /// enterprise AI listing is padded with one sample tool per AI sector.
    pub fn filter(&self, query: &ToolQuery) -> Vec<Tool> {
        let tool_type = query.tool_type();
        let sector = query.sector();
        let group = query.group();

        let mut tools: Vec<Tool> = self
            .tools
            .iter()
            .filter(|tool| tool.is_type(tool_type))
            .cloned()
            .collect();
        debug!(tool_type, count = tools.len(), "After type filter");

        if let Ok(sector_group) = group.parse::<SectorGroup>() {
            tools.retain(|tool| sector_group.contains(&tool.sector));
            debug!(group, count = tools.len(), "After group filter");
        } else if !sector.is_empty() {
            tools.retain(|tool| tool.sector == sector);
            debug!(sector, count = tools.len(), "After sector filter");
        }

        if tools.is_empty() && tool_type == "enterprise" && group == "ai" {
            debug!("No enterprise AI tools matched, returning sample tools");
            tools = AI_SECTORS
                .iter()
                .enumerate()
                .map(|(idx, sector)| Tool::sample_for_sector(idx, sector))
                .collect();
        }

        tools
    }

    /// Tool counts per non-empty sector, largest first. Ties keep first-seen order.
    pub fn category_counts(&self) -> Vec<CategoryCount> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<CategoryCount> = Vec::new();

        for tool in self.tools.iter().filter(|tool| !tool.sector.is_empty()) {
            match index.get(tool.sector.as_str()) {
                Some(&idx) => counts[idx].count += 1,
                None => {
                    index.insert(tool.sector.as_str(), counts.len());
                    counts.push(CategoryCount {
                        sector: tool.sector.clone(),
                        count: 1,
                    });
                }
            }
        }

        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }
}
