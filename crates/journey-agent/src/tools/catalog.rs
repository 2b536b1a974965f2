use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use journey_persist::JsonTable;
use journey_types::ToolName;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, AgentTool, ToolContext};

const DEFAULT_LIMIT: usize = 3;
const MAX_LIMIT: usize = 10;

/// Read-only list of JSON records searched by keyword overlap.
pub struct Catalog {
    table: JsonTable<Value>,
}

impl Catalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            table: JsonTable::new(path),
        }
    }

    /// Records ranked by how many query keywords they contain. Records with
    /// no overlap are dropped unless the query itself has no keywords.
    pub async fn search(&self, query: &str, industry: Option<&str>, limit: usize) -> Result<Vec<Value>> {
        let rows = self.table.load().await?;
        let keywords = keywords(query);

        let mut scored: Vec<(usize, usize, Value)> = rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| industry.map_or(true, |wanted| matches_industry(row, wanted)))
            .map(|(position, row)| {
                let text = keywords_of_record(&row);
                let score = keywords.iter().filter(|k| text.contains(*k)).count();
                (score, position, row)
            })
            .filter(|(score, _, _)| keywords.is_empty() || *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(scored.into_iter().take(limit).map(|(_, _, row)| row).collect())
    }
}

fn keywords(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn keywords_of_record(value: &Value) -> HashSet<String> {
    let mut words = HashSet::new();
    collect_words(value, &mut words);
    words
}

fn collect_words(value: &Value, words: &mut HashSet<String>) {
    match value {
        Value::String(s) => words.extend(keywords(s)),
        Value::Array(items) => items.iter().for_each(|item| collect_words(item, words)),
        Value::Object(map) => map.values().for_each(|item| collect_words(item, words)),
        _ => {}
    }
}

fn matches_industry(row: &Value, wanted: &str) -> bool {
    let wanted = wanted.trim().to_lowercase();
    if wanted.is_empty() {
        return true;
    }
    row.get("industry")
        .and_then(Value::as_str)
        .is_some_and(|industry| industry.to_lowercase().contains(&wanted))
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

/// Keyword search over a catalog; serves both case studies and testimonials.
pub struct CatalogTool {
    name: ToolName,
    catalog: Catalog,
}

impl CatalogTool {
    pub fn new(name: ToolName, catalog: Catalog) -> Self {
        Self { name, catalog }
    }

    fn result_key(&self) -> &'static str {
        match self.name {
            ToolName::Testimonials => "testimonials",
            _ => "case_studies",
        }
    }
}

#[async_trait]
impl AgentTool for CatalogTool {
    fn name(&self) -> ToolName {
        self.name
    }

    fn description(&self) -> &'static str {
        match self.name {
            ToolName::Testimonials => {
                "Find customer testimonials relevant to the prospect's goal or industry."
            }
            _ => "Find case studies of past projects relevant to the prospect's problem, goal or industry.",
        }
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "What the customer is looking for" },
                "industry": { "type": "string", "description": "Optional industry filter" },
                "limit": { "type": "integer", "minimum": 1, "maximum": MAX_LIMIT }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, _ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: SearchArgs = parse_args(self.name, args)?;
        let limit = args.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let results = self
            .catalog
            .search(&args.query, args.industry.as_deref(), limit)
            .await?;

        if results.is_empty() {
            return Ok(json!({
                self.result_key(): [],
                "message": format!("No matches found for '{}'", args.query),
            }));
        }
        Ok(json!({ self.result_key(): results, "count": results.len() }))
    }
}
