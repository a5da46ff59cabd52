use std::collections::{BTreeMap, HashSet};
use std::io::Read;

use thiserror::Error;

use super::domain::{AgentId, AgentMetrics, IncentiveRule};

const AGENT_ID_COLUMN: &str = "agent_id";
const BRANCH_COLUMN: &str = "branch";
const AGENT_TIER_COLUMN: &str = "agent_tier";

/// Parse the wide metrics export: one row per agent, an `agent_id` column,
/// optional `branch`/`agent_tier` attribute columns, and every remaining
/// column a named numeric metric. An empty cell means the metric is absent
/// from that agent's record, not zero.
pub fn parse_agent_metrics<R: Read>(reader: R) -> Result<Vec<AgentMetrics>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let agent_index = headers
        .iter()
        .position(|header| header == AGENT_ID_COLUMN)
        .ok_or(LoadError::MissingAgentColumn)?;

    let mut agents = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;

        let agent_id = record
            .get(agent_index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(LoadError::EmptyAgentId { row: row + 1 })?
            .to_string();

        if !seen.insert(agent_id.clone()) {
            return Err(LoadError::DuplicateAgent { agent_id });
        }

        let mut branch = None;
        let mut agent_tier = None;
        let mut metrics = BTreeMap::new();

        for (index, header) in headers.iter().enumerate() {
            if index == agent_index {
                continue;
            }

            let raw = record.get(index).map(str::trim).unwrap_or("");
            if raw.is_empty() {
                continue;
            }

            match header {
                BRANCH_COLUMN => branch = Some(raw.to_string()),
                AGENT_TIER_COLUMN => agent_tier = Some(raw.to_string()),
                _ => {
                    let value = raw
                        .replace(',', "")
                        .parse::<f64>()
                        .map_err(|_| LoadError::NonNumericMetric {
                            agent_id: agent_id.clone(),
                            column: header.to_string(),
                            value: raw.to_string(),
                        })?;
                    if !value.is_finite() || value < 0.0 {
                        return Err(LoadError::NegativeMetric {
                            agent_id: agent_id.clone(),
                            column: header.to_string(),
                            value,
                        });
                    }
                    metrics.insert(header.to_string(), value);
                }
            }
        }

        agents.push(AgentMetrics {
            agent_id: AgentId(agent_id),
            branch,
            agent_tier,
            metrics,
        });
    }

    Ok(agents)
}

/// Parse the externally persisted rule configuration set. Shape validation
/// beyond deserialization happens in the catalog.
pub fn parse_rule_set(raw: &str) -> Result<Vec<IncentiveRule>, LoadError> {
    serde_json::from_str(raw).map_err(LoadError::Rules)
}

/// Malformed input tables. Fatal for the request or CLI invocation that
/// supplied them, never for anything else.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("metrics csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("metrics csv is missing the '{AGENT_ID_COLUMN}' column")]
    MissingAgentColumn,
    #[error("metrics csv row {row} has an empty agent id")]
    EmptyAgentId { row: usize },
    #[error("agent '{agent_id}' appears more than once in the metrics csv")]
    DuplicateAgent { agent_id: String },
    #[error("agent '{agent_id}' column '{column}' is not numeric: '{value}'")]
    NonNumericMetric {
        agent_id: String,
        column: String,
        value: String,
    },
    #[error("agent '{agent_id}' metric '{column}' must be non-negative, got {value}")]
    NegativeMetric {
        agent_id: String,
        column: String,
        value: f64,
    },
    #[error("rule configuration: {0}")]
    Rules(#[from] serde_json::Error),
    #[error("period end {end} precedes period start {start}")]
    InvalidPeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}
