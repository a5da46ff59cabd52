use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for sales agents, stable across evaluation periods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

/// Identifier wrapper for configured incentive rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub String);

/// Validated snapshot of one agent's performance figures for a period.
///
/// Metric values are currency amounts or counts, never pre-multiplied by a
/// payout rate. The snapshot is immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub agent_id: AgentId,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub agent_tier: Option<String>,
    pub metrics: BTreeMap<String, f64>,
}

impl AgentMetrics {
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

/// Inclusive date range an engine run evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Optional activity window restricting when a rule pays out. Open bounds
/// leave that side of the window unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateWindow {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn overlaps(&self, period: &RunPeriod) -> bool {
        let starts_in_time = self.start.map(|start| start <= period.end).unwrap_or(true);
        let ends_in_time = self.end.map(|end| end >= period.start).unwrap_or(true);
        starts_in_time && ends_in_time
    }
}

/// Allow-list filter restricting which agents a rule applies to. Empty lists
/// leave that dimension unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleScope {
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub agent_tiers: Vec<String>,
}

impl RuleScope {
    pub fn admits(&self, agent: &AgentMetrics) -> bool {
        let branch_ok = self.branches.is_empty()
            || agent
                .branch
                .as_deref()
                .map(|branch| self.branches.iter().any(|allowed| allowed == branch))
                .unwrap_or(false);
        let tier_ok = self.agent_tiers.is_empty()
            || agent
                .agent_tier
                .as_deref()
                .map(|tier| self.agent_tiers.iter().any(|allowed| allowed == tier))
                .unwrap_or(false);
        branch_ok && tier_ok
    }
}

/// Payout attached to a single tier boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierPayout {
    /// Fixed bonus amount for reaching the tier.
    Bonus(f64),
    /// Rate applied to the driving metric value once inside the tier.
    Rate(f64),
}

/// One boundary of a tiered program, inclusive on its lower edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub threshold: f64,
    pub payout: TierPayout,
}

/// How a tiered rule combines its tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMode {
    /// Only the tier the metric value lands in pays out.
    #[default]
    LandedTier,
    /// Every reached tier contributes; rate tiers apply to their bracket slice.
    CumulativeBrackets,
}

/// Breakpoint of a continuous (piecewise-linear) payout curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub at: f64,
    pub amount: f64,
}

/// Closed set of payout formulas, so adding a rule type is a compile-time
/// checked change rather than a dynamic dispatch surprise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    FlatRate {
        rate: f64,
    },
    Tiered {
        tiers: Vec<Tier>,
        #[serde(default)]
        mode: TierMode,
    },
    Continuous {
        points: Vec<Breakpoint>,
        #[serde(default)]
        floor: f64,
        #[serde(default)]
        tail_rate: Option<f64>,
    },
}

impl RuleKind {
    pub const fn label(&self) -> &'static str {
        match self {
            RuleKind::FlatRate { .. } => "flat_rate",
            RuleKind::Tiered { .. } => "tiered",
            RuleKind::Continuous { .. } => "continuous",
        }
    }
}

/// One configured incentive program. Loaded once per run and immutable during
/// evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveRule {
    pub rule_id: RuleId,
    pub name: String,
    pub metric_key: String,
    /// Declared substitute when the metric is absent from an agent record.
    /// Without it a missing metric is an evaluation failure, never zero.
    #[serde(default)]
    pub default_value: Option<f64>,
    #[serde(default)]
    pub scope: Option<RuleScope>,
    #[serde(default)]
    pub active: Option<DateWindow>,
    /// Rules sharing a group are mutually exclusive; only the highest payout
    /// in the group is awarded.
    #[serde(default)]
    pub competition_group: Option<String>,
    #[serde(flatten)]
    pub kind: RuleKind,
}

/// Guidance data carried with every evaluation so the dashboard can show how
/// close an agent is to the next payout level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleProgress {
    /// Percentage toward the next unreached target, capped at 100.
    pub achievement_rate: f64,
    pub next_target: Option<f64>,
    pub next_reward: Option<f64>,
    pub shortfall: f64,
}

/// Transient result of evaluating one rule against one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedAward {
    pub agent_id: AgentId,
    pub rule_id: RuleId,
    pub rule_name: String,
    pub amount: f64,
    pub competition_group: Option<String>,
    pub progress: RuleProgress,
}

/// Key identifying one breakdown component: a competition group, or a
/// stand-alone rule that never competes with anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKey {
    Group(String),
    Rule(RuleId),
}

/// One winning entry of a final breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardComponent {
    pub key: ComponentKey,
    pub winning_rule_id: RuleId,
    pub amount: f64,
}

/// Per-agent engine output: the winners per competition group plus every
/// independent rule that paid out, with their sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAwardBreakdown {
    pub agent_id: AgentId,
    pub total_amount: f64,
    pub components: Vec<AwardComponent>,
}

/// Failure attributable to a single (agent, rule) pair, reported alongside
/// successful results rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFailure {
    pub agent_id: AgentId,
    pub rule_id: RuleId,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingMetric { metric_key: String },
}

impl FailureKind {
    pub fn summary(&self) -> String {
        match self {
            FailureKind::MissingMetric { metric_key } => {
                format!("metric '{metric_key}' absent with no declared default")
            }
        }
    }
}
