//! Incentive award computation for agent performance dashboards.
//!
//! The pipeline is metric store + rule catalog -> per-(agent, rule)
//! evaluation -> competition resolution -> per-agent breakdowns. Evaluation
//! is pure and agents are independent, so runs are idempotent and
//! parallelizable by the caller without coordination.

pub mod catalog;
pub mod domain;
pub mod engine;
pub(crate) mod evaluation;
pub mod loader;
pub mod report;
pub(crate) mod resolver;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogViolation, RuleCatalog, RuleRejection};
pub use domain::{
    AgentId, AgentMetrics, AwardComponent, Breakpoint, ComponentKey, DateWindow, EvaluatedAward,
    EvaluationFailure, FailureKind, FinalAwardBreakdown, IncentiveRule, RuleId, RuleKind,
    RuleProgress, RuleScope, RunPeriod, Tier, TierMode, TierPayout,
};
pub use engine::{AwardEngine, AwardRunOutcome};
pub use evaluation::{evaluate, EvaluationError, RuleOutcome};
pub use loader::{parse_agent_metrics, parse_rule_set, LoadError};
pub use report::{golden_opportunities, summarize, Opportunity, RunSummary};
