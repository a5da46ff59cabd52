mod rules;

use thiserror::Error;

use super::domain::{AgentMetrics, IncentiveRule, RuleKind, RuleProgress, RunPeriod};

/// Result of applying one rule to one agent.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Payout { amount: f64, progress: RuleProgress },
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("rule references metric '{metric_key}' absent from the agent record")]
    MissingMetric { metric_key: String },
}

/// Pure mapping of (agent metrics, one rule) to an award amount.
///
/// Scope and activity-window misses short-circuit to `NotApplicable` before
/// any computation. A missing driving metric only falls back to the rule's
/// declared default; without one it is an error, never a silent zero.
pub fn evaluate(
    agent: &AgentMetrics,
    rule: &IncentiveRule,
    period: &RunPeriod,
) -> Result<RuleOutcome, EvaluationError> {
    if let Some(scope) = &rule.scope {
        if !scope.admits(agent) {
            return Ok(RuleOutcome::NotApplicable);
        }
    }

    if let Some(window) = &rule.active {
        if !window.overlaps(period) {
            return Ok(RuleOutcome::NotApplicable);
        }
    }

    let value = agent
        .metric(&rule.metric_key)
        .or(rule.default_value)
        .ok_or_else(|| EvaluationError::MissingMetric {
            metric_key: rule.metric_key.clone(),
        })?;

    let (amount, progress) = match &rule.kind {
        RuleKind::FlatRate { rate } => rules::flat_rate(value, *rate),
        RuleKind::Tiered { tiers, mode } => rules::tiered(value, tiers, *mode),
        RuleKind::Continuous {
            points,
            floor,
            tail_rate,
        } => rules::continuous(value, points, *floor, *tail_rate),
    };

    Ok(RuleOutcome::Payout { amount, progress })
}
