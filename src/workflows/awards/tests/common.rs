use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::workflows::awards::domain::{
    AgentId, AgentMetrics, Breakpoint, EvaluatedAward, IncentiveRule, RuleId, RuleKind,
    RuleProgress, RunPeriod, Tier, TierMode, TierPayout,
};

pub(super) fn period() -> RunPeriod {
    RunPeriod {
        start: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid period start"),
        end: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid period end"),
    }
}

pub(super) fn agent(id: &str, entries: &[(&str, f64)]) -> AgentMetrics {
    let metrics: BTreeMap<String, f64> = entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect();

    AgentMetrics {
        agent_id: AgentId(id.to_string()),
        branch: None,
        agent_tier: None,
        metrics,
    }
}

pub(super) fn flat_rule(id: &str, metric_key: &str, rate: f64) -> IncentiveRule {
    IncentiveRule {
        rule_id: RuleId(id.to_string()),
        name: format!("{id} flat incentive"),
        metric_key: metric_key.to_string(),
        default_value: None,
        scope: None,
        active: None,
        competition_group: None,
        kind: RuleKind::FlatRate { rate },
    }
}

/// Tiers paying a fixed bonus at each threshold, the common tiered shape.
pub(super) fn tiered_rule(id: &str, metric_key: &str, tiers: &[(f64, f64)]) -> IncentiveRule {
    IncentiveRule {
        rule_id: RuleId(id.to_string()),
        name: format!("{id} tiered incentive"),
        metric_key: metric_key.to_string(),
        default_value: None,
        scope: None,
        active: None,
        competition_group: None,
        kind: RuleKind::Tiered {
            tiers: tiers
                .iter()
                .map(|(threshold, bonus)| Tier {
                    threshold: *threshold,
                    payout: TierPayout::Bonus(*bonus),
                })
                .collect(),
            mode: TierMode::LandedTier,
        },
    }
}

pub(super) fn continuous_rule(id: &str, metric_key: &str, points: &[(f64, f64)]) -> IncentiveRule {
    IncentiveRule {
        rule_id: RuleId(id.to_string()),
        name: format!("{id} continuous incentive"),
        metric_key: metric_key.to_string(),
        default_value: None,
        scope: None,
        active: None,
        competition_group: None,
        kind: RuleKind::Continuous {
            points: points
                .iter()
                .map(|(at, amount)| Breakpoint {
                    at: *at,
                    amount: *amount,
                })
                .collect(),
            floor: 0.0,
            tail_rate: None,
        },
    }
}

pub(super) fn grouped(mut rule: IncentiveRule, group: &str) -> IncentiveRule {
    rule.competition_group = Some(group.to_string());
    rule
}

pub(super) fn award(
    agent_id: &str,
    rule_id: &str,
    amount: f64,
    group: Option<&str>,
) -> EvaluatedAward {
    EvaluatedAward {
        agent_id: AgentId(agent_id.to_string()),
        rule_id: RuleId(rule_id.to_string()),
        rule_name: format!("{rule_id} incentive"),
        amount,
        competition_group: group.map(str::to_string),
        progress: RuleProgress::default(),
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
