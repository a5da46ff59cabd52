use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{Breakpoint, IncentiveRule, RuleId, RuleKind, Tier, TierPayout};

/// Ordered set of validated incentive rules. Configured order is preserved
/// because it doubles as the tie-break priority during competition
/// resolution: first-listed wins on an exact amount tie.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<IncentiveRule>,
}

impl RuleCatalog {
    /// Validate and admit rules, excluding invalid ones from every agent's
    /// computation. Rejections are reported, not fatal for the run.
    pub fn load(rules: Vec<IncentiveRule>) -> (Self, Vec<RuleRejection>) {
        let mut admitted = Vec::with_capacity(rules.len());
        let mut rejections = Vec::new();
        let mut seen_ids: HashSet<RuleId> = HashSet::new();

        for rule in rules {
            if !seen_ids.insert(rule.rule_id.clone()) {
                rejections.push(RuleRejection {
                    rule_id: rule.rule_id,
                    reason: CatalogViolation::DuplicateRuleId,
                });
                continue;
            }

            match validate_rule(&rule) {
                Ok(()) => admitted.push(rule),
                Err(reason) => rejections.push(RuleRejection {
                    rule_id: rule.rule_id,
                    reason,
                }),
            }
        }

        (Self { rules: admitted }, rejections)
    }

    pub fn rules(&self) -> &[IncentiveRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A rule excluded at catalog load, with the invariant it violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRejection {
    pub rule_id: RuleId,
    pub reason: CatalogViolation,
}

/// Rule parameter invariants checked at catalog load.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogViolation {
    #[error("rule id appears more than once in the catalog")]
    DuplicateRuleId,
    #[error("metric key must not be empty")]
    EmptyMetricKey,
    #[error("rate must be a finite, non-negative fraction")]
    InvalidRate,
    #[error("declared default value must be finite and non-negative")]
    InvalidDefault,
    #[error("tiered rule must configure at least one tier")]
    EmptyTiers,
    #[error("tier thresholds must be finite, non-negative, and strictly ascending")]
    TiersNotAscending,
    #[error("tier payout must be finite and non-negative")]
    InvalidTierPayout,
    #[error("continuous rule must configure at least one breakpoint")]
    EmptyBreakpoints,
    #[error("breakpoints must be finite, non-negative, and strictly ascending")]
    BreakpointsNotAscending,
    #[error("breakpoint amount must be finite and non-negative")]
    InvalidBreakpointAmount,
    #[error("continuous floor must be finite and non-negative")]
    InvalidFloor,
    #[error("active window end precedes its start")]
    InvalidActiveWindow,
}

fn validate_rule(rule: &IncentiveRule) -> Result<(), CatalogViolation> {
    if rule.metric_key.trim().is_empty() {
        return Err(CatalogViolation::EmptyMetricKey);
    }

    if let Some(default) = rule.default_value {
        if !default.is_finite() || default < 0.0 {
            return Err(CatalogViolation::InvalidDefault);
        }
    }

    if let Some(window) = &rule.active {
        if let (Some(start), Some(end)) = (window.start, window.end) {
            if end < start {
                return Err(CatalogViolation::InvalidActiveWindow);
            }
        }
    }

    match &rule.kind {
        RuleKind::FlatRate { rate } => validate_rate(*rate),
        RuleKind::Tiered { tiers, .. } => validate_tiers(tiers),
        RuleKind::Continuous {
            points,
            floor,
            tail_rate,
        } => validate_curve(points, *floor, *tail_rate),
    }
}

fn validate_rate(rate: f64) -> Result<(), CatalogViolation> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(CatalogViolation::InvalidRate);
    }
    Ok(())
}

fn validate_tiers(tiers: &[Tier]) -> Result<(), CatalogViolation> {
    if tiers.is_empty() {
        return Err(CatalogViolation::EmptyTiers);
    }

    let mut previous: Option<f64> = None;
    for tier in tiers {
        if !tier.threshold.is_finite() || tier.threshold < 0.0 {
            return Err(CatalogViolation::TiersNotAscending);
        }
        if let Some(prev) = previous {
            if tier.threshold <= prev {
                return Err(CatalogViolation::TiersNotAscending);
            }
        }
        previous = Some(tier.threshold);

        let payout = match tier.payout {
            TierPayout::Bonus(amount) => amount,
            TierPayout::Rate(rate) => rate,
        };
        if !payout.is_finite() || payout < 0.0 {
            return Err(CatalogViolation::InvalidTierPayout);
        }
    }

    Ok(())
}

fn validate_curve(
    points: &[Breakpoint],
    floor: f64,
    tail_rate: Option<f64>,
) -> Result<(), CatalogViolation> {
    if points.is_empty() {
        return Err(CatalogViolation::EmptyBreakpoints);
    }

    let mut previous: Option<f64> = None;
    for point in points {
        if !point.at.is_finite() || point.at < 0.0 {
            return Err(CatalogViolation::BreakpointsNotAscending);
        }
        if let Some(prev) = previous {
            if point.at <= prev {
                return Err(CatalogViolation::BreakpointsNotAscending);
            }
        }
        previous = Some(point.at);

        if !point.amount.is_finite() || point.amount < 0.0 {
            return Err(CatalogViolation::InvalidBreakpointAmount);
        }
    }

    if !floor.is_finite() || floor < 0.0 {
        return Err(CatalogViolation::InvalidFloor);
    }

    if let Some(rate) = tail_rate {
        if !rate.is_finite() || rate < 0.0 {
            return Err(CatalogViolation::InvalidRate);
        }
    }

    Ok(())
}
