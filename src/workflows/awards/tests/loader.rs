use crate::workflows::awards::domain::{RuleKind, TierPayout};
use crate::workflows::awards::loader::{parse_agent_metrics, parse_rule_set, LoadError};
use std::io::Cursor;

const METRICS_CSV: &str = "\
agent_id,branch,agent_tier,premium_volume,policy_count
a-100,Seoul,senior,\"1,000,000\",12
a-200,Busan,,500000,
";

#[test]
fn parses_the_wide_metrics_export() {
    let agents = parse_agent_metrics(Cursor::new(METRICS_CSV)).expect("metrics parse");

    assert_eq!(agents.len(), 2);

    let first = &agents[0];
    assert_eq!(first.agent_id.0, "a-100");
    assert_eq!(first.branch.as_deref(), Some("Seoul"));
    assert_eq!(first.agent_tier.as_deref(), Some("senior"));
    assert_eq!(first.metric("premium_volume"), Some(1_000_000.0));
    assert_eq!(first.metric("policy_count"), Some(12.0));

    // empty cells mean the metric is absent, never zero.
    let second = &agents[1];
    assert_eq!(second.agent_tier, None);
    assert_eq!(second.metric("policy_count"), None);
}

#[test]
fn rejects_a_missing_agent_id_column() {
    let err = parse_agent_metrics(Cursor::new("name,premium\nx,1\n"))
        .expect_err("must require agent_id");
    assert!(matches!(err, LoadError::MissingAgentColumn));
}

#[test]
fn rejects_non_numeric_metric_cells() {
    let err = parse_agent_metrics(Cursor::new("agent_id,premium_volume\na-1,lots\n"))
        .expect_err("must reject text metrics");
    assert!(matches!(err, LoadError::NonNumericMetric { .. }));
}

#[test]
fn rejects_negative_metric_values() {
    let err = parse_agent_metrics(Cursor::new("agent_id,premium_volume\na-1,-5\n"))
        .expect_err("must reject negative metrics");
    assert!(matches!(err, LoadError::NegativeMetric { .. }));
}

#[test]
fn rejects_duplicate_agent_rows() {
    let err = parse_agent_metrics(Cursor::new("agent_id,premium_volume\na-1,5\na-1,7\n"))
        .expect_err("must reject duplicate agents");
    assert!(matches!(err, LoadError::DuplicateAgent { .. }));
}

#[test]
fn parses_the_rule_configuration_set() {
    let raw = r#"[
        {
            "rule_id": "fr-premium",
            "name": "Premium volume 2%",
            "metric_key": "premium_volume",
            "type": "flat_rate",
            "rate": 0.02,
            "competition_group": "summer-push"
        },
        {
            "rule_id": "step-policies",
            "name": "Policy count steps",
            "metric_key": "policy_count",
            "type": "tiered",
            "tiers": [
                { "threshold": 10.0, "payout": { "bonus": 50000.0 } },
                { "threshold": 20.0, "payout": { "rate": 0.01 } }
            ]
        }
    ]"#;

    let rules = parse_rule_set(raw).expect("rules parse");

    assert_eq!(rules.len(), 2);
    assert!(matches!(rules[0].kind, RuleKind::FlatRate { rate } if rate == 0.02));
    assert_eq!(rules[0].competition_group.as_deref(), Some("summer-push"));
    match &rules[1].kind {
        RuleKind::Tiered { tiers, .. } => {
            assert_eq!(tiers.len(), 2);
            assert!(matches!(tiers[1].payout, TierPayout::Rate(rate) if rate == 0.01));
        }
        other => panic!("expected tiered rule, got {other:?}"),
    }
}

#[test]
fn malformed_rule_json_is_a_load_error() {
    let err = parse_rule_set("{not json").expect_err("must reject malformed json");
    assert!(matches!(err, LoadError::Rules(_)));
}
