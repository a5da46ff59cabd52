use super::common::*;
use crate::workflows::awards::domain::{AgentId, ComponentKey, RuleId};
use crate::workflows::awards::resolver::resolve;

#[test]
fn competing_rules_pay_only_the_group_maximum() {
    let awards = vec![
        award("a-1", "flat-2pct", 20_000.0, Some("summer-push")),
        award("a-1", "flat-high", 35_000.0, Some("summer-push")),
    ];

    let breakdown = resolve(AgentId("a-1".to_string()), &awards);

    assert_eq!(breakdown.components.len(), 1);
    let component = &breakdown.components[0];
    assert_eq!(component.key, ComponentKey::Group("summer-push".to_string()));
    assert_eq!(component.winning_rule_id, RuleId("flat-high".to_string()));
    assert_close(component.amount, 35_000.0);
    assert_close(breakdown.total_amount, 35_000.0);
}

#[test]
fn exact_tie_goes_to_the_first_listed_rule() {
    let awards = vec![
        award("a-1", "first", 50_000.0, Some("group")),
        award("a-1", "second", 50_000.0, Some("group")),
        award("a-1", "third", 49_999.0, Some("group")),
    ];

    let breakdown = resolve(AgentId("a-1".to_string()), &awards);

    assert_eq!(
        breakdown.components[0].winning_rule_id,
        RuleId("first".to_string())
    );
}

#[test]
fn independent_rules_accumulate() {
    let awards = vec![
        award("a-1", "alpha", 10_000.0, None),
        award("a-1", "beta", 5_000.0, None),
        award("a-1", "gamma", 1_000.0, Some("solo-group")),
    ];

    let breakdown = resolve(AgentId("a-1".to_string()), &awards);

    assert_eq!(breakdown.components.len(), 3);
    assert_close(breakdown.total_amount, 16_000.0);
}

#[test]
fn zero_amount_awards_never_become_components() {
    let awards = vec![
        award("a-1", "unreached", 0.0, None),
        award("a-1", "reached", 7_500.0, None),
    ];

    let breakdown = resolve(AgentId("a-1".to_string()), &awards);

    assert_eq!(breakdown.components.len(), 1);
    assert_eq!(
        breakdown.components[0].winning_rule_id,
        RuleId("reached".to_string())
    );
}

#[test]
fn total_equals_the_sum_of_components() {
    let awards = vec![
        award("a-1", "a", 10.0, Some("g1")),
        award("a-1", "b", 30.0, Some("g1")),
        award("a-1", "c", 7.0, None),
        award("a-1", "d", 13.0, Some("g2")),
    ];

    let breakdown = resolve(AgentId("a-1".to_string()), &awards);

    let summed: f64 = breakdown
        .components
        .iter()
        .map(|component| component.amount)
        .sum();
    assert_close(breakdown.total_amount, summed);
    assert_close(breakdown.total_amount, 50.0);
}

#[test]
fn component_order_follows_first_appearance() {
    let awards = vec![
        award("a-1", "a", 10.0, Some("late-winner")),
        award("a-1", "b", 5.0, None),
        award("a-1", "c", 40.0, Some("late-winner")),
    ];

    let breakdown = resolve(AgentId("a-1".to_string()), &awards);

    assert_eq!(
        breakdown.components[0].key,
        ComponentKey::Group("late-winner".to_string())
    );
    assert_eq!(
        breakdown.components[1].key,
        ComponentKey::Rule(RuleId("b".to_string()))
    );
    assert_close(breakdown.components[0].amount, 40.0);
}
