use serde::{Deserialize, Serialize};

use super::domain::{AgentId, EvaluatedAward, RuleId};
use super::engine::AwardRunOutcome;

/// Headline figures for the dashboard summary strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_payout: f64,
    /// Winning components across all agents: one per competition group plus
    /// one per independent rule that paid out.
    pub awards_paid: usize,
    pub agents_paid: usize,
    /// Mean achievement rate over every evaluated (agent, rule) row.
    pub average_achievement: f64,
}

pub fn summarize(outcome: &AwardRunOutcome) -> RunSummary {
    let total_payout = outcome
        .breakdowns
        .iter()
        .map(|breakdown| breakdown.total_amount)
        .sum();

    let awards_paid = outcome
        .breakdowns
        .iter()
        .map(|breakdown| breakdown.components.len())
        .sum();

    let agents_paid = outcome
        .breakdowns
        .iter()
        .filter(|breakdown| breakdown.total_amount > 0.0)
        .count();

    let average_achievement = if outcome.evaluations.is_empty() {
        0.0
    } else {
        outcome
            .evaluations
            .iter()
            .map(|evaluation| evaluation.progress.achievement_rate)
            .sum::<f64>()
            / outcome.evaluations.len() as f64
    };

    RunSummary {
        total_payout,
        awards_paid,
        agents_paid,
        average_achievement,
    }
}

/// A near-miss award worth chasing: the agent is at least halfway to the next
/// target and a concrete reward is at stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub agent_id: AgentId,
    pub rule_id: RuleId,
    pub rule_name: String,
    pub achievement_rate: f64,
    pub shortfall: f64,
    pub reward_at_stake: f64,
    /// Reward per unit of additional performance still required.
    pub roi: f64,
}

/// Rank unpaid evaluations by return on the remaining effort, best first.
pub fn golden_opportunities(evaluations: &[EvaluatedAward]) -> Vec<Opportunity> {
    let mut opportunities: Vec<Opportunity> = evaluations
        .iter()
        .filter(|evaluation| evaluation.amount == 0.0)
        .filter(|evaluation| {
            let rate = evaluation.progress.achievement_rate;
            (50.0..100.0).contains(&rate)
        })
        .filter_map(|evaluation| {
            let reward = evaluation.progress.next_reward?;
            let shortfall = evaluation.progress.shortfall;
            if reward <= 0.0 || shortfall <= 0.0 {
                return None;
            }
            Some(Opportunity {
                agent_id: evaluation.agent_id.clone(),
                rule_id: evaluation.rule_id.clone(),
                rule_name: evaluation.rule_name.clone(),
                achievement_rate: evaluation.progress.achievement_rate,
                shortfall,
                reward_at_stake: reward,
                roi: reward / shortfall,
            })
        })
        .collect();

    opportunities.sort_by(|a, b| b.roi.total_cmp(&a.roi));
    opportunities
}
