use serde::{Deserialize, Serialize};

use super::catalog::RuleCatalog;
use super::domain::{
    AgentMetrics, EvaluatedAward, EvaluationFailure, FailureKind, FinalAwardBreakdown, RunPeriod,
};
use super::evaluation::{self, EvaluationError, RuleOutcome};
use super::resolver;

/// Stateless orchestrator driving the evaluator and resolver over every
/// (agent, rule) pair.
///
/// Agents are evaluated in isolation against the shared read-only catalog, so
/// callers may fan the per-agent work out to any worker pool; the engine
/// itself keeps input agent order in its output for reproducible runs.
pub struct AwardEngine {
    catalog: RuleCatalog,
}

impl AwardEngine {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Run the full evaluation. Per-pair failures are recorded and skipped;
    /// nothing short of a panic aborts the run, and identical inputs always
    /// produce identical outputs.
    pub fn run(&self, agents: &[AgentMetrics], period: &RunPeriod) -> AwardRunOutcome {
        let mut breakdowns = Vec::with_capacity(agents.len());
        let mut evaluations = Vec::new();
        let mut failures = Vec::new();

        for agent in agents {
            let mut agent_awards = Vec::new();

            for rule in self.catalog.rules() {
                match evaluation::evaluate(agent, rule, period) {
                    Ok(RuleOutcome::Payout { amount, progress }) => {
                        agent_awards.push(EvaluatedAward {
                            agent_id: agent.agent_id.clone(),
                            rule_id: rule.rule_id.clone(),
                            rule_name: rule.name.clone(),
                            amount,
                            competition_group: rule.competition_group.clone(),
                            progress,
                        });
                    }
                    Ok(RuleOutcome::NotApplicable) => {}
                    Err(EvaluationError::MissingMetric { metric_key }) => {
                        failures.push(EvaluationFailure {
                            agent_id: agent.agent_id.clone(),
                            rule_id: rule.rule_id.clone(),
                            kind: FailureKind::MissingMetric { metric_key },
                        });
                    }
                }
            }

            breakdowns.push(resolver::resolve(agent.agent_id.clone(), &agent_awards));
            evaluations.extend(agent_awards);
        }

        AwardRunOutcome {
            breakdowns,
            evaluations,
            failures,
        }
    }
}

/// Engine output: one breakdown per agent in input order, the raw per-rule
/// evaluations backing the dashboard detail rows, and every recorded failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRunOutcome {
    pub breakdowns: Vec<FinalAwardBreakdown>,
    pub evaluations: Vec<EvaluatedAward>,
    pub failures: Vec<EvaluationFailure>,
}
