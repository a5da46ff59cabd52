use super::domain::{
    AgentId, AwardComponent, ComponentKey, EvaluatedAward, FinalAwardBreakdown,
};

/// Collapse one agent's evaluated awards into the final breakdown.
///
/// Awards are partitioned by competition group; an absent group makes the
/// rule its own singleton partition so independent rules never compete.
/// Within a group only the maximum amount survives, and because awards arrive
/// in catalog order, replacing only on a strictly greater amount makes the
/// first-listed rule win exact ties deterministically. Component order is the
/// first appearance of each key in catalog order.
pub(crate) fn resolve(agent_id: AgentId, awards: &[EvaluatedAward]) -> FinalAwardBreakdown {
    let mut components: Vec<AwardComponent> = Vec::new();

    for award in awards.iter().filter(|award| award.amount > 0.0) {
        let key = match &award.competition_group {
            Some(group) => ComponentKey::Group(group.clone()),
            None => ComponentKey::Rule(award.rule_id.clone()),
        };

        match components.iter().position(|component| component.key == key) {
            Some(index) => {
                if award.amount > components[index].amount {
                    components[index].winning_rule_id = award.rule_id.clone();
                    components[index].amount = award.amount;
                }
            }
            None => components.push(AwardComponent {
                key,
                winning_rule_id: award.rule_id.clone(),
                amount: award.amount,
            }),
        }
    }

    let total_amount = components.iter().map(|component| component.amount).sum();

    FinalAwardBreakdown {
        agent_id,
        total_amount,
        components,
    }
}
