use super::super::domain::{Breakpoint, RuleProgress, Tier, TierMode, TierPayout};

/// Flat-rate: the award is a configured fraction of the metric value.
pub(crate) fn flat_rate(value: f64, rate: f64) -> (f64, RuleProgress) {
    let amount = value * rate;
    let progress = RuleProgress {
        achievement_rate: if value > 0.0 { 100.0 } else { 0.0 },
        next_target: None,
        next_reward: None,
        shortfall: 0.0,
    };
    (amount, progress)
}

/// Tiered: the metric value lands in exactly one tier (lower edge inclusive,
/// last tier open-ended). The landed tier alone pays unless the rule is
/// configured for cumulative brackets, in which case every reached tier
/// contributes and rate tiers apply to their bracket slice.
pub(crate) fn tiered(value: f64, tiers: &[Tier], mode: TierMode) -> (f64, RuleProgress) {
    let landed = tiers.iter().rposition(|tier| tier.threshold <= value);

    let amount = match mode {
        TierMode::LandedTier => landed
            .map(|index| tier_payout(&tiers[index], value))
            .unwrap_or(0.0),
        TierMode::CumulativeBrackets => tiers
            .iter()
            .enumerate()
            .filter(|(_, tier)| tier.threshold <= value)
            .map(|(index, tier)| match tier.payout {
                TierPayout::Bonus(bonus) => bonus,
                TierPayout::Rate(rate) => {
                    let upper = tiers
                        .get(index + 1)
                        .map(|next| next.threshold.min(value))
                        .unwrap_or(value);
                    rate * (upper - tier.threshold)
                }
            })
            .sum(),
    };

    let progress = progress_toward(value, tiers.iter().map(|tier| (tier.threshold, preview(tier))));

    (amount, progress)
}

/// Continuous: piecewise-linear interpolation over configured breakpoints, a
/// floor below the first, and flat extrapolation past the last unless a tail
/// rate continues the slope.
pub(crate) fn continuous(
    value: f64,
    points: &[Breakpoint],
    floor: f64,
    tail_rate: Option<f64>,
) -> (f64, RuleProgress) {
    let amount = match points.iter().rposition(|point| point.at <= value) {
        None => floor,
        Some(index) if index + 1 == points.len() => {
            let last = points[index];
            last.amount + tail_rate.map(|rate| rate * (value - last.at)).unwrap_or(0.0)
        }
        Some(index) => {
            let lower = points[index];
            let upper = points[index + 1];
            let span = upper.at - lower.at;
            lower.amount + (upper.amount - lower.amount) * (value - lower.at) / span
        }
    };

    let progress = progress_toward(value, points.iter().map(|point| (point.at, point.amount)));

    (amount, progress)
}

/// What a landed tier pays for the actual metric value: bonus tiers pay
/// their fixed amount, rate tiers apply to the full value.
fn tier_payout(tier: &Tier, value: f64) -> f64 {
    match tier.payout {
        TierPayout::Bonus(bonus) => bonus,
        TierPayout::Rate(rate) => rate * value,
    }
}

/// What a tier would pay an agent who exactly reaches its threshold, used for
/// next-target guidance.
fn preview(tier: &Tier) -> f64 {
    match tier.payout {
        TierPayout::Bonus(bonus) => bonus,
        TierPayout::Rate(rate) => rate * tier.threshold,
    }
}

/// Locate the first unreached target among ascending (target, reward) pairs
/// and express how close the metric value is to it.
fn progress_toward(
    value: f64,
    targets: impl Iterator<Item = (f64, f64)>,
) -> RuleProgress {
    let mut next: Option<(f64, f64)> = None;
    for (target, reward) in targets {
        if target > value {
            next = Some((target, reward));
            break;
        }
    }

    match next {
        Some((target, reward)) => RuleProgress {
            achievement_rate: (value / target * 100.0).min(100.0),
            next_target: Some(target),
            next_reward: Some(reward),
            shortfall: (target - value).max(0.0),
        },
        None => RuleProgress {
            achievement_rate: 100.0,
            next_target: None,
            next_reward: None,
            shortfall: 0.0,
        },
    }
}
