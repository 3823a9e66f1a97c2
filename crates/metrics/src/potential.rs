use rust_decimal::Decimal;
use serde::Serialize;
use wager_models::BetRecord;

use crate::returns::ratio_pct;

/// Projected outcome of the open (pending) bets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingProjection {
    pub pending_count: usize,
    /// Total stake currently at risk.
    pub exposure: Decimal,
    pub potential_payout: Decimal,
    pub potential_profit: Decimal,
    pub potential_roi: f64,
}

/// Aggregate the payout projection over pending bets. Bonus stakes earn the
/// same unit profit as the stake; boosts are applied per the magnitude rule
/// on [`BetRecord::potential_profit`].
pub fn compute(pending: &[&BetRecord]) -> PendingProjection {
    let exposure: Decimal = pending.iter().map(|b| b.stake).sum();
    let potential_payout: Decimal = pending.iter().map(|b| b.potential_payout()).sum();
    let potential_profit = potential_payout - exposure;

    PendingProjection {
        pending_count: pending.len(),
        exposure,
        potential_payout,
        potential_profit,
        potential_roi: ratio_pct(potential_profit, exposure),
    }
}
