use serde::Serialize;
use wager_models::{BetOutcome, BetRecord};

use crate::classify::chronological;

/// Win/loss streak figures over the resolved history.
///
/// `current` is the signed trailing streak: positive for an ongoing run of
/// wins, negative for an ongoing run of losses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub longest_wins: u32,
    pub longest_losses: u32,
    pub current: i32,
}

/// Walk resolved bets in date order. Won and CashedOut extend the win
/// streak, Lost extends the loss streak, Void touches neither counter.
pub fn compute(resolved: &[&BetRecord]) -> StreakSummary {
    let mut summary = StreakSummary::default();
    let mut wins = 0u32;
    let mut losses = 0u32;

    for bet in chronological(resolved) {
        if bet.outcome.is_win_event() {
            wins += 1;
            losses = 0;
            summary.longest_wins = summary.longest_wins.max(wins);
        } else if bet.outcome == BetOutcome::Lost {
            losses += 1;
            wins = 0;
            summary.longest_losses = summary.longest_losses.max(losses);
        }
    }

    summary.current = if wins > 0 {
        wins as i32
    } else {
        -(losses as i32)
    };
    summary
}
