use serde::Serialize;
use wager_models::{BetOutcome, BetRecord};

/// Resolved/pending partition of a bet set. Sub-counts by exact outcome are
/// derived from the resolved side.
#[derive(Debug, Clone)]
pub struct Classified<'a> {
    pub resolved: Vec<&'a BetRecord>,
    pub pending: Vec<&'a BetRecord>,
}

impl<'a> Classified<'a> {
    pub fn wins(&self) -> usize {
        self.count(BetOutcome::Won)
    }

    pub fn losses(&self) -> usize {
        self.count(BetOutcome::Lost)
    }

    pub fn voids(&self) -> usize {
        self.count(BetOutcome::Void)
    }

    pub fn cashouts(&self) -> usize {
        self.count(BetOutcome::CashedOut)
    }

    /// Won over resolved, as a percentage. 0 when nothing is resolved.
    pub fn win_rate(&self) -> f64 {
        if self.resolved.is_empty() {
            0.0
        } else {
            self.wins() as f64 / self.resolved.len() as f64 * 100.0
        }
    }

    fn count(&self, outcome: BetOutcome) -> usize {
        self.resolved.iter().filter(|b| b.outcome == outcome).count()
    }
}

pub fn partition(bets: &[BetRecord]) -> Classified<'_> {
    let (resolved, pending) = bets.iter().partition(|b| b.is_resolved());
    Classified { resolved, pending }
}

/// Count of bets per outcome, Pending included. Feeds the status
/// distribution chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub pending: usize,
    pub won: usize,
    pub lost: usize,
    pub void: usize,
    pub cashed_out: usize,
}

pub fn outcome_counts(bets: &[BetRecord]) -> OutcomeCounts {
    let mut counts = OutcomeCounts::default();
    for bet in bets {
        match bet.outcome {
            BetOutcome::Pending => counts.pending += 1,
            BetOutcome::Won => counts.won += 1,
            BetOutcome::Lost => counts.lost += 1,
            BetOutcome::Void => counts.void += 1,
            BetOutcome::CashedOut => counts.cashed_out += 1,
        }
    }
    counts
}

/// Dated bets in ascending date order. The sort is stable, so same-day bets
/// keep their original relative order; undated bets are excluded.
pub fn chronological<'a>(bets: &[&'a BetRecord]) -> Vec<&'a BetRecord> {
    let mut dated: Vec<&BetRecord> = bets
        .iter()
        .copied()
        .filter(|b| b.placed_on.is_some())
        .collect();
    dated.sort_by_key(|b| b.placed_on);
    dated
}
