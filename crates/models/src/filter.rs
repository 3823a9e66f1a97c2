use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bet::{BetOutcome, BetRecord, BetType};

/// Immutable filter context threaded into every store query and metrics
/// call. Date bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BetFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bookmaker: Option<String>,
    pub bet_type: Option<BetType>,
    pub outcome: Option<BetOutcome>,
}

impl BetFilter {
    pub fn is_empty(&self) -> bool {
        *self == BetFilter::default()
    }

    pub fn matches(&self, bet: &BetRecord) -> bool {
        if let Some(start) = self.start_date {
            match bet.placed_on {
                Some(date) if date >= start => {}
                _ => return false,
            }
        }
        if let Some(end) = self.end_date {
            match bet.placed_on {
                Some(date) if date <= end => {}
                _ => return false,
            }
        }
        if let Some(ref bookmaker) = self.bookmaker {
            if &bet.bookmaker != bookmaker {
                return false;
            }
        }
        if let Some(bet_type) = self.bet_type {
            if bet.bet_type != bet_type {
                return false;
            }
        }
        if let Some(outcome) = self.outcome {
            if bet.outcome != outcome {
                return false;
            }
        }
        true
    }
}
