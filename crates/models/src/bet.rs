use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Resolution status of a bet. A bet starts Pending and transitions exactly
/// once into one of the resolved states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BetOutcome {
    Pending,
    Won,
    Lost,
    Void,
    CashedOut,
}

impl BetOutcome {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, BetOutcome::Pending)
    }

    /// Won and CashedOut both count as win events for streak purposes.
    pub fn is_win_event(&self) -> bool {
        matches!(self, BetOutcome::Won | BetOutcome::CashedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BetOutcome::Pending => "pending",
            BetOutcome::Won => "won",
            BetOutcome::Lost => "lost",
            BetOutcome::Void => "void",
            BetOutcome::CashedOut => "cashed_out",
        }
    }

    /// Missing or unrecognized status is treated as Pending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("won") => BetOutcome::Won,
            Some("lost") => BetOutcome::Lost,
            Some("void") => BetOutcome::Void,
            Some("cashed_out") => BetOutcome::CashedOut,
            _ => BetOutcome::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Single,
    Combo,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::Single => "single",
            BetType::Combo => "combo",
        }
    }

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("combo") => BetType::Combo,
            _ => BetType::Single,
        }
    }
}

/// A bet as it comes back from the persistence collaborator: every numeric
/// and textual field may be missing. Normalized into a [`BetRecord`] exactly
/// once, so the aggregators never see an `Option` money field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBet {
    pub id: i64,
    pub category: Option<String>,
    pub bet_type: Option<String>,
    pub bookmaker: Option<String>,
    pub event: Option<String>,
    pub stake: Option<Decimal>,
    pub odds: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub boost: Option<Decimal>,
    pub outcome: Option<String>,
    pub settled: Option<Decimal>,
    pub placed_on: Option<NaiveDate>,
}

/// Normalized bet record, the single input type of the metrics engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetRecord {
    pub id: i64,
    /// Category tags, split from the free-text category field at ingestion.
    pub tags: Vec<String>,
    pub bet_type: BetType,
    pub bookmaker: String,
    pub event: Option<String>,
    pub stake: Decimal,
    pub odds: Decimal,
    pub bonus: Decimal,
    pub boost: Decimal,
    pub outcome: BetOutcome,
    /// Realized net profit/loss for resolved bets. Void bets carry zero.
    pub settled: Option<Decimal>,
    /// Date granularity only; None when the source date was absent or
    /// malformed, which excludes the bet from date-dependent aggregations.
    pub placed_on: Option<NaiveDate>,
}

impl BetRecord {
    /// Zero-default coercion applied once, at the ingestion boundary.
    pub fn from_raw(raw: RawBet) -> Self {
        Self {
            id: raw.id,
            tags: split_tags(raw.category.as_deref().unwrap_or("")),
            bet_type: BetType::parse(raw.bet_type.as_deref()),
            bookmaker: raw.bookmaker.unwrap_or_default(),
            event: raw.event,
            stake: raw.stake.unwrap_or(Decimal::ZERO),
            odds: raw.odds.unwrap_or(Decimal::ZERO),
            bonus: raw.bonus.unwrap_or(Decimal::ZERO),
            boost: raw.boost.unwrap_or(Decimal::ZERO),
            outcome: BetOutcome::parse(raw.outcome.as_deref()),
            settled: raw.settled,
            placed_on: raw.placed_on,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_resolved()
    }

    pub fn settled_value(&self) -> Decimal {
        self.settled.unwrap_or(Decimal::ZERO)
    }

    /// Settlement value over stake, as a percentage. Zero-stake bets return 0.
    pub fn return_pct(&self) -> f64 {
        if self.stake > Decimal::ZERO {
            (self.settled_value() / self.stake).to_f64().unwrap_or(0.0) * 100.0
        } else {
            0.0
        }
    }

    /// Projected net profit if this bet wins: base profit on the stake,
    /// bonus profit on the bonus stake component, plus the boost effect.
    /// A boost in (0, 1] multiplies the base+bonus profit; a boost above 1
    /// is an absolute currency add-on.
    pub fn potential_profit(&self) -> Decimal {
        let unit_profit = (self.odds - Decimal::ONE).max(Decimal::ZERO);
        let base = self.stake * unit_profit;
        let bonus = self.bonus * unit_profit;
        let boost = if self.boost > Decimal::ZERO && self.boost <= Decimal::ONE {
            self.boost * (base + bonus)
        } else if self.boost > Decimal::ONE {
            self.boost
        } else {
            Decimal::ZERO
        };
        base + bonus + boost
    }

    /// Stake returned plus projected profit.
    pub fn potential_payout(&self) -> Decimal {
        self.stake + self.potential_profit()
    }
}

/// Input for creating or updating a bet. Validated before it reaches the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBet {
    pub category: String,
    pub bet_type: BetType,
    pub bookmaker: String,
    pub event: Option<String>,
    pub stake: Decimal,
    pub odds: Decimal,
    #[serde(default)]
    pub bonus: Decimal,
    #[serde(default)]
    pub boost: Decimal,
    pub placed_on: NaiveDate,
}

impl NewBet {
    pub fn validate(&self) -> Result<()> {
        if self.stake <= Decimal::ZERO {
            return Err(LedgerError::InvalidStake {
                amount: self.stake.to_string(),
            });
        }
        if self.odds < dec!(1.01) {
            return Err(LedgerError::InvalidOdds(format!(
                "odds must be at least 1.01, got {}",
                self.odds
            )));
        }
        if self.bonus < Decimal::ZERO || self.boost < Decimal::ZERO {
            return Err(LedgerError::InvalidStake {
                amount: "bonus and boost must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Split a free-text category on commas and semicolons into trimmed,
/// non-empty tags.
pub fn split_tags(category: &str) -> Vec<String> {
    category
        .split(|c| c == ',' || c == ';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(stake: Option<Decimal>, odds: Option<Decimal>) -> RawBet {
        RawBet {
            id: 1,
            stake,
            odds,
            ..RawBet::default()
        }
    }

    #[test]
    fn test_missing_fields_coerce_to_defaults() {
        let bet = BetRecord::from_raw(raw(None, None));
        assert_eq!(bet.stake, Decimal::ZERO);
        assert_eq!(bet.odds, Decimal::ZERO);
        assert_eq!(bet.bonus, Decimal::ZERO);
        assert_eq!(bet.outcome, BetOutcome::Pending);
        assert!(bet.tags.is_empty());
        assert!(!bet.is_resolved());
    }

    #[test]
    fn test_unknown_outcome_is_pending() {
        assert_eq!(BetOutcome::parse(Some("maybe")), BetOutcome::Pending);
        assert_eq!(BetOutcome::parse(None), BetOutcome::Pending);
        assert_eq!(BetOutcome::parse(Some("cashed_out")), BetOutcome::CashedOut);
    }

    #[test]
    fn test_tag_splitting() {
        assert_eq!(split_tags("futebol, nba; tenis"), vec!["futebol", "nba", "tenis"]);
        assert_eq!(split_tags("  "), Vec::<String>::new());
        assert_eq!(split_tags("single"), vec!["single"]);
    }

    #[test]
    fn test_potential_payout_plain() {
        let mut bet = BetRecord::from_raw(raw(Some(dec!(50)), Some(dec!(1.5))));
        bet.bonus = Decimal::ZERO;
        bet.boost = Decimal::ZERO;
        assert_eq!(bet.potential_payout(), dec!(75.0));
        assert_eq!(bet.potential_profit(), dec!(25.0));
    }

    #[test]
    fn test_potential_payout_with_bonus_and_fractional_boost() {
        let mut bet = BetRecord::from_raw(raw(Some(dec!(100)), Some(dec!(2.0))));
        bet.bonus = dec!(20);
        bet.boost = dec!(0.5);
        // base 100, bonus 20, boost 0.5 * 120 = 60
        assert_eq!(bet.potential_profit(), dec!(180.0));
    }

    #[test]
    fn test_potential_payout_with_absolute_boost() {
        let mut bet = BetRecord::from_raw(raw(Some(dec!(100)), Some(dec!(2.0))));
        bet.boost = dec!(15);
        assert_eq!(bet.potential_profit(), dec!(115.0));
    }

    #[test]
    fn test_return_pct_guards_zero_stake() {
        let mut bet = BetRecord::from_raw(raw(None, None));
        bet.settled = Some(dec!(10));
        assert_eq!(bet.return_pct(), 0.0);
    }

    #[test]
    fn test_new_bet_validation() {
        let bet = NewBet {
            category: "futebol".to_string(),
            bet_type: BetType::Single,
            bookmaker: "bet365".to_string(),
            event: None,
            stake: dec!(100),
            odds: dec!(1.80),
            bonus: Decimal::ZERO,
            boost: Decimal::ZERO,
            placed_on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        assert!(bet.validate().is_ok());

        let mut bad = bet.clone();
        bad.stake = Decimal::ZERO;
        assert!(bad.validate().is_err());

        let mut bad = bet.clone();
        bad.odds = dec!(1.0);
        assert!(bad.validate().is_err());
    }
}
