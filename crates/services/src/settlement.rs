use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use wager_models::{BetOutcome, BetRecord, LedgerError, Result};
use wager_store::BetStore;

/// Outcome of settling one bet: the realized net value written to the bet
/// and the amount credited back to the bookie balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub outcome: BetOutcome,
    pub settled: Decimal,
    pub balance_delta: Decimal,
}

/// Decide the settlement for a pending bet. The stake is assumed to have
/// left the bookie balance when the bet was placed, so only returned money
/// shows up in `balance_delta`:
/// - Won: full projected profit realized; stake plus profit comes back.
/// - Lost: the stake is the loss; nothing comes back.
/// - Void: zero result; the stake comes back.
/// - CashedOut: the gross cashout value comes back; the net result is the
///   cashout minus the stake.
pub fn settle(
    bet: &BetRecord,
    outcome: BetOutcome,
    cashout_value: Option<Decimal>,
) -> Result<Settlement> {
    if bet.is_resolved() {
        return Err(LedgerError::InvalidOutcome {
            reason: format!("bet {} is already settled", bet.id),
        });
    }
    match outcome {
        BetOutcome::Pending => Err(LedgerError::InvalidOutcome {
            reason: "cannot settle a bet back to pending".to_string(),
        }),
        BetOutcome::Won => {
            let profit = bet.potential_profit();
            Ok(Settlement {
                outcome,
                settled: profit,
                balance_delta: bet.stake + profit,
            })
        }
        BetOutcome::Lost => Ok(Settlement {
            outcome,
            settled: -bet.stake,
            balance_delta: Decimal::ZERO,
        }),
        BetOutcome::Void => Ok(Settlement {
            outcome,
            settled: Decimal::ZERO,
            balance_delta: bet.stake,
        }),
        BetOutcome::CashedOut => {
            let value = cashout_value.ok_or_else(|| LedgerError::InvalidOutcome {
                reason: "cashout requires a cashout value".to_string(),
            })?;
            if value < Decimal::ZERO {
                return Err(LedgerError::InvalidStake {
                    amount: value.to_string(),
                });
            }
            Ok(Settlement {
                outcome,
                settled: value - bet.stake,
                balance_delta: value,
            })
        }
    }
}

/// Applies settlements through the store: writes the bet result, then moves
/// the bookie balance. The bookmaker reference on a bet is free text; when
/// it does not match a known bookie the balance step is skipped.
pub struct SettlementService {
    store: Arc<BetStore>,
}

impl SettlementService {
    pub fn new(store: Arc<BetStore>) -> Self {
        Self { store }
    }

    pub async fn set_result(
        &self,
        bet_id: i64,
        outcome: BetOutcome,
        cashout_value: Option<Decimal>,
    ) -> Result<BetRecord> {
        let bet = self.store.get_bet(bet_id).await?;
        let settlement = settle(&bet, outcome, cashout_value)?;

        let updated = self
            .store
            .apply_settlement(bet_id, settlement.outcome, settlement.settled)
            .await?;

        if settlement.balance_delta != Decimal::ZERO {
            match self.store.find_bookie_by_name(&bet.bookmaker).await? {
                Some(bookie) => {
                    self.store
                        .add_to_bookie_balance(bookie.id, settlement.balance_delta)
                        .await?;
                }
                None => {
                    warn!(
                        bookmaker = %bet.bookmaker,
                        bet_id,
                        "no bookie matches the bet's bookmaker, balance not adjusted"
                    );
                }
            }
        }

        info!(
            bet_id,
            outcome = outcome.as_str(),
            settled = %settlement.settled,
            "bet settled"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wager_models::RawBet;

    fn pending_bet(stake: Decimal, odds: Decimal) -> BetRecord {
        BetRecord::from_raw(RawBet {
            id: 1,
            bookmaker: Some("bet365".to_string()),
            stake: Some(stake),
            odds: Some(odds),
            ..RawBet::default()
        })
    }

    #[test]
    fn test_won_returns_stake_plus_profit() {
        let bet = pending_bet(dec!(100), dec!(2.5));
        let settlement = settle(&bet, BetOutcome::Won, None).unwrap();
        assert_eq!(settlement.settled, dec!(150.0));
        assert_eq!(settlement.balance_delta, dec!(250.0));
    }

    #[test]
    fn test_won_includes_bonus_and_boost() {
        let mut bet = pending_bet(dec!(100), dec!(2.0));
        bet.bonus = dec!(50);
        bet.boost = dec!(0.2);
        let settlement = settle(&bet, BetOutcome::Won, None).unwrap();
        // base 100 + bonus 50 + boost 30
        assert_eq!(settlement.settled, dec!(180.0));
    }

    #[test]
    fn test_lost_settles_negative_stake() {
        let bet = pending_bet(dec!(100), dec!(2.5));
        let settlement = settle(&bet, BetOutcome::Lost, None).unwrap();
        assert_eq!(settlement.settled, dec!(-100));
        assert_eq!(settlement.balance_delta, Decimal::ZERO);
    }

    #[test]
    fn test_void_returns_stake_with_zero_result() {
        let bet = pending_bet(dec!(100), dec!(2.5));
        let settlement = settle(&bet, BetOutcome::Void, None).unwrap();
        assert_eq!(settlement.settled, Decimal::ZERO);
        assert_eq!(settlement.balance_delta, dec!(100));
    }

    #[test]
    fn test_cashout_is_gross_value_minus_stake() {
        let bet = pending_bet(dec!(100), dec!(2.5));
        let settlement = settle(&bet, BetOutcome::CashedOut, Some(dec!(140))).unwrap();
        assert_eq!(settlement.settled, dec!(40));
        assert_eq!(settlement.balance_delta, dec!(140));
    }

    #[test]
    fn test_cashout_requires_value() {
        let bet = pending_bet(dec!(100), dec!(2.5));
        assert!(settle(&bet, BetOutcome::CashedOut, None).is_err());
        assert!(settle(&bet, BetOutcome::CashedOut, Some(dec!(-5))).is_err());
    }

    #[test]
    fn test_already_settled_is_rejected() {
        let mut bet = pending_bet(dec!(100), dec!(2.5));
        bet.outcome = BetOutcome::Won;
        assert!(settle(&bet, BetOutcome::Lost, None).is_err());
    }

    #[test]
    fn test_settling_to_pending_is_rejected() {
        let bet = pending_bet(dec!(100), dec!(2.5));
        assert!(settle(&bet, BetOutcome::Pending, None).is_err());
    }
}
