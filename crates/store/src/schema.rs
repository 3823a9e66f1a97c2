use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wager_models::{BetRecord, Bookie, Goal, RawBet, Transaction, TransactionKind};

/// Bet row as stored. Every optional column maps to the `RawBet` field of
/// the same name; normalization happens in `wager-models`, not here.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BetRow {
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

impl From<BetRow> for BetRecord {
    fn from(row: BetRow) -> Self {
        BetRecord::from_raw(RawBet {
            id: row.id,
            category: row.category,
            bet_type: row.bet_type,
            bookmaker: row.bookmaker,
            event: row.event,
            stake: row.stake,
            odds: row.odds,
            bonus: row.bonus,
            boost: row.boost,
            outcome: row.outcome,
            settled: row.settled,
            placed_on: row.placed_on,
        })
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookieRow {
    pub id: i64,
    pub name: String,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
    pub last_deposit_at: Option<DateTime<Utc>>,
    pub last_withdraw_at: Option<DateTime<Utc>>,
}

impl From<BookieRow> for Bookie {
    fn from(row: BookieRow) -> Self {
        Bookie {
            id: row.id,
            name: row.name,
            balance: row.balance,
            updated_at: row.updated_at,
            last_deposit_at: row.last_deposit_at,
            last_withdraw_at: row.last_withdraw_at,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub bookie_id: i64,
    pub amount: Decimal,
    pub kind: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            bookie_id: row.bookie_id,
            amount: row.amount,
            kind: TransactionKind::parse(&row.kind),
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GoalRow {
    pub daily_target: Decimal,
    pub monthly_target: Decimal,
    pub daily_loss_limit: Decimal,
}

impl From<GoalRow> for Goal {
    fn from(row: GoalRow) -> Self {
        Goal {
            daily_target: row.daily_target,
            monthly_target: row.monthly_target,
            daily_loss_limit: row.daily_loss_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wager_models::{BetOutcome, BetType};

    #[test]
    fn test_bet_row_normalization() {
        let row = BetRow {
            id: 7,
            category: Some("futebol, nba".to_string()),
            bet_type: Some("combo".to_string()),
            bookmaker: None,
            event: None,
            stake: Some(dec!(25)),
            odds: None,
            bonus: None,
            boost: None,
            outcome: Some("won".to_string()),
            settled: Some(dec!(12.5)),
            placed_on: None,
        };
        let bet = BetRecord::from(row);
        assert_eq!(bet.id, 7);
        assert_eq!(bet.tags, vec!["futebol", "nba"]);
        assert_eq!(bet.bet_type, BetType::Combo);
        assert_eq!(bet.outcome, BetOutcome::Won);
        assert_eq!(bet.odds, Decimal::ZERO);
        assert_eq!(bet.bookmaker, "");
    }

    #[test]
    fn test_transaction_kind_round_trip() {
        let row = TransactionRow {
            id: 1,
            bookie_id: 2,
            amount: dec!(100),
            kind: "withdraw".to_string(),
            description: String::new(),
            created_at: Utc::now(),
        };
        let tx = Transaction::from(row);
        assert_eq!(tx.kind, TransactionKind::Withdraw);
    }
}
