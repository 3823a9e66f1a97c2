use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bankroll account at a bookmaker. The balance is mutated only by
/// deposits, withdrawals and bet settlement through the store; the metrics
/// layer reads it as context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookie {
    pub id: i64,
    pub name: String,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
    pub last_deposit_at: Option<DateTime<Utc>>,
    pub last_withdraw_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookie {
    pub name: String,
    #[serde(default)]
    pub balance: Decimal,
}
