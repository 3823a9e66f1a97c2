use rust_decimal::Decimal;
use wager_models::{BetRecord, RawBet};

/// Shorthand bet builder for the unit tests in this crate.
pub fn bet(
    id: i64,
    outcome: &str,
    stake: f64,
    odds: f64,
    settled: f64,
    date: Option<&str>,
) -> BetRecord {
    BetRecord::from_raw(RawBet {
        id,
        category: Some("football".to_string()),
        bet_type: Some("single".to_string()),
        bookmaker: Some("bet365".to_string()),
        event: None,
        stake: Decimal::from_f64_retain(stake),
        odds: Decimal::from_f64_retain(odds),
        bonus: None,
        boost: None,
        outcome: Some(outcome.to_string()),
        settled: if outcome == "pending" {
            None
        } else {
            Decimal::from_f64_retain(settled)
        },
        placed_on: date.map(|d| d.parse().expect("valid test date")),
    })
}
