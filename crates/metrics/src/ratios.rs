use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use wager_models::{BetOutcome, BetRecord};

use crate::buckets;
use crate::classify::{chronological, partition};
use crate::config::MetricsConfig;
use crate::returns::{deviation_about, mean, population_std_dev, ratio_pct, return_series, safe_div};
use crate::risk::drawdown;
use crate::temporal::MonthRoi;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// ROI over the selected set, net profit over total staked.
    pub yield_pct: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    /// Wins over losses; equals the win count when there are no losses.
    pub win_loss_ratio: f64,
    pub precision: f64,
    /// Defined identically to precision. The duplication is inherited
    /// behavior, kept under an honest name instead of being silently
    /// replaced with a real classifier recall.
    pub naive_recall: f64,
    pub f1: f64,
    /// Share of active months that closed with positive profit.
    pub monthly_consistency: f64,
    pub best_month: Option<MonthRoi>,
    pub worst_month: Option<MonthRoi>,
    pub current_month_roi: f64,
    /// Win share of resolved bets with odds above 2.0.
    pub high_odds_strike_rate: f64,
    pub bets_per_month: f64,
    /// Mean staked volume of the profitable months.
    pub ideal_volume: Decimal,
    /// ROI of the sweet-spot odds bucket, 0 when no bucket qualifies.
    pub projected_roi: f64,
}

pub fn compute(bets: &[BetRecord], as_of: NaiveDate, config: &MetricsConfig) -> PerformanceMetrics {
    let classified = partition(bets);
    let resolved = &classified.resolved;

    let total_staked: Decimal = bets.iter().map(|b| b.stake).sum();
    let net_profit: Decimal = resolved.iter().map(|b| b.settled_value()).sum();
    let yield_pct = ratio_pct(net_profit, total_staked);

    let returns = return_series(resolved);
    let mean_return = mean(&returns);
    let std_dev = population_std_dev(&returns);
    let sharpe = safe_div(mean_return, std_dev);

    let negative: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside = deviation_about(&negative, mean_return);
    let sortino = safe_div(mean_return, downside);

    let (max_drawdown, _) = drawdown(&chronological(resolved));
    let calmar = safe_div(yield_pct, max_drawdown);

    let wins = classified.wins();
    let losses = classified.losses();
    let win_loss_ratio = if losses > 0 {
        wins as f64 / losses as f64
    } else {
        wins as f64
    };
    let precision = safe_div(wins as f64 * 100.0, (wins + losses) as f64);
    let naive_recall = precision;
    let f1 = if precision + naive_recall > 0.0 {
        2.0 * precision * naive_recall / (precision + naive_recall)
    } else {
        0.0
    };

    // per-month staked/profit, resolved and dated bets only
    let mut by_month: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for bet in resolved {
        if let Some(date) = bet.placed_on {
            let cell = by_month
                .entry(format!("{:04}-{:02}", date.year(), date.month()))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            cell.0 += bet.stake;
            cell.1 += bet.settled_value();
        }
    }

    let profitable: Vec<&(Decimal, Decimal)> = by_month
        .values()
        .filter(|(_, profit)| *profit > Decimal::ZERO)
        .collect();
    let monthly_consistency =
        safe_div(profitable.len() as f64 * 100.0, by_month.len() as f64);

    let mut best_month: Option<MonthRoi> = None;
    let mut worst_month: Option<MonthRoi> = None;
    for (month, &(staked, profit)) in &by_month {
        let roi = ratio_pct(profit, staked);
        if best_month.as_ref().map_or(true, |best| roi > best.roi) {
            best_month = Some(MonthRoi {
                month: month.clone(),
                roi,
            });
        }
        if worst_month.as_ref().map_or(true, |worst| roi < worst.roi) {
            worst_month = Some(MonthRoi {
                month: month.clone(),
                roi,
            });
        }
    }

    let current_key = format!("{:04}-{:02}", as_of.year(), as_of.month());
    let current_month_roi = by_month
        .get(&current_key)
        .map(|&(staked, profit)| ratio_pct(profit, staked))
        .unwrap_or(0.0);

    let high_odds: Vec<&&BetRecord> = resolved
        .iter()
        .filter(|b| b.odds > Decimal::from(2))
        .collect();
    let high_odds_wins = high_odds
        .iter()
        .filter(|b| b.outcome == BetOutcome::Won)
        .count();
    let high_odds_strike_rate =
        safe_div(high_odds_wins as f64 * 100.0, high_odds.len() as f64);

    let bets_per_month = safe_div(bets.len() as f64, by_month.len() as f64);

    let ideal_volume = if profitable.is_empty() {
        total_staked / Decimal::from(by_month.len().max(1) as u64)
    } else {
        profitable.iter().map(|(staked, _)| *staked).sum::<Decimal>()
            / Decimal::from(profitable.len() as u64)
    };

    let projected_roi = buckets::compute(resolved, config)
        .sweet_spot
        .map(|spot| spot.roi)
        .unwrap_or(0.0);

    PerformanceMetrics {
        yield_pct,
        sharpe,
        sortino,
        calmar,
        win_loss_ratio,
        precision,
        naive_recall,
        f1,
        monthly_consistency,
        best_month,
        worst_month,
        current_month_roi,
        high_odds_strike_rate,
        bets_per_month,
        ideal_volume,
        projected_roi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bet;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        "2025-02-15".parse().unwrap()
    }

    #[test]
    fn test_precision_recall_f1_are_identical_by_construction() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-01")),
            bet(2, "won", 100.0, 2.0, 100.0, Some("2025-01-02")),
            bet(3, "lost", 100.0, 2.0, -100.0, Some("2025-01-03")),
            bet(4, "void", 100.0, 2.0, 0.0, Some("2025-01-04")),
        ];
        let metrics = compute(&bets, as_of(), &MetricsConfig::default());
        // voids are excluded from the precision denominator
        assert!((metrics.precision - 66.66666666666667).abs() < 1e-9);
        assert_eq!(metrics.precision, metrics.naive_recall);
        assert!((metrics.f1 - metrics.precision).abs() < 1e-9);
    }

    #[test]
    fn test_win_loss_ratio_with_no_losses() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-01")),
            bet(2, "won", 100.0, 2.0, 100.0, Some("2025-01-02")),
        ];
        let metrics = compute(&bets, as_of(), &MetricsConfig::default());
        assert_eq!(metrics.win_loss_ratio, 2.0);
    }

    #[test]
    fn test_sharpe_zero_on_flat_returns() {
        let bets = vec![
            bet(1, "won", 100.0, 1.5, 50.0, Some("2025-01-01")),
            bet(2, "won", 100.0, 1.5, 50.0, Some("2025-01-02")),
        ];
        let metrics = compute(&bets, as_of(), &MetricsConfig::default());
        assert_eq!(metrics.sharpe, 0.0);
        assert_eq!(metrics.sortino, 0.0);
    }

    #[test]
    fn test_monthly_consistency_and_best_worst() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-10")),
            bet(2, "lost", 100.0, 2.0, -100.0, Some("2025-02-10")),
            bet(3, "won", 100.0, 2.0, 30.0, Some("2025-02-20")),
            bet(4, "won", 100.0, 2.0, 80.0, Some("2025-03-05")),
        ];
        let metrics = compute(&bets, as_of(), &MetricsConfig::default());
        // January +100, February -70, March +80: two of three profitable
        assert!((metrics.monthly_consistency - 66.66666666666667).abs() < 1e-9);
        assert_eq!(metrics.best_month.unwrap().month, "2025-01");
        assert_eq!(metrics.worst_month.unwrap().month, "2025-02");
        // as_of sits in February
        assert_eq!(metrics.current_month_roi, -35.0);
    }

    #[test]
    fn test_calmar_zero_without_drawdown() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-01")),
            bet(2, "won", 100.0, 2.0, 100.0, Some("2025-01-02")),
        ];
        let metrics = compute(&bets, as_of(), &MetricsConfig::default());
        assert_eq!(metrics.calmar, 0.0);
        assert_eq!(metrics.yield_pct, 100.0);
    }

    #[test]
    fn test_ideal_volume_prefers_profitable_months() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-10")),
            bet(2, "won", 300.0, 2.0, 300.0, Some("2025-02-10")),
            bet(3, "lost", 500.0, 2.0, -500.0, Some("2025-03-10")),
        ];
        let metrics = compute(&bets, as_of(), &MetricsConfig::default());
        assert_eq!(metrics.ideal_volume, dec!(200));
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let metrics = compute(&[], as_of(), &MetricsConfig::default());
        assert_eq!(metrics.yield_pct, 0.0);
        assert_eq!(metrics.sharpe, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert_eq!(metrics.win_loss_ratio, 0.0);
        assert!(metrics.best_month.is_none());
        assert_eq!(metrics.ideal_volume, Decimal::ZERO);
    }
}
