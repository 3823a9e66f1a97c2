use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use wager_models::BetRecord;

use crate::classify::partition;
use crate::returns::ratio_pct;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayProfit {
    pub weekday: String,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRoi {
    /// Stable locale-independent key, `YYYY-MM`.
    pub month: String,
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCell {
    pub year: i32,
    pub month: u32,
    pub roi: f64,
    pub profit: Decimal,
}

/// Profit at a given hour of day. The bet record carries no time-of-day, so
/// the engine can never produce one of these; the field stays in the shape
/// so the presentation layer renders "not available" instead of a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourProfit {
    pub hour: u8,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalMetrics {
    pub weekday_profit: Vec<WeekdayProfit>,
    pub best_weekday: Option<WeekdayProfit>,
    /// Always `None`: bets are recorded at date granularity only.
    pub best_hour: Option<HourProfit>,
    /// Best monthly ROI among months with positive staked volume.
    pub best_month: Option<MonthRoi>,
    /// Run of consecutive calendar days with at least one bet, counted
    /// backwards from the most recent active day.
    pub consecutive_active_days: u32,
    pub monthly_heatmap: Vec<MonthCell>,
}

pub fn compute(bets: &[BetRecord]) -> TemporalMetrics {
    let classified = partition(bets);

    // profit per weekday, resolved bets only
    let mut by_weekday: BTreeMap<u32, Decimal> = BTreeMap::new();
    for bet in &classified.resolved {
        if let Some(date) = bet.placed_on {
            *by_weekday
                .entry(date.weekday().num_days_from_monday())
                .or_insert(Decimal::ZERO) += bet.settled_value();
        }
    }
    let weekday_profit: Vec<WeekdayProfit> = by_weekday
        .iter()
        .map(|(&index, &profit)| WeekdayProfit {
            weekday: weekday_name(index),
            profit,
        })
        .collect();
    let mut best_weekday: Option<&WeekdayProfit> = None;
    for entry in &weekday_profit {
        if best_weekday.map_or(true, |best| entry.profit > best.profit) {
            best_weekday = Some(entry);
        }
    }

    // staked/profit per month, resolved bets only
    let mut by_month: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
    for bet in &classified.resolved {
        if let Some(date) = bet.placed_on {
            let cell = by_month
                .entry((date.year(), date.month()))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            cell.0 += bet.stake;
            cell.1 += bet.settled_value();
        }
    }
    let monthly_heatmap: Vec<MonthCell> = by_month
        .iter()
        .map(|(&(year, month), &(staked, profit))| MonthCell {
            year,
            month,
            roi: ratio_pct(profit, staked),
            profit,
        })
        .collect();
    let mut best_month: Option<MonthRoi> = None;
    for (&(year, month), &(staked, profit)) in &by_month {
        if staked <= Decimal::ZERO {
            continue;
        }
        let roi = ratio_pct(profit, staked);
        if best_month.as_ref().map_or(true, |best| roi > best.roi) {
            best_month = Some(MonthRoi {
                month: format!("{year:04}-{month:02}"),
                roi,
            });
        }
    }

    TemporalMetrics {
        best_weekday: best_weekday.cloned(),
        weekday_profit,
        best_hour: None,
        best_month,
        consecutive_active_days: consecutive_active_days(bets),
        monthly_heatmap,
    }
}

/// Distinct bet dates sorted descending; count while the gap between
/// adjacent days is exactly one, stopping at the first larger gap.
fn consecutive_active_days(bets: &[BetRecord]) -> u32 {
    let dates: BTreeSet<NaiveDate> = bets.iter().filter_map(|b| b.placed_on).collect();
    if dates.is_empty() {
        return 0;
    }
    let mut streak = 1;
    let mut iter = dates.iter().rev();
    let mut current = *iter.next().expect("non-empty date set");
    for &previous in iter {
        if (current - previous).num_days() == 1 {
            streak += 1;
            current = previous;
        } else {
            break;
        }
    }
    streak
}

fn weekday_name(days_from_monday: u32) -> String {
    let name = match days_from_monday {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bet;
    use rust_decimal_macros::dec;

    #[test]
    fn test_best_weekday() {
        // 2025-01-06 is a Monday, 2025-01-07 a Tuesday
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-06")),
            bet(2, "lost", 100.0, 2.0, -100.0, Some("2025-01-07")),
            bet(3, "won", 100.0, 2.0, 50.0, Some("2025-01-13")),
        ];
        let metrics = compute(&bets);
        let best = metrics.best_weekday.unwrap();
        assert_eq!(best.weekday, "Monday");
        assert_eq!(best.profit, dec!(150.0));
    }

    #[test]
    fn test_best_hour_is_always_absent() {
        let bets = vec![bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-06"))];
        assert!(compute(&bets).best_hour.is_none());
        assert!(compute(&[]).best_hour.is_none());
    }

    #[test]
    fn test_best_month_requires_positive_staked() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-10")),
            bet(2, "lost", 100.0, 2.0, -100.0, Some("2025-02-10")),
            bet(3, "won", 100.0, 2.0, 40.0, Some("2025-02-11")),
        ];
        let metrics = compute(&bets);
        // January: +100 on 100 staked (100%); February: -60 on 200 staked
        assert_eq!(metrics.best_month.unwrap().month, "2025-01");
    }

    #[test]
    fn test_monthly_heatmap_cells() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-10")),
            bet(2, "lost", 50.0, 2.0, -50.0, Some("2025-02-10")),
        ];
        let metrics = compute(&bets);
        assert_eq!(metrics.monthly_heatmap.len(), 2);
        assert_eq!(metrics.monthly_heatmap[0].year, 2025);
        assert_eq!(metrics.monthly_heatmap[0].month, 1);
        assert_eq!(metrics.monthly_heatmap[0].roi, 100.0);
        assert_eq!(metrics.monthly_heatmap[1].profit, dec!(-50.0));
    }

    #[test]
    fn test_consecutive_days_stop_at_gap() {
        let bets = vec![
            bet(1, "won", 10.0, 2.0, 10.0, Some("2025-03-10")),
            bet(2, "lost", 10.0, 2.0, -10.0, Some("2025-03-09")),
            bet(3, "pending", 10.0, 2.0, 0.0, Some("2025-03-08")),
            // gap: 03-07 missing
            bet(4, "won", 10.0, 2.0, 10.0, Some("2025-03-06")),
        ];
        assert_eq!(compute(&bets).consecutive_active_days, 3);
    }

    #[test]
    fn test_consecutive_days_single_day_and_empty() {
        let one = vec![bet(1, "won", 10.0, 2.0, 10.0, Some("2025-03-10"))];
        assert_eq!(compute(&one).consecutive_active_days, 1);
        assert_eq!(compute(&[]).consecutive_active_days, 0);
    }

    #[test]
    fn test_undated_bets_are_excluded() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, None),
            bet(2, "won", 100.0, 2.0, 100.0, Some("2025-01-06")),
        ];
        let metrics = compute(&bets);
        assert_eq!(metrics.monthly_heatmap.len(), 1);
        assert_eq!(metrics.consecutive_active_days, 1);
    }
}
