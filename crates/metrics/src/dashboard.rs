use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use wager_models::BetRecord;

use crate::classify::{outcome_counts, partition, OutcomeCounts};
use crate::config::MetricsConfig;
use crate::returns::{ratio_pct, safe_div};
use crate::streaks::{self, StreakSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiStatus {
    Excellent,
    Positive,
    Negative,
}

impl RoiStatus {
    pub fn from_roi(roi: f64) -> Self {
        if roi >= 5.0 {
            RoiStatus::Excellent
        } else if roi >= 0.0 {
            RoiStatus::Positive
        } else {
            RoiStatus::Negative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WinRateStatus {
    Excellent,
    Good,
    Below,
}

impl WinRateStatus {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 60.0 {
            WinRateStatus::Excellent
        } else if rate >= 50.0 {
            WinRateStatus::Good
        } else {
            WinRateStatus::Below
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiggestWin {
    pub bet_id: i64,
    pub amount: Decimal,
}

/// Headline KPIs for the dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_staked: Decimal,
    /// Staked amount change versus the immediately preceding window of
    /// equal length, in percent.
    pub staked_variation: f64,
    pub net_profit: Decimal,
    pub roi: f64,
    pub roi_status: RoiStatus,
    pub win_rate: f64,
    pub win_rate_status: WinRateStatus,
    pub biggest_win: Option<BiggestWin>,
    pub total_bets: usize,
    pub pending_count: usize,
    pub active_days: usize,
    pub bets_per_day: f64,
    pub avg_odds: f64,
    pub highest_odds: f64,
    pub lowest_odds: f64,
    pub streaks: StreakSummary,
    pub outcome_counts: OutcomeCounts,
}

impl DashboardMetrics {
    pub fn compute(bets: &[BetRecord], as_of: NaiveDate, config: &MetricsConfig) -> Self {
        let classified = partition(bets);

        let total_staked: Decimal = bets.iter().map(|b| b.stake).sum();
        let net_profit: Decimal = classified.resolved.iter().map(|b| b.settled_value()).sum();
        let roi = ratio_pct(net_profit, total_staked);
        let win_rate = classified.win_rate();

        let mut biggest_win: Option<BiggestWin> = None;
        for b in &classified.resolved {
            let amount = b.settled_value();
            if amount > Decimal::ZERO && biggest_win.map_or(true, |w| amount > w.amount) {
                biggest_win = Some(BiggestWin { bet_id: b.id, amount });
            }
        }

        let active_days: BTreeSet<NaiveDate> =
            bets.iter().filter_map(|b| b.placed_on).collect();
        let bets_per_day = safe_div(bets.len() as f64, active_days.len() as f64);

        let odds: Vec<f64> = bets
            .iter()
            .filter(|b| b.odds > Decimal::ZERO)
            .filter_map(|b| b.odds.to_f64())
            .collect();
        let avg_odds = safe_div(odds.iter().sum::<f64>(), odds.len() as f64);
        let highest_odds = odds.iter().copied().fold(0.0, f64::max);
        let lowest_odds = if odds.is_empty() {
            0.0
        } else {
            odds.iter().copied().fold(f64::INFINITY, f64::min)
        };

        Self {
            total_staked,
            staked_variation: staked_variation(bets, total_staked, as_of, config),
            net_profit,
            roi,
            roi_status: RoiStatus::from_roi(roi),
            win_rate,
            win_rate_status: WinRateStatus::from_rate(win_rate),
            biggest_win,
            total_bets: bets.len(),
            pending_count: classified.pending.len(),
            active_days: active_days.len(),
            bets_per_day,
            avg_odds,
            highest_odds,
            lowest_odds,
            streaks: streaks::compute(&classified.resolved),
            outcome_counts: outcome_counts(bets),
        }
    }
}

/// Compare the staked total against the preceding window of equal length.
/// The window runs from the earliest dated bet to `as_of`; with no dated
/// bets the configured fallback length is used.
fn staked_variation(
    bets: &[BetRecord],
    current_staked: Decimal,
    as_of: NaiveDate,
    config: &MetricsConfig,
) -> f64 {
    let span_days = bets
        .iter()
        .filter_map(|b| b.placed_on)
        .min()
        .map(|earliest| (as_of - earliest).num_days().max(0))
        .unwrap_or(config.variation_fallback_days);

    let window_end = as_of - Duration::days(span_days);
    let window_start = as_of - Duration::days(span_days * 2);

    let previous_staked: Decimal = bets
        .iter()
        .filter(|b| match b.placed_on {
            Some(date) => date > window_start && date <= window_end,
            None => false,
        })
        .map(|b| b.stake)
        .sum();

    if previous_staked > Decimal::ZERO {
        ((current_staked - previous_staked) / previous_staked)
            .to_f64()
            .unwrap_or(0.0)
            * 100.0
    } else {
        0.0
    }
}
