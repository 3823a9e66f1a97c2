use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wager_models::{BetOutcome, BetRecord};

use crate::classify::chronological;
use crate::config::MetricsConfig;
use crate::returns::{mean, population_std_dev, return_series, safe_div};

/// One point of the drawdown chart. Drawdowns are stored as negative
/// percentages so the series plots below the zero line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// Largest peak-to-trough decline of cumulative profit, in percent.
    pub max_drawdown: f64,
    pub drawdown_series: Vec<DrawdownPoint>,
    /// Population standard deviation of per-bet returns.
    pub volatility: f64,
    /// Empirical 5th-percentile per-bet return.
    pub value_at_risk: f64,
    /// Mean of the returns below the VaR cutoff.
    pub expected_shortfall: f64,
    /// Longest drawdown episode, in days, from first underwater bet to the
    /// bet that restores the peak.
    pub recovery_days: i64,
    /// Kelly stake suggestion, clamped to the configured ceiling.
    pub kelly_pct: f64,
    /// Weighted blend of drawdown, volatility and miss rate in [0, 100];
    /// lower is better.
    pub risk_score: f64,
    pub risk_adjusted_return: f64,
}

pub fn compute(resolved: &[&BetRecord], config: &MetricsConfig) -> RiskMetrics {
    let ordered = chronological(resolved);

    let (max_drawdown, drawdown_series) = drawdown(&ordered);
    let recovery_days = longest_recovery(&ordered);

    let returns = return_series(resolved);
    let mean_return = mean(&returns);
    let volatility = population_std_dev(&returns);

    let (value_at_risk, expected_shortfall) = tail_risk(&returns);

    let win_rate = if resolved.is_empty() {
        0.0
    } else {
        resolved
            .iter()
            .filter(|b| b.outcome == BetOutcome::Won)
            .count() as f64
            / resolved.len() as f64
            * 100.0
    };

    let risk_score = (0.4 * max_drawdown + 0.4 * volatility + 0.2 * (100.0 - win_rate))
        .clamp(0.0, 100.0);

    let sharpe = safe_div(mean_return, volatility);

    RiskMetrics {
        max_drawdown,
        drawdown_series,
        volatility,
        value_at_risk,
        expected_shortfall,
        recovery_days,
        kelly_pct: kelly_pct(resolved, config.kelly_cap),
        risk_score,
        risk_adjusted_return: sharpe * 100.0,
    }
}

/// Running peak-to-trough decline over the date-ordered history. The peak
/// never decreases, so every drawdown is non-negative before negation.
pub(crate) fn drawdown(ordered: &[&BetRecord]) -> (f64, Vec<DrawdownPoint>) {
    let mut cumulative = 0.0;
    let mut peak = 0.0;
    let mut max_drawdown = 0.0;
    let mut series = Vec::with_capacity(ordered.len());

    for bet in ordered {
        cumulative += bet.settled_value().to_f64().unwrap_or(0.0);
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = if peak > 0.0 {
            (peak - cumulative) / peak * 100.0
        } else {
            0.0
        };
        if dd > max_drawdown {
            max_drawdown = dd;
        }
        if let Some(date) = bet.placed_on {
            series.push(DrawdownPoint {
                date,
                drawdown: -dd,
            });
        }
    }
    (max_drawdown, series)
}

/// Longest span in days from the first bet of a drawdown episode to the bet
/// at which cumulative profit returns to (or exceeds) the prior peak.
fn longest_recovery(ordered: &[&BetRecord]) -> i64 {
    let mut cumulative = 0.0;
    let mut peak = 0.0;
    let mut episode_start: Option<NaiveDate> = None;
    let mut longest = 0i64;

    for bet in ordered {
        cumulative += bet.settled_value().to_f64().unwrap_or(0.0);
        if cumulative < peak {
            if episode_start.is_none() {
                episode_start = bet.placed_on;
            }
        } else {
            if let (Some(start), Some(end)) = (episode_start, bet.placed_on) {
                longest = longest.max((end - start).num_days());
            }
            episode_start = None;
            peak = cumulative;
        }
    }
    longest
}

/// Empirical VaR(95) and expected shortfall over the return series.
fn tail_risk(returns: &[f64]) -> (f64, f64) {
    if returns.is_empty() {
        return (0.0, 0.0);
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite returns"));
    let cutoff = (sorted.len() as f64 * 0.05).floor() as usize;
    let value_at_risk = sorted.get(cutoff).copied().unwrap_or(0.0);
    let shortfall = if cutoff > 0 {
        sorted[..cutoff].iter().sum::<f64>() / cutoff as f64
    } else {
        0.0
    };
    (value_at_risk, shortfall)
}

/// Kelly fraction from the observed win probability and the average winning
/// odds, clamped into [0, cap].
fn kelly_pct(resolved: &[&BetRecord], cap: f64) -> f64 {
    if resolved.is_empty() {
        return 0.0;
    }
    let winners: Vec<f64> = resolved
        .iter()
        .filter(|b| b.outcome == BetOutcome::Won && b.odds > Decimal::ZERO)
        .filter_map(|b| b.odds.to_f64())
        .collect();
    let p = resolved
        .iter()
        .filter(|b| b.outcome == BetOutcome::Won)
        .count() as f64
        / resolved.len() as f64;
    let b = safe_div(winners.iter().sum::<f64>(), winners.len() as f64) - 1.0;
    if b > 0.0 {
        (((p * b - (1.0 - p)) / b) * 100.0).clamp(0.0, cap)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bet;

    fn config() -> MetricsConfig {
        MetricsConfig::default()
    }

    #[test]
    fn test_drawdown_peak_never_decreases() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-01")),
            bet(2, "lost", 100.0, 2.0, -50.0, Some("2025-01-02")),
            bet(3, "won", 100.0, 2.0, 30.0, Some("2025-01-03")),
            bet(4, "lost", 100.0, 2.0, -60.0, Some("2025-01-04")),
        ];
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &config());

        // cumulative: 100, 50, 80, 20; peak stays 100
        assert_eq!(metrics.max_drawdown, 80.0);
        assert_eq!(metrics.drawdown_series.len(), 4);
        assert!(metrics.drawdown_series.iter().all(|p| p.drawdown <= 0.0));
        assert_eq!(metrics.drawdown_series[0].drawdown, 0.0);
        assert_eq!(metrics.drawdown_series[1].drawdown, -50.0);
    }

    #[test]
    fn test_drawdown_zero_before_any_peak() {
        let bets = vec![
            bet(1, "lost", 100.0, 2.0, -100.0, Some("2025-01-01")),
            bet(2, "lost", 100.0, 2.0, -100.0, Some("2025-01-02")),
        ];
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &config());
        // peak never rises above zero, so the percentage stays undefined-as-zero
        assert_eq!(metrics.max_drawdown, 0.0);
    }

    #[test]
    fn test_recovery_days() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-01")),
            bet(2, "lost", 100.0, 2.0, -50.0, Some("2025-01-03")),
            bet(3, "won", 100.0, 2.0, 80.0, Some("2025-01-10")),
        ];
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &config());
        // underwater from Jan 3, recovered Jan 10
        assert_eq!(metrics.recovery_days, 7);
    }

    #[test]
    fn test_unrecovered_drawdown_counts_zero() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-01")),
            bet(2, "lost", 100.0, 2.0, -90.0, Some("2025-01-02")),
        ];
        let refs: Vec<_> = bets.iter().collect();
        assert_eq!(compute(&refs, &config()).recovery_days, 0);
    }

    #[test]
    fn test_volatility_of_symmetric_returns() {
        let bets = vec![
            bet(1, "won", 100.0, 2.0, 100.0, Some("2025-01-01")),
            bet(2, "lost", 100.0, 2.0, -100.0, Some("2025-01-02")),
        ];
        let refs: Vec<_> = bets.iter().collect();
        assert_eq!(compute(&refs, &config()).volatility, 100.0);
    }

    #[test]
    fn test_var_and_shortfall() {
        // twenty returns: one disastrous, the rest mildly positive
        let mut bets = vec![bet(0, "lost", 100.0, 2.0, -100.0, Some("2025-01-01"))];
        for id in 1..20 {
            bets.push(bet(id, "won", 100.0, 1.1, 10.0, Some("2025-01-02")));
        }
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &config());
        // cutoff = floor(20 * 0.05) = 1; VaR is the second-worst return
        assert_eq!(metrics.value_at_risk, 10.0);
        assert_eq!(metrics.expected_shortfall, -100.0);
    }

    #[test]
    fn test_kelly_is_clamped() {
        // overwhelming favorite at huge odds: raw Kelly far above the cap
        let mut bets = Vec::new();
        for id in 0..99 {
            bets.push(bet(id, "won", 100.0, 51.0, 5000.0, Some("2025-01-01")));
        }
        bets.push(bet(99, "lost", 100.0, 51.0, -100.0, Some("2025-01-02")));
        let refs: Vec<_> = bets.iter().collect();
        let kelly = compute(&refs, &config()).kelly_pct;
        assert!(kelly <= 25.0);
        assert!(kelly >= 0.0);
    }

    #[test]
    fn test_kelly_zero_without_winners() {
        let bets = vec![bet(1, "lost", 100.0, 2.0, -100.0, Some("2025-01-01"))];
        let refs: Vec<_> = bets.iter().collect();
        assert_eq!(compute(&refs, &config()).kelly_pct, 0.0);
    }

    #[test]
    fn test_all_void_set_is_inert() {
        let bets = vec![
            bet(1, "void", 100.0, 2.0, 0.0, Some("2025-01-01")),
            bet(2, "void", 100.0, 2.0, 0.0, Some("2025-01-02")),
        ];
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &config());
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.volatility, 0.0);
        assert_eq!(metrics.kelly_pct, 0.0);
        assert_eq!(metrics.risk_score, 20.0); // only the miss-rate term
    }

    #[test]
    fn test_empty_input() {
        let metrics = compute(&[], &config());
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.value_at_risk, 0.0);
        assert_eq!(metrics.risk_score, 20.0);
        assert!(metrics.drawdown_series.is_empty());
    }
}
