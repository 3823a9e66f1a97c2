use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wager_models::{BetOutcome, BetRecord};

use crate::config::MetricsConfig;
use crate::returns::{ratio_pct, safe_div};

/// One fixed odds range with its aggregates. `upper` is `None` for the open
/// top range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsBucket {
    pub label: String,
    pub lower: f64,
    pub upper: Option<f64>,
    pub count: usize,
    pub wins: usize,
    pub staked: Decimal,
    pub profit: Decimal,
    pub roi: f64,
    pub win_rate: f64,
}

impl OddsBucket {
    fn new(lower: f64, upper: Option<f64>) -> Self {
        let label = match upper {
            Some(upper) => format!("{lower:.2}-{upper:.2}"),
            None => format!("{lower:.2}+"),
        };
        Self {
            label,
            lower,
            upper,
            count: 0,
            wins: 0,
            staked: Decimal::ZERO,
            profit: Decimal::ZERO,
            roi: 0.0,
            win_rate: 0.0,
        }
    }

    fn contains(&self, odds: f64) -> bool {
        odds >= self.lower && self.upper.map_or(true, |upper| odds < upper)
    }
}

/// The best-performing qualified bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweetSpot {
    pub label: String,
    pub roi: f64,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsMetrics {
    pub buckets: Vec<OddsBucket>,
    /// None when no bucket reaches the minimum sample size.
    pub sweet_spot: Option<SweetSpot>,
    /// Share of resolved bets that were won with a per-bet return above the
    /// configured value-bet threshold.
    pub value_bet_rate: f64,
    /// Win share of bets with odds in [1.0, 1.5].
    pub low_odds_strike_rate: f64,
    /// Win share of bets with odds above 3.0.
    pub high_odds_strike_rate: f64,
    pub avg_winning_odds: f64,
}

pub fn compute(resolved: &[&BetRecord], config: &MetricsConfig) -> OddsMetrics {
    let mut buckets: Vec<OddsBucket> = Vec::with_capacity(config.bucket_edges.len());
    for (i, &lower) in config.bucket_edges.iter().enumerate() {
        let upper = config.bucket_edges.get(i + 1).copied();
        buckets.push(OddsBucket::new(lower, upper));
    }

    for bet in resolved {
        let Some(odds) = bet.odds.to_f64() else { continue };
        if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.contains(odds)) {
            bucket.count += 1;
            if bet.outcome == BetOutcome::Won {
                bucket.wins += 1;
            }
            bucket.staked += bet.stake;
            bucket.profit += bet.settled_value();
        }
    }
    for bucket in &mut buckets {
        bucket.roi = ratio_pct(bucket.profit, bucket.staked);
        bucket.win_rate = safe_div(bucket.wins as f64 * 100.0, bucket.count as f64);
    }

    // First bucket reaching the maximum ROI wins ties.
    let mut sweet_spot: Option<&OddsBucket> = None;
    for bucket in &buckets {
        if bucket.count >= config.min_bucket_sample
            && sweet_spot.map_or(true, |best| bucket.roi > best.roi)
        {
            sweet_spot = Some(bucket);
        }
    }

    let value_bets = resolved
        .iter()
        .filter(|b| b.outcome == BetOutcome::Won && b.return_pct() > config.value_bet_threshold)
        .count();

    let low: Vec<&&BetRecord> = resolved
        .iter()
        .filter(|b| b.odds >= Decimal::ONE && b.odds <= Decimal::new(15, 1))
        .collect();
    let high: Vec<&&BetRecord> = resolved
        .iter()
        .filter(|b| b.odds > Decimal::new(3, 0))
        .collect();

    let winning_odds: Vec<f64> = resolved
        .iter()
        .filter(|b| b.outcome == BetOutcome::Won && b.odds > Decimal::ZERO)
        .filter_map(|b| b.odds.to_f64())
        .collect();

    OddsMetrics {
        sweet_spot: sweet_spot.map(|bucket| SweetSpot {
            label: bucket.label.clone(),
            roi: bucket.roi,
            win_rate: bucket.win_rate,
        }),
        value_bet_rate: safe_div(value_bets as f64 * 100.0, resolved.len() as f64),
        low_odds_strike_rate: strike_rate(&low),
        high_odds_strike_rate: strike_rate(&high),
        avg_winning_odds: safe_div(winning_odds.iter().sum::<f64>(), winning_odds.len() as f64),
        buckets,
    }
}

fn strike_rate(bets: &[&&BetRecord]) -> f64 {
    let wins = bets.iter().filter(|b| b.outcome == BetOutcome::Won).count();
    safe_div(wins as f64 * 100.0, bets.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bet;

    #[test]
    fn test_bucket_assignment_and_labels() {
        let bets = vec![
            bet(1, "won", 100.0, 1.2, 20.0, None),
            bet(2, "lost", 100.0, 1.8, -100.0, None),
            bet(3, "won", 100.0, 2.5, 150.0, None),
            bet(4, "won", 100.0, 7.0, 600.0, None),
        ];
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &MetricsConfig::default());

        assert_eq!(metrics.buckets.len(), 5);
        assert_eq!(metrics.buckets[0].label, "1.00-1.50");
        assert_eq!(metrics.buckets[4].label, "5.00+");
        assert_eq!(metrics.buckets[0].count, 1);
        assert_eq!(metrics.buckets[1].count, 1);
        assert_eq!(metrics.buckets[2].count, 1);
        assert_eq!(metrics.buckets[3].count, 0);
        assert_eq!(metrics.buckets[4].count, 1);
    }

    #[test]
    fn test_small_bucket_never_sweet_spot() {
        // three very profitable bets in [2.0, 3.0) stay under the sample
        // threshold; six mediocre bets in [1.5, 2.0) qualify
        let mut bets = vec![
            bet(1, "won", 100.0, 2.5, 150.0, None),
            bet(2, "won", 100.0, 2.5, 150.0, None),
            bet(3, "won", 100.0, 2.5, 150.0, None),
        ];
        for id in 4..10 {
            bets.push(bet(id, if id % 2 == 0 { "won" } else { "lost" }, 100.0, 1.8, if id % 2 == 0 { 80.0 } else { -100.0 }, None));
        }
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &MetricsConfig::default());

        let sweet = metrics.sweet_spot.unwrap();
        assert_eq!(sweet.label, "1.50-2.00");
    }

    #[test]
    fn test_no_qualified_bucket_reports_absent() {
        let bets = vec![
            bet(1, "won", 100.0, 2.5, 150.0, None),
            bet(2, "lost", 100.0, 1.2, -100.0, None),
        ];
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &MetricsConfig::default());
        assert!(metrics.sweet_spot.is_none());
    }

    #[test]
    fn test_tie_breaks_by_encounter_order() {
        let mut bets = Vec::new();
        // two buckets with identical ROI and enough samples each
        for id in 0..5 {
            bets.push(bet(id, "won", 100.0, 1.2, 50.0, None));
        }
        for id in 5..10 {
            bets.push(bet(id, "won", 100.0, 1.8, 50.0, None));
        }
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &MetricsConfig::default());
        assert_eq!(metrics.sweet_spot.unwrap().label, "1.00-1.50");
    }

    #[test]
    fn test_strike_rates_and_winning_odds() {
        let bets = vec![
            bet(1, "won", 100.0, 1.4, 40.0, None),
            bet(2, "lost", 100.0, 1.5, -100.0, None),
            bet(3, "won", 100.0, 4.0, 300.0, None),
            bet(4, "lost", 100.0, 5.0, -100.0, None),
        ];
        let refs: Vec<_> = bets.iter().collect();
        let metrics = compute(&refs, &MetricsConfig::default());

        assert_eq!(metrics.low_odds_strike_rate, 50.0);
        assert_eq!(metrics.high_odds_strike_rate, 50.0);
        assert!((metrics.avg_winning_odds - 2.7).abs() < 1e-9);
        // both wins return more than 10%
        assert_eq!(metrics.value_bet_rate, 50.0);
    }

    #[test]
    fn test_empty_input() {
        let metrics = compute(&[], &MetricsConfig::default());
        assert!(metrics.sweet_spot.is_none());
        assert_eq!(metrics.value_bet_rate, 0.0);
        assert!(metrics.buckets.iter().all(|b| b.count == 0));
    }
}
