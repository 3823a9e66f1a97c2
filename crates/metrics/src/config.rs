use serde::{Deserialize, Serialize};

/// Tunable thresholds for the derivation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Lower edges of the odds buckets, ascending. The last edge opens an
    /// unbounded range.
    pub bucket_edges: Vec<f64>,
    /// Minimum resolved bets a bucket needs to qualify for sweet-spot
    /// selection.
    pub min_bucket_sample: usize,
    /// Ceiling on the reported Kelly percentage.
    pub kelly_cap: f64,
    /// Window length, in days, for the period-over-period staked variation
    /// when the bet set carries no dates.
    pub variation_fallback_days: i64,
    /// Per-bet return, in percent, above which a won bet counts as a value
    /// bet.
    pub value_bet_threshold: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            bucket_edges: vec![1.0, 1.5, 2.0, 3.0, 5.0],
            min_bucket_sample: 5,
            kelly_cap: 25.0,
            variation_fallback_days: 30,
            value_bet_threshold: 10.0,
        }
    }
}
