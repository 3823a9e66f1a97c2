use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wager_models::BetRecord;

/// Per-bet returns in percent (settlement over stake), the shared series
/// consumed by both the risk and the ratio engines.
pub fn return_series(resolved: &[&BetRecord]) -> Vec<f64> {
    resolved.iter().map(|b| b.return_pct()).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation about the series' own mean.
pub fn population_std_dev(values: &[f64]) -> f64 {
    deviation_about(values, mean(values))
}

/// Root mean squared deviation of `values` about an external center.
pub fn deviation_about(values: &[f64], center: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// num/den as a percentage, 0 when the denominator is not positive.
pub fn ratio_pct(num: Decimal, den: Decimal) -> f64 {
    if den > Decimal::ZERO {
        (num / den).to_f64().unwrap_or(0.0) * 100.0
    } else {
        0.0
    }
}

/// Plain guarded division.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den != 0.0 {
        num / den
    } else {
        0.0
    }
}
