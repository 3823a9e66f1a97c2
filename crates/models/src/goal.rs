use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profit targets and the daily loss limit. Singleton per user, upserted in
/// place. The metrics layer consumes it only to derive progress percentages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub daily_target: Decimal,
    pub monthly_target: Decimal,
    pub daily_loss_limit: Decimal,
}

impl Default for Goal {
    fn default() -> Self {
        Self {
            daily_target: Decimal::from(100),
            monthly_target: Decimal::from(2000),
            daily_loss_limit: Decimal::from(200),
        }
    }
}
