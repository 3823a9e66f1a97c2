use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wager_models::{BetRecord, Goal};

/// Progress against the configured profit targets and loss limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub daily_profit: Decimal,
    pub daily_target: Decimal,
    /// Percent of the daily target reached, clamped to [0, 100].
    pub daily_progress: f64,
    pub daily_achieved: bool,
    pub monthly_profit: Decimal,
    pub monthly_target: Decimal,
    pub monthly_progress: f64,
    pub monthly_achieved: bool,
    pub loss_limit: Decimal,
    /// Percent of the daily loss limit consumed, 0 when the day is positive.
    pub loss_limit_used: f64,
    pub loss_limit_exceeded: bool,
}

pub fn compute(goal: &Goal, daily_profit: Decimal, monthly_profit: Decimal) -> GoalProgress {
    let daily_progress = progress_pct(daily_profit, goal.daily_target);
    let monthly_progress = progress_pct(monthly_profit, goal.monthly_target);

    let (loss_limit_used, loss_limit_exceeded) = if daily_profit < Decimal::ZERO {
        let loss = -daily_profit;
        (
            progress_pct(loss, goal.daily_loss_limit),
            loss >= goal.daily_loss_limit && goal.daily_loss_limit > Decimal::ZERO,
        )
    } else {
        (0.0, false)
    };

    GoalProgress {
        daily_profit,
        daily_target: goal.daily_target,
        daily_progress,
        daily_achieved: goal.daily_target > Decimal::ZERO && daily_profit >= goal.daily_target,
        monthly_profit,
        monthly_target: goal.monthly_target,
        monthly_progress,
        monthly_achieved: goal.monthly_target > Decimal::ZERO
            && monthly_profit >= goal.monthly_target,
        loss_limit: goal.daily_loss_limit,
        loss_limit_used,
        loss_limit_exceeded,
    }
}

/// Realized profit of resolved bets placed on the given day.
pub fn profit_on(bets: &[BetRecord], date: NaiveDate) -> Decimal {
    bets.iter()
        .filter(|b| b.is_resolved() && b.placed_on == Some(date))
        .map(|b| b.settled_value())
        .sum()
}

/// Realized profit of resolved bets placed in the month containing `date`.
pub fn profit_in_month(bets: &[BetRecord], date: NaiveDate) -> Decimal {
    bets.iter()
        .filter(|b| {
            b.is_resolved()
                && b.placed_on
                    .map_or(false, |d| d.year() == date.year() && d.month() == date.month())
        })
        .map(|b| b.settled_value())
        .sum()
}

fn progress_pct(value: Decimal, target: Decimal) -> f64 {
    if target > Decimal::ZERO {
        ((value / target).to_f64().unwrap_or(0.0) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}
