use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use wager_models::{
    BetFilter, BetOutcome, BetRecord, Bookie, Goal, LedgerError, NewBet, NewBookie, Result,
    Transaction, TransactionKind,
};

use crate::schema::{BetRow, BookieRow, GoalRow, TransactionRow};

const BET_COLUMNS: &str =
    "id, category, bet_type, bookmaker, event, stake, odds, bonus, boost, outcome, settled, placed_on";

/// Repository over the ledger tables. All mutation of bets, bookies,
/// transactions and goals funnels through here.
pub struct BetStore {
    pool: PgPool,
}

impl BetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- bets ---------------------------------------------------------

    pub async fn list_bets(&self, filter: &BetFilter) -> Result<(Vec<BetRecord>, u64)> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {BET_COLUMNS} FROM bets WHERE 1=1"));
        push_filters(&mut query, filter);
        query.push(" ORDER BY placed_on DESC NULLS LAST, id DESC");

        let rows: Vec<BetRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM bets WHERE 1=1");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        debug!(total, "listed bets");
        Ok((rows.into_iter().map(BetRecord::from).collect(), total as u64))
    }

    pub async fn get_bet(&self, id: i64) -> Result<BetRecord> {
        let row: Option<BetRow> =
            sqlx::query_as(&format!("SELECT {BET_COLUMNS} FROM bets WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(BetRecord::from)
            .ok_or(LedgerError::BetNotFound { id })
    }

    pub async fn create_bet(&self, bet: &NewBet) -> Result<BetRecord> {
        bet.validate()?;
        let row: BetRow = sqlx::query_as(&format!(
            "INSERT INTO bets (category, bet_type, bookmaker, event, stake, odds, bonus, boost, outcome, placed_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9) \
             RETURNING {BET_COLUMNS}"
        ))
        .bind(&bet.category)
        .bind(bet.bet_type.as_str())
        .bind(&bet.bookmaker)
        .bind(&bet.event)
        .bind(bet.stake)
        .bind(bet.odds)
        .bind(bet.bonus)
        .bind(bet.boost)
        .bind(bet.placed_on)
        .fetch_one(&self.pool)
        .await?;
        Ok(BetRecord::from(row))
    }

    pub async fn update_bet(&self, id: i64, bet: &NewBet) -> Result<BetRecord> {
        bet.validate()?;
        let row: Option<BetRow> = sqlx::query_as(&format!(
            "UPDATE bets SET category = $2, bet_type = $3, bookmaker = $4, event = $5, \
             stake = $6, odds = $7, bonus = $8, boost = $9, updated_at = now() \
             WHERE id = $1 RETURNING {BET_COLUMNS}"
        ))
        .bind(id)
        .bind(&bet.category)
        .bind(bet.bet_type.as_str())
        .bind(&bet.bookmaker)
        .bind(&bet.event)
        .bind(bet.stake)
        .bind(bet.odds)
        .bind(bet.bonus)
        .bind(bet.boost)
        .fetch_optional(&self.pool)
        .await?;
        row.map(BetRecord::from)
            .ok_or(LedgerError::BetNotFound { id })
    }

    pub async fn delete_bet(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM bets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::BetNotFound { id });
        }
        Ok(())
    }

    /// Write a settlement decided by the settlement service. The outcome and
    /// realized value land together so a bet is never half-settled.
    pub async fn apply_settlement(
        &self,
        id: i64,
        outcome: BetOutcome,
        settled: Decimal,
    ) -> Result<BetRecord> {
        let row: Option<BetRow> = sqlx::query_as(&format!(
            "UPDATE bets SET outcome = $2, settled = $3, updated_at = now() \
             WHERE id = $1 RETURNING {BET_COLUMNS}"
        ))
        .bind(id)
        .bind(outcome.as_str())
        .bind(settled)
        .fetch_optional(&self.pool)
        .await?;
        row.map(BetRecord::from)
            .ok_or(LedgerError::BetNotFound { id })
    }

    // --- bookies ------------------------------------------------------

    pub async fn list_bookies(&self) -> Result<Vec<Bookie>> {
        let rows: Vec<BookieRow> = sqlx::query_as(
            "SELECT id, name, balance, updated_at, last_deposit_at, last_withdraw_at \
             FROM bookies ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Bookie::from).collect())
    }

    pub async fn create_bookie(&self, bookie: &NewBookie) -> Result<Bookie> {
        let row: BookieRow = sqlx::query_as(
            "INSERT INTO bookies (name, balance) VALUES ($1, $2) \
             RETURNING id, name, balance, updated_at, last_deposit_at, last_withdraw_at",
        )
        .bind(&bookie.name)
        .bind(bookie.balance)
        .fetch_one(&self.pool)
        .await?;
        Ok(Bookie::from(row))
    }

    pub async fn find_bookie_by_name(&self, name: &str) -> Result<Option<Bookie>> {
        let row: Option<BookieRow> = sqlx::query_as(
            "SELECT id, name, balance, updated_at, last_deposit_at, last_withdraw_at \
             FROM bookies WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Bookie::from))
    }

    pub async fn update_bookie_balance(&self, id: i64, new_balance: Decimal) -> Result<Bookie> {
        let row: Option<BookieRow> = sqlx::query_as(
            "UPDATE bookies SET balance = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, name, balance, updated_at, last_deposit_at, last_withdraw_at",
        )
        .bind(id)
        .bind(new_balance)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Bookie::from)
            .ok_or(LedgerError::BookieNotFound { id })
    }

    pub async fn add_to_bookie_balance(&self, id: i64, delta: Decimal) -> Result<Bookie> {
        let row: Option<BookieRow> = sqlx::query_as(
            "UPDATE bookies SET balance = balance + $2, updated_at = now() WHERE id = $1 \
             RETURNING id, name, balance, updated_at, last_deposit_at, last_withdraw_at",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Bookie::from)
            .ok_or(LedgerError::BookieNotFound { id })
    }

    // --- transactions -------------------------------------------------

    pub async fn list_transactions(&self, bookie_id: Option<i64>) -> Result<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = match bookie_id {
            Some(id) => {
                sqlx::query_as(
                    "SELECT id, bookie_id, amount, kind, description, created_at \
                     FROM transactions WHERE bookie_id = $1 ORDER BY created_at DESC",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, bookie_id, amount, kind, description, created_at \
                     FROM transactions ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    /// Record a deposit or withdrawal and move the bookie balance in the
    /// same database transaction.
    pub async fn create_transaction(
        &self,
        bookie_id: i64,
        amount: Decimal,
        kind: TransactionKind,
        description: &str,
    ) -> Result<Transaction> {
        let mut tx = self.pool.begin().await?;

        let row: TransactionRow = sqlx::query_as(
            "INSERT INTO transactions (bookie_id, amount, kind, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, bookie_id, amount, kind, description, created_at",
        )
        .bind(bookie_id)
        .bind(amount)
        .bind(kind.as_str())
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        let (delta, timestamp_column) = match kind {
            TransactionKind::Deposit => (amount, "last_deposit_at"),
            TransactionKind::Withdraw => (-amount, "last_withdraw_at"),
        };
        let updated = sqlx::query(&format!(
            "UPDATE bookies SET balance = balance + $2, updated_at = now(), \
             {timestamp_column} = now() WHERE id = $1"
        ))
        .bind(bookie_id)
        .bind(delta)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(LedgerError::BookieNotFound { id: bookie_id });
        }

        tx.commit().await?;
        Ok(Transaction::from(row))
    }

    // --- goals --------------------------------------------------------

    pub async fn get_goal(&self) -> Result<Option<Goal>> {
        let row: Option<GoalRow> = sqlx::query_as(
            "SELECT daily_target, monthly_target, daily_loss_limit FROM goals WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Goal::from))
    }

    pub async fn upsert_goal(&self, goal: &Goal) -> Result<Goal> {
        let row: GoalRow = sqlx::query_as(
            "INSERT INTO goals (id, daily_target, monthly_target, daily_loss_limit) \
             VALUES (1, $1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET daily_target = $1, monthly_target = $2, \
             daily_loss_limit = $3, updated_at = now() \
             RETURNING daily_target, monthly_target, daily_loss_limit",
        )
        .bind(goal.daily_target)
        .bind(goal.monthly_target)
        .bind(goal.daily_loss_limit)
        .fetch_one(&self.pool)
        .await?;
        Ok(Goal::from(row))
    }
}

fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &BetFilter) {
    if let Some(start) = filter.start_date {
        query.push(" AND placed_on >= ");
        query.push_bind(start);
    }
    if let Some(end) = filter.end_date {
        query.push(" AND placed_on <= ");
        query.push_bind(end);
    }
    if let Some(ref bookmaker) = filter.bookmaker {
        query.push(" AND bookmaker = ");
        query.push_bind(bookmaker.clone());
    }
    if let Some(bet_type) = filter.bet_type {
        query.push(" AND bet_type = ");
        query.push_bind(bet_type.as_str());
    }
    if let Some(outcome) = filter.outcome {
        query.push(" AND outcome = ");
        query.push_bind(outcome.as_str());
    }
}
