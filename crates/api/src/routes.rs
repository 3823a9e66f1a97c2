use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use wager_metrics::{
    buckets, goals, partition, potential, ratios, risk, temporal, DashboardMetrics, GoalProgress,
    OddsMetrics, PendingProjection, PerformanceMetrics, RiskMetrics, TemporalMetrics,
};
use wager_models::{
    BetFilter, BetOutcome, BetRecord, BetType, Bookie, Goal, LedgerError, NewBet, NewBookie,
    Transaction, TransactionKind,
};
use wager_services::{AnalyticsService, AnalyticsSnapshot, SettlementService};
use wager_store::BetStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BetStore>,
    pub analytics: Arc<AnalyticsService>,
    pub settlement: Arc<SettlementService>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub pagination: Option<PaginationInfo>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        })
    }
}

#[derive(Serialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub pages: u32,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

/// Filter and pagination parameters shared by the bet and metrics routes.
#[derive(Debug, Default, Deserialize)]
pub struct BetQueryParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bookmaker: Option<String>,
    pub bet_type: Option<BetType>,
    pub outcome: Option<BetOutcome>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl BetQueryParams {
    fn filter(&self) -> BetFilter {
        BetFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            bookmaker: self.bookmaker.clone(),
            bet_type: self.bet_type,
            outcome: self.outcome,
        }
    }
}

#[derive(Deserialize)]
pub struct SetResultRequest {
    pub outcome: BetOutcome,
    pub cashout_value: Option<Decimal>,
}

#[derive(Deserialize)]
pub struct BalanceRequest {
    pub balance: Decimal,
}

#[derive(Deserialize)]
pub struct NewTransactionRequest {
    pub bookie_id: i64,
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct TransactionQueryParams {
    pub bookie_id: Option<i64>,
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health_check))
        // Ledger
        .route("/api/v1/bets", get(list_bets).post(create_bet))
        .route("/api/v1/bets/:id", put(update_bet).delete(delete_bet))
        .route("/api/v1/bets/:id/result", post(set_bet_result))
        // Metrics
        .route("/api/v1/metrics", get(get_snapshot))
        .route("/api/v1/metrics/dashboard", get(get_dashboard_metrics))
        .route("/api/v1/metrics/performance", get(get_performance_metrics))
        .route("/api/v1/metrics/risk", get(get_risk_metrics))
        .route("/api/v1/metrics/odds", get(get_odds_metrics))
        .route("/api/v1/metrics/temporal", get(get_temporal_metrics))
        .route("/api/v1/metrics/pending", get(get_pending_projection))
        // Bankroll
        .route("/api/v1/bookies", get(list_bookies).post(create_bookie))
        .route("/api/v1/bookies/:id/balance", put(update_bookie_balance))
        .route(
            "/api/v1/transactions",
            get(list_transactions).post(create_transaction),
        )
        // Goals
        .route("/api/v1/goals", get(get_goal).put(upsert_goal))
        .route("/api/v1/goals/progress", get(get_goal_progress))
}

pub fn app(state: AppState) -> Router {
    create_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::BetNotFound { .. } | LedgerError::BookieNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        LedgerError::InvalidOdds(_)
        | LedgerError::InvalidStake { .. }
        | LedgerError::InvalidOutcome { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn internal(err: LedgerError) -> StatusCode {
    error!("request failed: {err}");
    error_status(&err)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// --- ledger ------------------------------------------------------------

async fn list_bets(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BetRecord>>>, StatusCode> {
    let (bets, total) = state
        .store
        .list_bets(&params.filter())
        .await
        .map_err(internal)?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let start = ((page - 1) * limit) as usize;
    let end = (start + limit as usize).min(bets.len());
    let page_bets = if start < bets.len() {
        bets[start..end].to_vec()
    } else {
        vec![]
    };

    let total = total as u32;
    Ok(Json(ApiResponse {
        success: true,
        data: Some(page_bets),
        message: None,
        pagination: Some(PaginationInfo {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        }),
    }))
}

async fn create_bet(
    State(state): State<AppState>,
    Json(bet): Json<NewBet>,
) -> Result<Json<ApiResponse<BetRecord>>, StatusCode> {
    let created = state.store.create_bet(&bet).await.map_err(internal)?;
    Ok(ApiResponse::ok(created))
}

async fn update_bet(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(bet): Json<NewBet>,
) -> Result<Json<ApiResponse<BetRecord>>, StatusCode> {
    let updated = state.store.update_bet(id, &bet).await.map_err(internal)?;
    Ok(ApiResponse::ok(updated))
}

async fn delete_bet(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    state.store.delete_bet(id).await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_bet_result(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(request): Json<SetResultRequest>,
) -> Result<Json<ApiResponse<BetRecord>>, StatusCode> {
    let settled = state
        .settlement
        .set_result(id, request.outcome, request.cashout_value)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::ok(settled))
}

// --- metrics -----------------------------------------------------------

async fn fetch_bets(state: &AppState, filter: &BetFilter) -> Result<Vec<BetRecord>, StatusCode> {
    state
        .store
        .list_bets(filter)
        .await
        .map(|(bets, _)| bets)
        .map_err(internal)
}

async fn get_snapshot(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AnalyticsSnapshot>>, StatusCode> {
    let snapshot = state
        .analytics
        .refresh(params.filter(), today())
        .await
        .map_err(internal)?;
    Ok(ApiResponse::ok(snapshot))
}

async fn get_dashboard_metrics(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardMetrics>>, StatusCode> {
    let bets = fetch_bets(&state, &params.filter()).await?;
    Ok(ApiResponse::ok(DashboardMetrics::compute(
        &bets,
        today(),
        state.analytics.config(),
    )))
}

async fn get_performance_metrics(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PerformanceMetrics>>, StatusCode> {
    let bets = fetch_bets(&state, &params.filter()).await?;
    Ok(ApiResponse::ok(ratios::compute(
        &bets,
        today(),
        state.analytics.config(),
    )))
}

async fn get_risk_metrics(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RiskMetrics>>, StatusCode> {
    let bets = fetch_bets(&state, &params.filter()).await?;
    let classified = partition(&bets);
    Ok(ApiResponse::ok(risk::compute(
        &classified.resolved,
        state.analytics.config(),
    )))
}

async fn get_odds_metrics(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OddsMetrics>>, StatusCode> {
    let bets = fetch_bets(&state, &params.filter()).await?;
    let classified = partition(&bets);
    Ok(ApiResponse::ok(buckets::compute(
        &classified.resolved,
        state.analytics.config(),
    )))
}

async fn get_temporal_metrics(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TemporalMetrics>>, StatusCode> {
    let bets = fetch_bets(&state, &params.filter()).await?;
    Ok(ApiResponse::ok(temporal::compute(&bets)))
}

async fn get_pending_projection(
    Query(params): Query<BetQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PendingProjection>>, StatusCode> {
    let bets = fetch_bets(&state, &params.filter()).await?;
    let classified = partition(&bets);
    Ok(ApiResponse::ok(potential::compute(&classified.pending)))
}

// --- bankroll ----------------------------------------------------------

async fn list_bookies(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Bookie>>>, StatusCode> {
    let bookies = state.store.list_bookies().await.map_err(internal)?;
    Ok(ApiResponse::ok(bookies))
}

async fn create_bookie(
    State(state): State<AppState>,
    Json(bookie): Json<NewBookie>,
) -> Result<Json<ApiResponse<Bookie>>, StatusCode> {
    let created = state.store.create_bookie(&bookie).await.map_err(internal)?;
    Ok(ApiResponse::ok(created))
}

async fn update_bookie_balance(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(request): Json<BalanceRequest>,
) -> Result<Json<ApiResponse<Bookie>>, StatusCode> {
    let updated = state
        .store
        .update_bookie_balance(id, request.balance)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::ok(updated))
}

async fn list_transactions(
    Query(params): Query<TransactionQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, StatusCode> {
    let transactions = state
        .store
        .list_transactions(params.bookie_id)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::ok(transactions))
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<NewTransactionRequest>,
) -> Result<Json<ApiResponse<Transaction>>, StatusCode> {
    let created = state
        .store
        .create_transaction(
            request.bookie_id,
            request.amount,
            request.kind,
            &request.description,
        )
        .await
        .map_err(internal)?;
    Ok(ApiResponse::ok(created))
}

// --- goals -------------------------------------------------------------

async fn get_goal(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Option<Goal>>>, StatusCode> {
    let goal = state.store.get_goal().await.map_err(internal)?;
    Ok(ApiResponse::ok(goal))
}

async fn upsert_goal(
    State(state): State<AppState>,
    Json(goal): Json<Goal>,
) -> Result<Json<ApiResponse<Goal>>, StatusCode> {
    let saved = state.store.upsert_goal(&goal).await.map_err(internal)?;
    Ok(ApiResponse::ok(saved))
}

async fn get_goal_progress(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Option<GoalProgress>>>, StatusCode> {
    let goal = state.store.get_goal().await.map_err(internal)?;
    let Some(goal) = goal else {
        return Ok(ApiResponse::ok(None));
    };
    let bets = fetch_bets(&state, &BetFilter::default()).await?;
    let as_of = today();
    let progress = goals::compute(
        &goal,
        goals::profit_on(&bets, as_of),
        goals::profit_in_month(&bets, as_of),
    );
    Ok(ApiResponse::ok(Some(progress)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(response.0.status, "healthy");
        assert!(!response.0.version.is_empty());
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&LedgerError::BetNotFound { id: 1 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&LedgerError::InvalidOdds("bad".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(&LedgerError::Config("broken".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_query_params_to_filter() {
        let params = BetQueryParams {
            start_date: Some("2025-01-01".parse().unwrap()),
            bookmaker: Some("bet365".to_string()),
            outcome: Some(BetOutcome::Won),
            ..BetQueryParams::default()
        };
        let filter = params.filter();
        assert_eq!(filter.start_date, params.start_date);
        assert_eq!(filter.bookmaker.as_deref(), Some("bet365"));
        assert_eq!(filter.outcome, Some(BetOutcome::Won));
        assert!(filter.bet_type.is_none());
    }
}
