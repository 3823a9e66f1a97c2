use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use wager_metrics::{
    buckets, goals, potential, ratios, risk, temporal, DashboardMetrics, GoalProgress,
    MetricsConfig, OddsMetrics, PendingProjection, PerformanceMetrics, RiskMetrics,
    TemporalMetrics,
};
use wager_models::{BetFilter, BetRecord, Bookie, Goal, Result};
use wager_store::BetStore;

/// Every derived metrics structure for one bet selection, computed in a
/// single pass and served to the presentation layer as a unit.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub generation: u64,
    pub as_of: NaiveDate,
    pub filter: BetFilter,
    pub dashboard: DashboardMetrics,
    pub performance: PerformanceMetrics,
    pub risk: RiskMetrics,
    pub odds: OddsMetrics,
    pub temporal: TemporalMetrics,
    pub pending: PendingProjection,
    pub goal_progress: Option<GoalProgress>,
    pub bookies: Vec<Bookie>,
}

impl AnalyticsSnapshot {
    /// Pure assembly of all metric structures from already-fetched inputs.
    pub fn compute(
        generation: u64,
        bets: &[BetRecord],
        bookies: Vec<Bookie>,
        goal: Option<Goal>,
        filter: BetFilter,
        as_of: NaiveDate,
        config: &MetricsConfig,
    ) -> Self {
        let classified = wager_metrics::partition(bets);

        let goal_progress = goal.map(|goal| {
            goals::compute(
                &goal,
                goals::profit_on(bets, as_of),
                goals::profit_in_month(bets, as_of),
            )
        });

        Self {
            generation,
            as_of,
            dashboard: DashboardMetrics::compute(bets, as_of, config),
            performance: ratios::compute(bets, as_of, config),
            risk: risk::compute(&classified.resolved, config),
            odds: buckets::compute(&classified.resolved, config),
            temporal: temporal::compute(bets),
            pending: potential::compute(&classified.pending),
            goal_progress,
            bookies,
            filter,
        }
    }
}

/// Fetches the underlying collections, recomputes the snapshot, and keeps
/// the freshest result. Each refresh carries a generation number; a refresh
/// that finishes after a newer one has landed is discarded instead of
/// clobbering it.
pub struct AnalyticsService {
    store: Arc<BetStore>,
    config: MetricsConfig,
    generation: AtomicU64,
    latest: RwLock<Option<AnalyticsSnapshot>>,
    by_filter: DashMap<String, AnalyticsSnapshot>,
}

impl AnalyticsService {
    pub fn new(store: Arc<BetStore>, config: MetricsConfig) -> Self {
        Self {
            store,
            config,
            generation: AtomicU64::new(0),
            latest: RwLock::new(None),
            by_filter: DashMap::new(),
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Fetch bets, bookies and the goal as independent requests, join them,
    /// and recompute. Returns the snapshot it computed even when a newer
    /// generation superseded it in the shared state.
    pub async fn refresh(&self, filter: BetFilter, as_of: NaiveDate) -> Result<AnalyticsSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (bets, bookies, goal) = tokio::try_join!(
            self.store.list_bets(&filter),
            self.store.list_bookies(),
            self.store.get_goal(),
        )?;
        let (bets, total) = bets;
        debug!(generation, total, "analytics refresh fetched inputs");

        let snapshot = AnalyticsSnapshot::compute(
            generation,
            &bets,
            bookies,
            goal,
            filter.clone(),
            as_of,
            &self.config,
        );

        self.by_filter
            .insert(filter_key(&filter), snapshot.clone());

        let mut latest = self.latest.write();
        if should_replace(latest.as_ref(), generation) {
            *latest = Some(snapshot.clone());
        } else {
            debug!(generation, "stale analytics refresh discarded");
        }
        Ok(snapshot)
    }

    pub fn latest(&self) -> Option<AnalyticsSnapshot> {
        self.latest.read().clone()
    }

    pub fn cached(&self, filter: &BetFilter) -> Option<AnalyticsSnapshot> {
        self.by_filter.get(&filter_key(filter)).map(|s| s.clone())
    }

    /// Background refresh of the unfiltered snapshot until cancelled.
    pub fn spawn_periodic(
        self: Arc<Self>,
        period: Duration,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        let service = self;
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("analytics refresher stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let today = Utc::now().date_naive();
                        if let Err(e) = service.refresh(BetFilter::default(), today).await {
                            error!("analytics refresh failed: {e}");
                        }
                    }
                }
            }
        })
    }
}

/// A snapshot replaces the stored one only when its generation is not older.
fn should_replace(current: Option<&AnalyticsSnapshot>, incoming_generation: u64) -> bool {
    current.map_or(true, |snapshot| incoming_generation >= snapshot.generation)
}

fn filter_key(filter: &BetFilter) -> String {
    serde_json::to_string(filter).unwrap_or_default()
}
