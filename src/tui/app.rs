//! Dashboard session wiring and terminal event loop.
//!
//! One mounted session owns three timer-driven activities (page advance,
//! countdown ticker, auto-refresh backstop) plus the realtime subscription.
//! They run independently: a pending refetch never blocks rotation, and
//! rotation state never rolls back because a slow refetch resolved late.
//! Unmounting cancels all of them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, OrderStore};
use crate::error::Result;
use crate::rank::{SortOptions, group_by_company, weighted_sort};
use crate::realtime::RealtimeSync;
use crate::recovery::{BoundaryState, FaultBoundary};
use crate::rotation::{RotationDriver, RotationSettings};
use crate::store::OrderCache;
use crate::tui::views;

/// Poll cadence of the terminal event loop.
const INPUT_POLL_PERIOD: Duration = Duration::from_millis(50);

/// Everything a dashboard session needs to run.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub rotation: RotationSettings,
    pub sort: SortOptions,
    /// Backstop refetch period; push notifications normally beat it.
    pub auto_refresh: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rotation: RotationSettings::default(),
            sort: SortOptions::default(),
            auto_refresh: Duration::from_secs(300),
        }
    }
}

/// A mounted dashboard: cache, rotation, realtime, backstop.
pub struct DashboardSession {
    cache: Arc<OrderCache>,
    driver: RotationDriver,
    sort: SortOptions,
    realtime: Option<RealtimeSync>,
    invalidation_task: Option<JoinHandle<()>>,
    backstop_task: Option<JoinHandle<()>>,
}

impl DashboardSession {
    /// Fetch the initial snapshot and start all timers.
    ///
    /// `client` enables the realtime channel; without one (offline/demo
    /// stores) the session runs on the backstop alone. A failed initial
    /// fetch is not fatal: rotation starts empty and the backstop keeps
    /// trying.
    pub async fn start(
        store: Arc<dyn OrderStore>,
        client: Option<Arc<ApiClient>>,
        config: DashboardConfig,
    ) -> Self {
        let cache = Arc::new(OrderCache::new(store));
        if let Err(err) = cache.refresh().await {
            tracing::error!(error = %err, "initial fetch failed, starting empty");
        }

        let snapshot = cache.snapshot().await;
        let (items, companies) = Self::arrange(&snapshot, config.sort);
        let driver = RotationDriver::start(&config.rotation, items, companies);

        let (invalidate_tx, mut invalidate_rx) = mpsc::channel::<()>(16);

        let realtime = client.map(|client| RealtimeSync::start(client, "orders", invalidate_tx));

        let invalidation_task = {
            let cache = cache.clone();
            let rotation = driver.handle();
            let sort = config.sort;
            tokio::spawn(async move {
                while invalidate_rx.recv().await.is_some() {
                    Self::refresh_into(&cache, &rotation, sort).await;
                }
            })
        };

        let backstop_task = {
            let cache = cache.clone();
            let rotation = driver.handle();
            let sort = config.sort;
            let period = config.auto_refresh;
            tokio::spawn(async move {
                let mut timer = tokio::time::interval(period);
                timer.tick().await;
                loop {
                    timer.tick().await;
                    tracing::debug!("auto-refresh backstop fired");
                    Self::refresh_into(&cache, &rotation, sort).await;
                }
            })
        };

        Self {
            cache,
            driver,
            sort: config.sort,
            realtime,
            invalidation_task: Some(invalidation_task),
            backstop_task: Some(backstop_task),
        }
    }

    /// Group and weighted-sort a snapshot into rotation inputs.
    fn arrange(
        orders: &[crate::domain::Order],
        sort: SortOptions,
    ) -> (
        std::collections::HashMap<String, Vec<crate::domain::Order>>,
        Vec<String>,
    ) {
        let grouped = group_by_company(orders);
        let mut items = std::collections::HashMap::new();
        for (company, bucket) in &grouped.buckets {
            items.insert(company.clone(), weighted_sort(bucket, sort));
        }
        (items, grouped.companies)
    }

    /// Refetch and feed the rotation; errors keep the last-good view.
    async fn refresh_into(cache: &OrderCache, rotation: &crate::rotation::RotationHandle, sort: SortOptions) {
        match cache.refresh().await {
            Ok(()) => {
                let snapshot = cache.snapshot().await;
                let (items, companies) = Self::arrange(&snapshot, sort);
                rotation.update_data(items, companies);
            }
            Err(err) => {
                tracing::warn!(error = %err, "refresh failed, keeping last snapshot");
            }
        }
    }

    /// Manual refresh (the `r` key).
    pub async fn refresh_now(&self) {
        Self::refresh_into(&self.cache, &self.driver.handle(), self.sort).await;
    }

    pub fn driver(&self) -> &RotationDriver {
        &self.driver
    }

    /// Cancel every timer and tear down the realtime channel.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.invalidation_task.take() {
            task.abort();
        }
        if let Some(task) = self.backstop_task.take() {
            task.abort();
        }
        if let Some(mut realtime) = self.realtime.take() {
            realtime.shutdown();
        }
        self.driver.shutdown();
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run the TV display until `q`/Esc.
///
/// Render faults do not kill the board: a [`FaultBoundary`] retries the
/// draw with backoff and only an exhausted boundary ends the loop. The
/// `r` key resets the boundary by hand.
pub async fn run(mut session: DashboardSession) -> Result<()> {
    let mut terminal = ratatui::init();
    let mut view_rx = session.driver().subscribe();
    let mut boundary = FaultBoundary::default();

    let result = loop {
        if boundary.is_healthy() || boundary.retry_due(Instant::now()) {
            let view = view_rx.borrow_and_update().clone();
            match terminal.draw(|frame| views::draw(frame, &view)) {
                Ok(_) => boundary.record_success(),
                Err(err) => {
                    tracing::error!(error = %err, "render failed");
                    boundary.record_fault(Instant::now());
                    if boundary.state() == BoundaryState::Exhausted {
                        break Err(err.into());
                    }
                }
            }
        }

        // Non-blocking input check; the async timers keep running while we
        // sleep between polls.
        match poll_key() {
            Ok(Some(KeyCode::Char('q'))) | Ok(Some(KeyCode::Esc)) => break Ok(()),
            Ok(Some(KeyCode::Char('r'))) => {
                boundary.reset();
                session.refresh_now().await;
            }
            Ok(_) => {}
            Err(err) => break Err(err),
        }

        tokio::select! {
            _ = view_rx.changed() => {}
            _ = tokio::time::sleep(INPUT_POLL_PERIOD) => {}
        }
    };

    session.shutdown();
    ratatui::restore();
    result
}

fn poll_key() -> Result<Option<KeyCode>> {
    if event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key.code));
            }
        }
    }
    Ok(None)
}
