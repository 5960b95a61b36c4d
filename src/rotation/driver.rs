//! Tokio timer driver around [`Rotation`].
//!
//! Two repeating timers run per mounted dashboard: the advance timer (one
//! page/company step per `page_interval`) and a 100ms countdown ticker that
//! republishes the view so the progress gauge moves between advances. Both
//! are aborted on shutdown; the countdown never drives state transitions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::Order;
use crate::rotation::state::{Rotation, RotationView};

/// Refresh period of the observational countdown value.
pub const COUNTDOWN_PERIOD: Duration = Duration::from_millis(100);

/// Rotation cadence configuration.
#[derive(Debug, Clone)]
pub struct RotationSettings {
    /// Fallback interval between company-level advances.
    pub rotation_interval: Duration,
    /// Interval between page advances; defaults to `rotation_interval`.
    pub page_rotation_interval: Option<Duration>,
    /// Card capacity of one page.
    pub items_per_page: usize,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            rotation_interval: Duration::from_secs(10),
            page_rotation_interval: None,
            items_per_page: 6,
        }
    }
}

impl RotationSettings {
    /// Effective period of the advance timer.
    pub fn page_interval(&self) -> Duration {
        self.page_rotation_interval.unwrap_or(self.rotation_interval)
    }
}

/// Cloneable handle for feeding fresh data into a running rotation from
/// background tasks.
#[derive(Clone)]
pub struct RotationHandle {
    rotation: Arc<Mutex<Rotation>>,
    view_tx: Arc<watch::Sender<RotationView>>,
    page_interval: Duration,
}

impl RotationHandle {
    /// Swap in fresh data; indices are normalized immediately and the new
    /// view is published without waiting for a tick.
    pub fn update_data(&self, items: HashMap<String, Vec<Order>>, companies: Vec<String>) {
        let view = {
            let mut rotation = self.rotation.lock().expect("rotation lock poisoned");
            rotation.set_data(items, companies);
            rotation.view(self.page_interval, Instant::now())
        };
        self.view_tx.send_replace(view);
    }
}

/// Owns the rotation state and its two timers.
pub struct RotationDriver {
    rotation: Arc<Mutex<Rotation>>,
    view_tx: Arc<watch::Sender<RotationView>>,
    page_interval: Duration,
    advance_task: Option<JoinHandle<()>>,
    countdown_task: Option<JoinHandle<()>>,
}

impl RotationDriver {
    /// Start the driver over pre-sorted per-company item lists.
    pub fn start(
        settings: &RotationSettings,
        items: HashMap<String, Vec<Order>>,
        companies: Vec<String>,
    ) -> Self {
        let page_interval = settings.page_interval();
        let rotation = Arc::new(Mutex::new(Rotation::new(
            items,
            companies,
            settings.items_per_page,
        )));

        let initial = rotation
            .lock()
            .expect("rotation lock poisoned")
            .view(page_interval, Instant::now());
        let view_tx = Arc::new(watch::channel(initial).0);

        let advance_task = {
            let rotation = rotation.clone();
            let view_tx = view_tx.clone();
            tokio::spawn(async move {
                let mut timer = tokio::time::interval(page_interval);
                // The first interval tick completes immediately; the page
                // must stay up for a full period before advancing.
                timer.tick().await;
                loop {
                    timer.tick().await;
                    let now = Instant::now();
                    let view = {
                        let mut rotation = rotation.lock().expect("rotation lock poisoned");
                        rotation.tick(now);
                        rotation.view(page_interval, now)
                    };
                    view_tx.send_replace(view);
                }
            })
        };

        let countdown_task = {
            let rotation = rotation.clone();
            let view_tx = view_tx.clone();
            tokio::spawn(async move {
                let mut timer = tokio::time::interval(COUNTDOWN_PERIOD);
                loop {
                    timer.tick().await;
                    let view = {
                        let rotation = rotation.lock().expect("rotation lock poisoned");
                        rotation.view(page_interval, Instant::now())
                    };
                    view_tx.send_replace(view);
                }
            })
        };

        Self {
            rotation,
            view_tx,
            page_interval,
            advance_task: Some(advance_task),
            countdown_task: Some(countdown_task),
        }
    }

    /// Receiver of view snapshots; updated on every advance and countdown
    /// tick.
    pub fn subscribe(&self) -> watch::Receiver<RotationView> {
        self.view_tx.subscribe()
    }

    /// Current view, read on demand.
    pub fn view(&self) -> RotationView {
        self.rotation
            .lock()
            .expect("rotation lock poisoned")
            .view(self.page_interval, Instant::now())
    }

    /// Handle for background tasks to push refreshed data through.
    pub fn handle(&self) -> RotationHandle {
        RotationHandle {
            rotation: self.rotation.clone(),
            view_tx: self.view_tx.clone(),
            page_interval: self.page_interval,
        }
    }

    /// Swap in fresh data after a refetch.
    ///
    /// Indices are normalized immediately (reactive clamp); the published
    /// view reflects the new data without waiting for the next tick.
    pub fn update_data(&self, items: HashMap<String, Vec<Order>>, companies: Vec<String>) {
        self.handle().update_data(items, companies);
    }

    /// Cancel both timers. Idempotent; no callbacks fire afterwards.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.advance_task.take() {
            task.abort();
        }
        if let Some(task) = self.countdown_task.take() {
            task.abort();
        }
    }
}

impl Drop for RotationDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderPriority, OrderStatus};
    use chrono::{TimeZone, Utc};

    fn order(id: &str, company: &str) -> Order {
        Order {
            id: id.to_string(),
            company_name: Some(company.to_string()),
            part_name: "Widget".to_string(),
            quantity_total: 10,
            quantity_completed: 0,
            priority: OrderPriority::Normal,
            status: OrderStatus::Scheduled,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    fn two_companies() -> (HashMap<String, Vec<Order>>, Vec<String>) {
        let mut items = HashMap::new();
        items.insert("A".to_string(), vec![order("a1", "A")]);
        items.insert("B".to_string(), vec![order("b1", "B")]);
        (items, vec!["A".to_string(), "B".to_string()])
    }

    fn fast_settings() -> RotationSettings {
        RotationSettings {
            rotation_interval: Duration::from_millis(50),
            page_rotation_interval: None,
            items_per_page: 2,
        }
    }

    #[test]
    fn test_page_interval_defaults_to_rotation_interval() {
        let settings = RotationSettings {
            rotation_interval: Duration::from_secs(15),
            page_rotation_interval: None,
            items_per_page: 4,
        };
        assert_eq!(settings.page_interval(), Duration::from_secs(15));

        let settings = RotationSettings {
            page_rotation_interval: Some(Duration::from_secs(5)),
            ..settings
        };
        assert_eq!(settings.page_interval(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_driver_advances_on_timer() {
        let (items, companies) = two_companies();
        let mut driver = RotationDriver::start(&fast_settings(), items, companies);

        assert_eq!(driver.view().current_company.as_deref(), Some("A"));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(driver.view().current_company.as_deref(), Some("B"));

        driver.shutdown();
    }

    #[tokio::test]
    async fn test_driver_publishes_views() {
        let (items, companies) = two_companies();
        let mut driver = RotationDriver::start(&fast_settings(), items, companies);
        let mut rx = driver.subscribe();

        rx.changed().await.unwrap();
        let view = rx.borrow().clone();
        assert_eq!(view.total_companies, 2);

        driver.shutdown();
    }

    #[tokio::test]
    async fn test_update_data_applies_without_tick() {
        let (items, companies) = two_companies();
        let settings = RotationSettings {
            rotation_interval: Duration::from_secs(600),
            page_rotation_interval: None,
            items_per_page: 2,
        };
        let mut driver = RotationDriver::start(&settings, items, companies);

        let mut items = HashMap::new();
        items.insert("C".to_string(), vec![order("c1", "C")]);
        driver.update_data(items, vec!["C".to_string()]);

        let view = driver.view();
        assert_eq!(view.current_company.as_deref(), Some("C"));
        assert_eq!(view.total_companies, 1);

        driver.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_stops_advancing() {
        let (items, companies) = two_companies();
        let mut driver = RotationDriver::start(&fast_settings(), items, companies);

        driver.shutdown();
        let before = driver.view().current_company;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(driver.view().current_company, before);
    }

    #[tokio::test]
    async fn test_empty_companies_never_panics() {
        let settings = fast_settings();
        let mut driver = RotationDriver::start(&settings, HashMap::new(), Vec::new());

        tokio::time::sleep(Duration::from_millis(120)).await;
        let view = driver.view();
        assert_eq!(view.current_company, None);
        assert_eq!(view.total_pages, 1);
        assert!(view.current_items.is_empty());

        driver.shutdown();
    }
}
