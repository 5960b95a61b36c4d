//! Change-feed subscription task.
//!
//! One subscription per mounted dashboard session, listening for
//! insert/update/delete rows on the `orders` table over server-sent
//! events. Every notification invalidates the order cache (full refetch,
//! no diffing). Reconnection is bounded by [`MAX_REALTIME_RETRIES`]; once
//! disabled, the session lives on the polling backstop alone.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use reqwest::Method;
use reqwest_eventsource::{Error as EventSourceError, Event, EventSource};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::domain::ChangeType;
use crate::realtime::channel::{ChannelStatus, SubscriptionState};

/// Pause between a closure and the next subscription attempt.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(2);

/// One row-change notification from the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeNotification {
    pub table: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// Session id of the client that caused the change, if any.
    #[serde(default)]
    pub origin: Option<String>,
}

/// Handle to the subscription task for one dashboard session.
pub struct RealtimeSync {
    task: Option<JoinHandle<()>>,
    tearing_down: Arc<AtomicBool>,
}

impl RealtimeSync {
    /// Open the change feed for `table` and forward invalidations.
    ///
    /// Each notification (other than our own echoes) sends one unit on
    /// `invalidate`; the receiver owns the actual refetch.
    pub fn start(client: Arc<ApiClient>, table: &str, invalidate: mpsc::Sender<()>) -> Self {
        let tearing_down = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(subscription_loop(
            client,
            table.to_string(),
            invalidate,
            tearing_down.clone(),
        ));

        Self {
            task: Some(task),
            tearing_down,
        }
    }

    /// Tear the subscription down.
    ///
    /// The grace flag is raised first so the closure caused by the abort
    /// is never misread as an abnormal failure. Idempotent.
    pub fn shutdown(&mut self) {
        self.tearing_down.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RealtimeSync {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn subscription_loop(
    client: Arc<ApiClient>,
    table: String,
    invalidate: mpsc::Sender<()>,
    tearing_down: Arc<AtomicBool>,
) {
    let mut state = SubscriptionState::new();
    let session_id = client.session_id().to_string();

    while state.should_resubscribe() && !tearing_down.load(Ordering::SeqCst) {
        let request = client.request(Method::GET, client.change_feed_url(&table));
        let mut source = match EventSource::new(request) {
            Ok(source) => source,
            Err(err) => {
                tracing::error!(error = %err, "failed to build change-feed request");
                state.on_status(ChannelStatus::ChannelError, false);
                tokio::time::sleep(RESUBSCRIBE_DELAY).await;
                continue;
            }
        };

        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => {
                    tracing::info!(table = %table, "realtime channel subscribed");
                    state.on_status(ChannelStatus::Subscribed, false);
                }
                Ok(Event::Message(message)) => {
                    if let Some(notification) = parse_notification(&message.data) {
                        if notification.origin.as_deref() == Some(session_id.as_str()) {
                            tracing::debug!("suppressing own change echo");
                            continue;
                        }
                        tracing::debug!(
                            table = %notification.table,
                            change = ?notification.change_type,
                            "change notification, invalidating cache"
                        );
                    }
                    // Malformed payloads still invalidate; a full refetch
                    // is always safe.
                    if invalidate.send(()).await.is_err() {
                        // Receiver gone: session is unmounting.
                        source.close();
                        return;
                    }
                }
                Err(err) => {
                    source.close();
                    let status = classify_error(&err);
                    state.on_status(status, tearing_down.load(Ordering::SeqCst));
                    break;
                }
            }
        }

        if tearing_down.load(Ordering::SeqCst) {
            return;
        }
        if state.should_resubscribe() {
            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
        }
    }

    tracing::warn!(table = %table, "realtime subscription loop ended");
}

fn parse_notification(data: &str) -> Option<ChangeNotification> {
    serde_json::from_str(data)
        .map_err(|err| {
            tracing::debug!(error = %err, "unparseable change payload");
            err
        })
        .ok()
}

/// Map a stream error onto the channel lifecycle taxonomy.
fn classify_error(err: &EventSourceError) -> ChannelStatus {
    match err {
        EventSourceError::StreamEnded => ChannelStatus::Closed,
        EventSourceError::Transport(e) if e.is_timeout() => ChannelStatus::TimedOut,
        _ => ChannelStatus::ChannelError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendConfig;

    #[test]
    fn test_parse_notification() {
        let data = r#"{"table":"orders","type":"update","origin":"123-9"}"#;
        let notification = parse_notification(data).unwrap();
        assert_eq!(notification.table, "orders");
        assert_eq!(notification.change_type, ChangeType::Update);
        assert_eq!(notification.origin.as_deref(), Some("123-9"));
    }

    #[test]
    fn test_parse_notification_without_origin() {
        let data = r#"{"table":"orders","type":"insert"}"#;
        let notification = parse_notification(data).unwrap();
        assert_eq!(notification.origin, None);
    }

    #[test]
    fn test_parse_notification_malformed() {
        assert!(parse_notification("not json").is_none());
    }

    #[test]
    fn test_classify_stream_ended_as_closed() {
        assert_eq!(classify_error(&EventSourceError::StreamEnded), ChannelStatus::Closed);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let config = BackendConfig::new("http://127.0.0.1:1", "test-key").unwrap();
        let client = Arc::new(ApiClient::new(config));
        let (tx, _rx) = mpsc::channel(8);

        let mut sync = RealtimeSync::start(client, "orders", tx);
        sync.shutdown();
        sync.shutdown();
        assert!(sync.task.is_none());
    }
}
