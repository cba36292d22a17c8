//! HTTP webhook adapter for score notification fan-out.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{Notification, NotificationDispatchError, NotificationSink};

/// Sink that POSTs each notification as JSON to a configured endpoint.
///
/// The serialised body carries the event kind, game id, payload, and the
/// cache keys the event invalidates; downstream consumers fan the event out
/// to subscribers and drop the named cache entries.
#[derive(Clone)]
pub struct WebhookNotificationSink {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotificationSink {
    /// Create a sink delivering to the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationDispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await
            .map_err(|err| NotificationDispatchError::delivery(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationDispatchError::delivery(format!(
                "endpoint returned {status}"
            )));
        }

        debug!(
            kind = notification.kind.as_str(),
            game_id = %notification.game_id,
            "notification delivered"
        );
        Ok(())
    }
}

/// Sink that only logs, for deployments without a webhook consumer.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationDispatchError> {
        debug!(
            kind = notification.kind.as_str(),
            game_id = %notification.game_id,
            invalidations = notification.cache_invalidations.len(),
            "notification logged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Payload shape coverage; delivery paths are exercised in integration
    //! environments with a live endpoint.

    use rstest::rstest;
    use uuid::Uuid;

    use crate::domain::ports::{NotificationKind, ticker_cache_key};

    use super::*;

    #[rstest]
    fn sink_keeps_its_endpoint() {
        let sink = WebhookNotificationSink::new("https://hooks.example.test/scores");
        assert_eq!(sink.endpoint(), "https://hooks.example.test/scores");
    }

    #[rstest]
    fn notification_body_is_camel_cased() {
        let game_id = Uuid::new_v4();
        let notification = Notification {
            kind: NotificationKind::ScoreUpdate,
            game_id,
            payload: serde_json::json!({"homeScore": 2, "awayScore": 1}),
            cache_invalidations: vec![ticker_cache_key(game_id)],
        };

        let body = serde_json::to_value(&notification).expect("serialisable notification");
        assert_eq!(body["kind"], "score_update");
        assert_eq!(body["gameId"], game_id.to_string());
        assert_eq!(body["payload"]["homeScore"], 2);
        assert_eq!(
            body["cacheInvalidations"][0],
            format!("ticker:game:{game_id}")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn log_sink_accepts_everything() {
        let sink = LogNotificationSink;
        let notification = Notification {
            kind: NotificationKind::GameEnd,
            game_id: Uuid::new_v4(),
            payload: serde_json::Value::Null,
            cache_invalidations: Vec::new(),
        };
        sink.dispatch(&notification).await.expect("log sink accepts");
    }
}
