//! Port for score notification fan-out.
//!
//! Dispatch is fire-and-forget from the domain's point of view: the live
//! game service logs delivery failures and never rolls a state transition
//! back because a webhook or cache was unreachable.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Events announced to downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Play began.
    GameStart,
    /// The score changed.
    ScoreUpdate,
    /// Overtime began.
    OvertimeStart,
    /// The final whistle.
    GameEnd,
    /// An administrator confirmed the score.
    GameReconciled,
}

impl NotificationKind {
    /// Stable wire name used in webhook payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GameStart => "game_start",
            Self::ScoreUpdate => "score_update",
            Self::OvertimeStart => "overtime_start",
            Self::GameEnd => "game_end",
            Self::GameReconciled => "game_reconciled",
        }
    }
}

/// A fan-out message: what happened, to which game, with what payload, and
/// which cached views are now stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// What happened.
    pub kind: NotificationKind,
    /// Game the event belongs to.
    pub game_id: Uuid,
    /// Event payload forwarded to webhooks.
    pub payload: serde_json::Value,
    /// Cache keys invalidated by the event.
    pub cache_invalidations: Vec<String>,
}

/// Live ticker cache key for a game.
pub fn ticker_cache_key(game_id: Uuid) -> String {
    format!("ticker:game:{game_id}")
}

/// Standings cache key for a season.
pub fn standings_cache_key(season_id: Uuid) -> String {
    format!("standings:season:{season_id}")
}

/// Errors raised by notification sink adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationDispatchError {
    /// The downstream endpoint could not be reached or refused the event.
    #[error("notification delivery failed: {message}")]
    Delivery {
        /// Adapter failure detail.
        message: String,
    },
}

impl NotificationDispatchError {
    /// Build a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

/// Port for the downstream fan-out collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification.
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationDispatchError>;
}

/// Fixture sink that swallows every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationSink;

#[async_trait]
impl NotificationSink for FixtureNotificationSink {
    async fn dispatch(
        &self,
        _notification: &Notification,
    ) -> Result<(), NotificationDispatchError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn cache_keys_embed_identifiers() {
        let game_id = Uuid::new_v4();
        let season_id = Uuid::new_v4();
        assert_eq!(ticker_cache_key(game_id), format!("ticker:game:{game_id}"));
        assert_eq!(
            standings_cache_key(season_id),
            format!("standings:season:{season_id}")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_sink_accepts_everything() {
        let sink = FixtureNotificationSink;
        let notification = Notification {
            kind: NotificationKind::ScoreUpdate,
            game_id: Uuid::new_v4(),
            payload: serde_json::json!({"homeScore": 1}),
            cache_invalidations: vec![ticker_cache_key(Uuid::new_v4())],
        };
        sink.dispatch(&notification).await.expect("fixture accepts");
    }
}
