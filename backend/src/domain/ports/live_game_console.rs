//! Driving port for the live game console.
//!
//! Everything a scorekeeper or administrator does during play goes through
//! this contract: lifecycle transitions, score updates, events, penalties,
//! player stats, and reconciliation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::live::{
    Game, GameEvent, GameEventKind, Penalty, PlayerGameStat, ScoreUpdate, ScoreValidationReport,
    StatKind,
};

/// A lifecycle action against one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameActionRequest {
    /// Game the action targets.
    pub game_id: Uuid,
    /// Who asked, when known.
    pub actor: Option<String>,
}

/// A score change reported from the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreRequest {
    /// Game being scored.
    pub game_id: Uuid,
    /// New home score.
    pub home_score: i32,
    /// New away score.
    pub away_score: i32,
    /// Who reported it, when known.
    pub actor: Option<String>,
    /// Free-text notes for the audit row.
    pub notes: Option<String>,
}

/// Request to confirm a finished game's score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// Game being confirmed.
    pub game_id: Uuid,
    /// Administrator confirming the score.
    pub actor: String,
    /// Whether the caller holds the admin role.
    pub is_admin: bool,
}

/// Outcome of reconciliation: the terminal game plus the validation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    /// The reconciled game.
    pub game: Game,
    /// Score-versus-stats validation findings.
    pub validation: ScoreValidationReport,
}

/// A game event reported from the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventRequest {
    /// Game the event belongs to.
    pub game_id: Uuid,
    /// What happened.
    pub kind: GameEventKind,
    /// Team involved, when applicable.
    pub team_id: Option<Uuid>,
    /// Player involved, when applicable.
    pub player_id: Option<Uuid>,
    /// 1-based period.
    pub period: Option<u32>,
    /// Clock display at the time.
    pub game_clock: Option<String>,
    /// Free-form detail payload.
    #[serde(default)]
    pub details: serde_json::Value,
    /// Human-readable summary.
    pub description: Option<String>,
}

/// A penalty reported from the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPenaltyRequest {
    /// Game the penalty belongs to.
    pub game_id: Uuid,
    /// Penalised team.
    pub team_id: Uuid,
    /// Penalised player, when identified.
    pub player_id: Option<Uuid>,
    /// Sport-specific penalty name.
    pub penalty_type: String,
    /// 1-based period.
    pub period: Option<u32>,
    /// Clock display at the time.
    pub game_clock: Option<String>,
    /// Penalty minutes, for sports that track them.
    pub minutes: Option<u32>,
    /// Sport-specific severity label.
    pub severity: Option<String>,
    /// Human-readable summary.
    pub description: Option<String>,
    /// Whether the player was ejected.
    #[serde(default)]
    pub resulted_in_ejection: bool,
}

/// A player stat write from the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatRequest {
    /// Game the stat belongs to.
    pub game_id: Uuid,
    /// Player the stat belongs to.
    pub player_id: Uuid,
    /// Team the player appeared for.
    pub team_id: Uuid,
    /// Stat category.
    pub kind: StatKind,
    /// Absolute value for a set, delta for an increment.
    pub value: i32,
}

/// A game with everything recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    /// The game row.
    pub game: Game,
    /// Events, newest first.
    pub events: Vec<GameEvent>,
    /// Penalties, oldest first.
    pub penalties: Vec<Penalty>,
    /// Player stat lines.
    pub player_stats: Vec<PlayerGameStat>,
    /// Score audit trail, oldest first.
    pub score_history: Vec<ScoreUpdate>,
}

/// Driving port for live game operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiveGameConsole: Send + Sync {
    /// Fetch a game with its events, penalties, stats, and score history.
    async fn game(&self, game_id: Uuid) -> Result<GameDetail, Error>;

    /// Begin play.
    async fn start(&self, request: GameActionRequest) -> Result<Game, Error>;

    /// Pause at the half.
    async fn set_halftime(&self, request: GameActionRequest) -> Result<Game, Error>;

    /// Resume from the half.
    async fn resume(&self, request: GameActionRequest) -> Result<Game, Error>;

    /// Enter an overtime period.
    async fn start_overtime(&self, request: GameActionRequest) -> Result<Game, Error>;

    /// End play.
    async fn end(&self, request: GameActionRequest) -> Result<Game, Error>;

    /// Confirm the final score. Admin-only.
    async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileResponse, Error>;

    /// Apply a score change and append its audit row.
    async fn update_score(&self, request: UpdateScoreRequest) -> Result<Game, Error>;

    /// Record a game event.
    async fn record_event(&self, request: RecordEventRequest) -> Result<GameEvent, Error>;

    /// Record a penalty and its paired event.
    async fn record_penalty(&self, request: RecordPenaltyRequest) -> Result<Penalty, Error>;

    /// Set a player stat to an absolute value.
    async fn set_player_stat(&self, request: PlayerStatRequest)
    -> Result<PlayerGameStat, Error>;

    /// Add to a player stat.
    async fn increment_player_stat(
        &self,
        request: PlayerStatRequest,
    ) -> Result<PlayerGameStat, Error>;
}

/// Fixture console for tests that do not exercise live scoring.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLiveGameConsole;

impl FixtureLiveGameConsole {
    fn placeholder_game(game_id: Uuid) -> Game {
        Game::scheduled(game_id, Uuid::nil(), None, Uuid::new_v4(), Uuid::new_v4())
    }
}

#[async_trait]
impl LiveGameConsole for FixtureLiveGameConsole {
    async fn game(&self, game_id: Uuid) -> Result<GameDetail, Error> {
        Ok(GameDetail {
            game: Self::placeholder_game(game_id),
            events: Vec::new(),
            penalties: Vec::new(),
            player_stats: Vec::new(),
            score_history: Vec::new(),
        })
    }

    async fn start(&self, request: GameActionRequest) -> Result<Game, Error> {
        Ok(Self::placeholder_game(request.game_id))
    }

    async fn set_halftime(&self, request: GameActionRequest) -> Result<Game, Error> {
        Ok(Self::placeholder_game(request.game_id))
    }

    async fn resume(&self, request: GameActionRequest) -> Result<Game, Error> {
        Ok(Self::placeholder_game(request.game_id))
    }

    async fn start_overtime(&self, request: GameActionRequest) -> Result<Game, Error> {
        Ok(Self::placeholder_game(request.game_id))
    }

    async fn end(&self, request: GameActionRequest) -> Result<Game, Error> {
        Ok(Self::placeholder_game(request.game_id))
    }

    async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileResponse, Error> {
        Ok(ReconcileResponse {
            game: Self::placeholder_game(request.game_id),
            validation: ScoreValidationReport {
                is_valid: true,
                warnings: Vec::new(),
            },
        })
    }

    async fn update_score(&self, request: UpdateScoreRequest) -> Result<Game, Error> {
        Ok(Self::placeholder_game(request.game_id))
    }

    async fn record_event(&self, request: RecordEventRequest) -> Result<GameEvent, Error> {
        Ok(GameEvent {
            id: Uuid::new_v4(),
            game_id: request.game_id,
            kind: request.kind,
            team_id: request.team_id,
            player_id: request.player_id,
            period: request.period,
            game_clock: request.game_clock,
            details: request.details,
            description: request.description,
            occurred_at: chrono::Utc::now(),
        })
    }

    async fn record_penalty(&self, request: RecordPenaltyRequest) -> Result<Penalty, Error> {
        Ok(Penalty {
            id: Uuid::new_v4(),
            game_id: request.game_id,
            team_id: request.team_id,
            player_id: request.player_id,
            penalty_type: request.penalty_type,
            period: request.period,
            game_clock: request.game_clock,
            minutes: request.minutes,
            severity: request.severity,
            description: request.description,
            resulted_in_ejection: request.resulted_in_ejection,
            created_at: chrono::Utc::now(),
        })
    }

    async fn set_player_stat(
        &self,
        request: PlayerStatRequest,
    ) -> Result<PlayerGameStat, Error> {
        Ok(PlayerGameStat {
            id: Uuid::new_v4(),
            game_id: request.game_id,
            player_id: request.player_id,
            team_id: request.team_id,
            kind: request.kind,
            value: request.value,
        })
    }

    async fn increment_player_stat(
        &self,
        request: PlayerStatRequest,
    ) -> Result<PlayerGameStat, Error> {
        self.set_player_stat(request).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_game_is_scheduled_and_empty() {
        let console = FixtureLiveGameConsole;
        let detail = console
            .game(Uuid::new_v4())
            .await
            .expect("fixture lookup succeeds");
        assert!(detail.events.is_empty());
        assert!(detail.score_history.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_event_echoes_request() {
        let console = FixtureLiveGameConsole;
        let request = RecordEventRequest {
            game_id: Uuid::new_v4(),
            kind: GameEventKind::Goal,
            team_id: Some(Uuid::new_v4()),
            player_id: None,
            period: Some(1),
            game_clock: Some("04:12".to_owned()),
            details: serde_json::json!({}),
            description: None,
        };

        let event = console
            .record_event(request.clone())
            .await
            .expect("fixture record succeeds");
        assert_eq!(event.game_id, request.game_id);
        assert_eq!(event.kind, GameEventKind::Goal);
    }
}
