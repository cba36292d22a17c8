//! Live game console service.
//!
//! Implements the [`LiveGameConsole`] driving port: lifecycle transitions,
//! audited score updates, events, penalties, player stats, and
//! reconciliation. Every state change is persisted through one row-locked
//! repository call, then announced to the notification sink; delivery
//! failures are logged and never roll the transition back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::live::{
    Game, GameEvent, GameEventKind, GameTransitionError, Penalty, PlayerGameStat, ScoreUpdate,
    validate_score,
};
use crate::domain::ports::{
    GameActionRequest, GameDetail, GameRepository, GameRepositoryError, LiveGameConsole,
    Notification, NotificationKind, NotificationSink, PlayerStatRequest, ReconcileRequest,
    ReconcileResponse, RecordEventRequest, RecordPenaltyRequest, UpdateScoreRequest,
    standings_cache_key, ticker_cache_key,
};

fn map_repository_error(error: GameRepositoryError) -> Error {
    match error {
        GameRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("game repository unavailable: {message}"))
        }
        GameRepositoryError::Query { message } => {
            Error::internal(format!("game repository error: {message}"))
        }
        GameRepositoryError::Concurrency { .. } => Error::invalid_transition(error.to_string()),
    }
}

fn map_transition_error(error: GameTransitionError) -> Error {
    Error::invalid_transition(error.to_string())
}

/// Live game service implementing the console driving port.
#[derive(Clone)]
pub struct LiveGameService<R, N> {
    games: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> LiveGameService<R, N> {
    /// Create a new service over the game repository and notification sink.
    pub fn new(games: Arc<R>, notifier: Arc<N>) -> Self {
        Self { games, notifier }
    }
}

impl<R, N> LiveGameService<R, N>
where
    R: GameRepository,
    N: NotificationSink,
{
    async fn load(&self, game_id: Uuid) -> Result<Game, Error> {
        self.games
            .find_game(game_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("game {game_id} not found")))
    }

    /// Announce a state change downstream. Failures are logged and swallowed.
    async fn notify(&self, kind: NotificationKind, game: &Game) {
        let notification = Notification {
            kind,
            game_id: game.id,
            payload: serde_json::json!({
                "eventType": kind.as_str(),
                "gameId": game.id,
                "status": game.status.as_str(),
                "homeScore": game.home_score,
                "awayScore": game.away_score,
                "period": game.current_period,
                "gameClock": game.game_clock,
                "lastScoreUpdate": game.last_score_update,
            }),
            cache_invalidations: vec![
                ticker_cache_key(game.id),
                standings_cache_key(game.season_id),
            ],
        };
        if let Err(err) = self.notifier.dispatch(&notification).await {
            tracing::error!(
                game_id = %game.id,
                kind = kind.as_str(),
                error = %err,
                "score notification delivery failed"
            );
        }
    }

    /// Run a lifecycle transition: mutate a copy, persist it under the
    /// status observed at load time, then fan out.
    async fn transition<F>(
        &self,
        game_id: Uuid,
        mutate: F,
        events: fn(&Game) -> Vec<GameEvent>,
        announce: Option<NotificationKind>,
    ) -> Result<Game, Error>
    where
        F: FnOnce(&mut Game) -> Result<(), GameTransitionError>,
    {
        let mut game = self.load(game_id).await?;
        let expected = game.status;
        mutate(&mut game).map_err(map_transition_error)?;

        let events = events(&game);
        self.games
            .save_game(&game, expected, None, &events)
            .await
            .map_err(map_repository_error)?;

        if let Some(kind) = announce {
            self.notify(kind, &game).await;
        }
        Ok(game)
    }
}

fn lifecycle_event(
    game: &Game,
    kind: GameEventKind,
    description: impl Into<String>,
) -> GameEvent {
    GameEvent {
        id: Uuid::new_v4(),
        game_id: game.id,
        kind,
        team_id: None,
        player_id: None,
        period: Some(game.current_period),
        game_clock: game.game_clock.clone(),
        details: serde_json::Value::Object(serde_json::Map::new()),
        description: Some(description.into()),
        occurred_at: Utc::now(),
    }
}

#[async_trait]
impl<R, N> LiveGameConsole for LiveGameService<R, N>
where
    R: GameRepository,
    N: NotificationSink,
{
    async fn game(&self, game_id: Uuid) -> Result<GameDetail, Error> {
        let game = self.load(game_id).await?;
        let events = self
            .games
            .list_events(game_id)
            .await
            .map_err(map_repository_error)?;
        let penalties = self
            .games
            .list_penalties(game_id)
            .await
            .map_err(map_repository_error)?;
        let player_stats = self
            .games
            .list_player_stats(game_id)
            .await
            .map_err(map_repository_error)?;
        let score_history = self
            .games
            .list_score_updates(game_id)
            .await
            .map_err(map_repository_error)?;
        Ok(GameDetail {
            game,
            events,
            penalties,
            player_stats,
            score_history,
        })
    }

    async fn start(&self, request: GameActionRequest) -> Result<Game, Error> {
        self.transition(
            request.game_id,
            |game| game.start(Utc::now()),
            |game| vec![lifecycle_event(game, GameEventKind::PeriodStart, "Game started")],
            Some(NotificationKind::GameStart),
        )
        .await
    }

    async fn set_halftime(&self, request: GameActionRequest) -> Result<Game, Error> {
        self.transition(
            request.game_id,
            Game::set_halftime,
            |game| vec![lifecycle_event(game, GameEventKind::PeriodEnd, "Halftime")],
            None,
        )
        .await
    }

    async fn resume(&self, request: GameActionRequest) -> Result<Game, Error> {
        self.transition(
            request.game_id,
            Game::resume,
            |game| {
                vec![lifecycle_event(
                    game,
                    GameEventKind::PeriodStart,
                    format!("Period {} started", game.current_period),
                )]
            },
            None,
        )
        .await
    }

    async fn start_overtime(&self, request: GameActionRequest) -> Result<Game, Error> {
        self.transition(
            request.game_id,
            Game::start_overtime,
            |game| {
                vec![lifecycle_event(
                    game,
                    GameEventKind::OvertimeStart,
                    format!("Overtime period {} started", game.overtime_periods),
                )]
            },
            Some(NotificationKind::OvertimeStart),
        )
        .await
    }

    async fn end(&self, request: GameActionRequest) -> Result<Game, Error> {
        self.transition(
            request.game_id,
            |game| game.end(Utc::now()),
            |game| vec![lifecycle_event(game, GameEventKind::GameEnd, "Game ended")],
            Some(NotificationKind::GameEnd),
        )
        .await
    }

    async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileResponse, Error> {
        if !request.is_admin {
            return Err(Error::forbidden("reconciliation is an admin-only action"));
        }

        let mut game = self.load(request.game_id).await?;
        let expected = game.status;
        game.reconcile(&request.actor, Utc::now())
            .map_err(map_transition_error)?;

        let stats = self
            .games
            .list_player_stats(game.id)
            .await
            .map_err(map_repository_error)?;
        let validation = validate_score(&game, &stats);

        self.games
            .save_game(&game, expected, None, &[])
            .await
            .map_err(map_repository_error)?;
        self.notify(NotificationKind::GameReconciled, &game).await;

        Ok(ReconcileResponse { game, validation })
    }

    async fn update_score(&self, request: UpdateScoreRequest) -> Result<Game, Error> {
        let mut game = self.load(request.game_id).await?;
        let expected = game.status;
        let change = game
            .apply_score(request.home_score, request.away_score, Utc::now())
            .map_err(map_transition_error)?;

        // The audit row is written in the same transaction as the game row.
        let update = ScoreUpdate {
            id: Uuid::new_v4(),
            game_id: game.id,
            actor: request.actor,
            previous_home_score: change.previous_home,
            previous_away_score: change.previous_away,
            new_home_score: change.new_home,
            new_away_score: change.new_away,
            notes: request.notes,
            created_at: Utc::now(),
        };
        self.games
            .save_game(&game, expected, Some(&update), &[])
            .await
            .map_err(map_repository_error)?;

        self.notify(NotificationKind::ScoreUpdate, &game).await;
        Ok(game)
    }

    async fn record_event(&self, request: RecordEventRequest) -> Result<GameEvent, Error> {
        self.load(request.game_id).await?;
        let event = GameEvent {
            id: Uuid::new_v4(),
            game_id: request.game_id,
            kind: request.kind,
            team_id: request.team_id,
            player_id: request.player_id,
            period: request.period,
            game_clock: request.game_clock,
            details: request.details,
            description: request.description,
            occurred_at: Utc::now(),
        };
        self.games
            .append_event(&event)
            .await
            .map_err(map_repository_error)?;
        Ok(event)
    }

    async fn record_penalty(&self, request: RecordPenaltyRequest) -> Result<Penalty, Error> {
        self.load(request.game_id).await?;
        let penalty = Penalty {
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
            created_at: Utc::now(),
        };
        let event = GameEvent {
            id: Uuid::new_v4(),
            game_id: penalty.game_id,
            kind: GameEventKind::Penalty,
            team_id: Some(penalty.team_id),
            player_id: penalty.player_id,
            period: penalty.period,
            game_clock: penalty.game_clock.clone(),
            details: serde_json::json!({
                "penaltyType": penalty.penalty_type,
                "severity": penalty.severity,
            }),
            description: penalty.description.clone(),
            occurred_at: penalty.created_at,
        };
        self.games
            .record_penalty(&penalty, &event)
            .await
            .map_err(map_repository_error)?;
        Ok(penalty)
    }

    async fn set_player_stat(
        &self,
        request: PlayerStatRequest,
    ) -> Result<PlayerGameStat, Error> {
        if request.value < 0 {
            return Err(Error::invalid_request("stat values must not be negative"));
        }
        self.load(request.game_id).await?;
        let stat = PlayerGameStat {
            id: Uuid::new_v4(),
            game_id: request.game_id,
            player_id: request.player_id,
            team_id: request.team_id,
            kind: request.kind,
            value: request.value,
        };
        self.games
            .set_player_stat(&stat)
            .await
            .map_err(map_repository_error)
    }

    async fn increment_player_stat(
        &self,
        request: PlayerStatRequest,
    ) -> Result<PlayerGameStat, Error> {
        self.load(request.game_id).await?;
        self.games
            .increment_player_stat(
                request.game_id,
                request.player_id,
                request.team_id,
                request.kind,
                request.value,
            )
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "live_game_service_tests.rs"]
mod tests;
