//! Tests for the live game console service.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::live::{GameStatus, StatKind};
use crate::domain::ports::{
    FixtureNotificationSink, MockGameRepository, MockNotificationSink, NotificationDispatchError,
};

fn scheduled_game() -> Game {
    Game::scheduled(
        Uuid::new_v4(),
        Uuid::new_v4(),
        None,
        Uuid::new_v4(),
        Uuid::new_v4(),
    )
}

fn live_game() -> Game {
    let mut game = scheduled_game();
    game.start(Utc::now()).expect("start succeeds");
    game
}

fn final_game(home: i32, away: i32) -> Game {
    let mut game = live_game();
    game.apply_score(home, away, Utc::now()).expect("score applies");
    game.end(Utc::now()).expect("end succeeds");
    game
}

fn service(
    games: MockGameRepository,
) -> LiveGameService<MockGameRepository, FixtureNotificationSink> {
    LiveGameService::new(Arc::new(games), Arc::new(FixtureNotificationSink))
}

#[tokio::test]
async fn start_persists_the_transition_and_period_start_event() {
    let game = scheduled_game();
    let game_id = game.id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games
        .expect_save_game()
        .times(1)
        .withf(|game, expected, update, events| {
            game.status == GameStatus::InProgress
                && game.current_period == 1
                && *expected == GameStatus::Scheduled
                && update.is_none()
                && events.len() == 1
                && events[0].kind == GameEventKind::PeriodStart
        })
        .return_once(|_, _, _, _| Ok(()));

    let started = service(games)
        .start(GameActionRequest {
            game_id,
            actor: Some("scorer".to_owned()),
        })
        .await
        .expect("start succeeds");

    assert_eq!(started.status, GameStatus::InProgress);
}

#[tokio::test]
async fn resume_before_halftime_fails_and_writes_nothing() {
    let game = live_game();
    let game_id = game.id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games.expect_save_game().times(0);

    let error = service(games)
        .resume(GameActionRequest {
            game_id,
            actor: None,
        })
        .await
        .expect_err("game is not at halftime");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
    assert!(error.message().contains("resume"));
}

#[tokio::test]
async fn update_score_appends_exactly_one_audit_row() {
    let game = live_game();
    let game_id = game.id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games
        .expect_save_game()
        .times(1)
        .withf(|game, _, update, events| {
            let Some(update) = update else { return false };
            game.home_score == 1
                && game.away_score == 0
                && update.previous_home_score == 0
                && update.previous_away_score == 0
                && update.new_home_score == 1
                && update.new_away_score == 0
                && events.is_empty()
        })
        .return_once(|_, _, _, _| Ok(()));

    let updated = service(games)
        .update_score(UpdateScoreRequest {
            game_id,
            home_score: 1,
            away_score: 0,
            actor: Some("scorer".to_owned()),
            notes: None,
        })
        .await
        .expect("score update succeeds");

    assert_eq!((updated.home_score, updated.away_score), (1, 0));
    assert!(updated.last_score_update.is_some());
}

#[tokio::test]
async fn update_score_on_a_final_game_is_refused() {
    let game = final_game(2, 1);
    let game_id = game.id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games.expect_save_game().times(0);

    let error = service(games)
        .update_score(UpdateScoreRequest {
            game_id,
            home_score: 3,
            away_score: 1,
            actor: None,
            notes: None,
        })
        .await
        .expect_err("final games are frozen");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn notification_failure_does_not_roll_back_the_transition() {
    let game = live_game();
    let game_id = game.id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games
        .expect_save_game()
        .times(1)
        .return_once(|_, _, _, _| Ok(()));

    let mut sink = MockNotificationSink::new();
    sink.expect_dispatch()
        .times(1)
        .return_once(|_| Err(NotificationDispatchError::delivery("endpoint down")));

    let service = LiveGameService::new(Arc::new(games), Arc::new(sink));
    let updated = service
        .update_score(UpdateScoreRequest {
            game_id,
            home_score: 1,
            away_score: 0,
            actor: None,
            notes: None,
        })
        .await
        .expect("transition survives delivery failure");

    assert_eq!(updated.home_score, 1);
}

#[tokio::test]
async fn end_fans_out_a_game_end_notification() {
    let game = live_game();
    let game_id = game.id;
    let season_id = game.season_id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games
        .expect_save_game()
        .times(1)
        .return_once(|_, _, _, _| Ok(()));

    let mut sink = MockNotificationSink::new();
    sink.expect_dispatch()
        .times(1)
        .withf(move |notification| {
            notification.kind == NotificationKind::GameEnd
                && notification.game_id == game_id
                && notification
                    .cache_invalidations
                    .contains(&standings_cache_key(season_id))
        })
        .return_once(|_| Ok(()));

    let service = LiveGameService::new(Arc::new(games), Arc::new(sink));
    let ended = service
        .end(GameActionRequest {
            game_id,
            actor: None,
        })
        .await
        .expect("end succeeds");

    assert_eq!(ended.status, GameStatus::Final);
}

#[tokio::test]
async fn reconcile_is_admin_only() {
    let games = MockGameRepository::new();

    let error = service(games)
        .reconcile(ReconcileRequest {
            game_id: Uuid::new_v4(),
            actor: "scorer".to_owned(),
            is_admin: false,
        })
        .await
        .expect_err("non-admin reconciliation");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn reconcile_reports_validation_against_player_stats() {
    let game = final_game(1, 0);
    let game_id = game.id;
    let home_team = game.home_team_id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games.expect_list_player_stats().return_once(move |_| {
        Ok(vec![PlayerGameStat {
            id: Uuid::new_v4(),
            game_id,
            player_id: Uuid::new_v4(),
            team_id: home_team,
            kind: StatKind::Goals,
            value: 1,
        }])
    });
    games
        .expect_save_game()
        .times(1)
        .withf(|game, expected, _, _| {
            game.status == GameStatus::Reconciled
                && game.is_reconciled
                && *expected == GameStatus::Final
        })
        .return_once(|_, _, _, _| Ok(()));

    let response = service(games)
        .reconcile(ReconcileRequest {
            game_id,
            actor: "admin".to_owned(),
            is_admin: true,
        })
        .await
        .expect("reconciliation succeeds");

    assert!(response.validation.is_valid);
    assert_eq!(response.game.reconciled_by.as_deref(), Some("admin"));
}

#[tokio::test]
async fn reconcile_surfaces_mismatch_warnings_without_blocking() {
    let game = final_game(3, 0);
    let game_id = game.id;
    let home_team = game.home_team_id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games.expect_list_player_stats().return_once(move |_| {
        Ok(vec![PlayerGameStat {
            id: Uuid::new_v4(),
            game_id,
            player_id: Uuid::new_v4(),
            team_id: home_team,
            kind: StatKind::Points,
            value: 2,
        }])
    });
    games
        .expect_save_game()
        .times(1)
        .return_once(|_, _, _, _| Ok(()));

    let response = service(games)
        .reconcile(ReconcileRequest {
            game_id,
            actor: "admin".to_owned(),
            is_admin: true,
        })
        .await
        .expect("reconciliation succeeds despite mismatch");

    assert!(!response.validation.is_valid);
    assert_eq!(response.game.status, GameStatus::Reconciled);
}

#[tokio::test]
async fn record_penalty_pairs_a_penalty_event() {
    let game = live_game();
    let game_id = game.id;
    let team_id = game.home_team_id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games
        .expect_record_penalty()
        .times(1)
        .withf(|penalty, event| {
            event.kind == GameEventKind::Penalty
                && event.team_id == Some(penalty.team_id)
                && event.details["penaltyType"] == "holding"
        })
        .return_once(|_, _| Ok(()));

    let penalty = service(games)
        .record_penalty(RecordPenaltyRequest {
            game_id,
            team_id,
            player_id: None,
            penalty_type: "holding".to_owned(),
            period: Some(1),
            game_clock: Some("07:15".to_owned()),
            minutes: Some(2),
            severity: Some("minor".to_owned()),
            description: None,
            resulted_in_ejection: false,
        })
        .await
        .expect("penalty recorded");

    assert_eq!(penalty.penalty_type, "holding");
}

#[tokio::test]
async fn player_stat_rejects_negative_absolute_values() {
    let games = MockGameRepository::new();

    let error = service(games)
        .set_player_stat(PlayerStatRequest {
            game_id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            kind: StatKind::Points,
            value: -2,
        })
        .await
        .expect_err("negative absolute value");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn missing_game_maps_to_not_found() {
    let mut games = MockGameRepository::new();
    games.expect_find_game().return_once(|_| Ok(None));

    let error = service(games)
        .start(GameActionRequest {
            game_id: Uuid::new_v4(),
            actor: None,
        })
        .await
        .expect_err("unknown game");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn concurrent_modification_maps_to_invalid_transition() {
    let game = live_game();
    let game_id = game.id;

    let mut games = MockGameRepository::new();
    games
        .expect_find_game()
        .return_once(move |_| Ok(Some(game)));
    games.expect_save_game().return_once(move |_, _, _, _| {
        Err(GameRepositoryError::Concurrency {
            game_id,
            found: GameStatus::Final,
        })
    });

    let error = service(games)
        .update_score(UpdateScoreRequest {
            game_id,
            home_score: 1,
            away_score: 0,
            actor: None,
            notes: None,
        })
        .await
        .expect_err("row changed under us");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}
