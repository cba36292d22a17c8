//! Diesel-backed implementation of the live game storage port.
//!
//! [`GameRepository::save_game`] locks the stored row with `FOR UPDATE` and
//! verifies it still matches what the caller read before writing the game,
//! its optional score audit row, and its events in one transaction. The
//! guard covers the status always, and the stored score whenever a score
//! audit row is appended, so two scorekeepers racing on one game serialise
//! at the database and the loser gets a concurrency error instead of an
//! overwrite with a stale audit trail.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::live::{
    Game, GameEvent, GameEventKind, GameStatus, Penalty, PlayerGameStat, ScoreUpdate, StatKind,
};
use crate::domain::ports::{GameRepository, GameRepositoryError};

use super::error_mapping::DbFault;
use super::models::{
    GameChangeset, GameEventInsert, GameEventRow, GameRow, PenaltyInsert, PenaltyRow,
    PlayerGameStatInsert, PlayerGameStatRow, ScoreUpdateInsert, ScoreUpdateRow, int_from_u32,
    u32_from_int,
};
use super::pool::{DbPool, PoolError};
use super::schema::{game_events, games, penalties, player_game_stats, score_updates};

/// PostgreSQL adapter for live game storage.
#[derive(Clone)]
pub struct DieselGameRepository {
    pool: DbPool,
}

impl DieselGameRepository {
    /// Create a new repository backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn fault_error(fault: DbFault) -> GameRepositoryError {
    match fault {
        DbFault::Query(message) => GameRepositoryError::query(message),
        DbFault::Connection(message) => GameRepositoryError::connection(message),
    }
}

fn pool_error(error: PoolError) -> GameRepositoryError {
    fault_error(DbFault::from_pool(error))
}

fn map_query_error(error: diesel::result::Error) -> GameRepositoryError {
    fault_error(DbFault::from_diesel(error))
}

/// Failures inside the save transaction that are not plain Diesel errors.
enum SaveTxError {
    Diesel(diesel::result::Error),
    Concurrency { found: GameStatus },
    UnknownStatus(String),
}

impl From<diesel::result::Error> for SaveTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

/// Check the locked row against what the caller read before it mutated the
/// game. The status must match, and when a score audit row is about to be
/// appended the stored score must equal the audit row's previous score, so
/// a racing writer cannot leave the audit chain pointing at scores that
/// were never stored.
fn verify_locked_row(
    stored_status: &str,
    stored_scores: (i32, i32),
    expected_status: GameStatus,
    audited_previous_scores: Option<(i32, i32)>,
) -> Result<(), SaveTxError> {
    let found = GameStatus::parse(stored_status)
        .ok_or_else(|| SaveTxError::UnknownStatus(stored_status.to_owned()))?;
    if found != expected_status {
        return Err(SaveTxError::Concurrency { found });
    }
    if let Some(previous) = audited_previous_scores {
        if stored_scores != previous {
            return Err(SaveTxError::Concurrency { found });
        }
    }
    Ok(())
}

fn game_changeset(game: &Game) -> Result<GameChangeset, GameRepositoryError> {
    Ok(GameChangeset {
        status: game.status.as_str().to_owned(),
        home_score: game.home_score,
        away_score: game.away_score,
        home_score_regulation: game.home_score_regulation,
        away_score_regulation: game.away_score_regulation,
        period_scores: serde_json::to_value(&game.period_scores).map_err(|err| {
            GameRepositoryError::query(format!("period scores do not serialise: {err}"))
        })?,
        went_to_overtime: game.went_to_overtime,
        overtime_periods: int_from_u32(game.overtime_periods).map_err(GameRepositoryError::query)?,
        current_period: int_from_u32(game.current_period).map_err(GameRepositoryError::query)?,
        game_clock: game.game_clock.clone(),
        last_score_update: game.last_score_update,
        is_reconciled: game.is_reconciled,
        reconciled_by: game.reconciled_by.clone(),
        reconciled_at: game.reconciled_at,
        updated_at: Utc::now(),
    })
}

fn game_from_row(row: GameRow) -> Result<Game, GameRepositoryError> {
    let status = GameStatus::parse(&row.status).ok_or_else(|| {
        GameRepositoryError::query(format!("game {} has unknown status '{}'", row.id, row.status))
    })?;
    let period_scores = serde_json::from_value(row.period_scores).map_err(|err| {
        GameRepositoryError::query(format!("game {} has malformed period scores: {err}", row.id))
    })?;

    Ok(Game {
        id: row.id,
        season_id: row.season_id,
        match_id: row.match_id,
        home_team_id: row.home_team_id,
        away_team_id: row.away_team_id,
        status,
        home_score: row.home_score,
        away_score: row.away_score,
        home_score_regulation: row.home_score_regulation,
        away_score_regulation: row.away_score_regulation,
        period_scores,
        went_to_overtime: row.went_to_overtime,
        overtime_periods: u32_from_int(row.overtime_periods),
        current_period: u32_from_int(row.current_period),
        game_clock: row.game_clock,
        last_score_update: row.last_score_update,
        is_reconciled: row.is_reconciled,
        reconciled_by: row.reconciled_by,
        reconciled_at: row.reconciled_at,
    })
}

fn event_insert(event: &GameEvent) -> Result<GameEventInsert, GameRepositoryError> {
    Ok(GameEventInsert {
        id: event.id,
        game_id: event.game_id,
        kind: event.kind.as_str().to_owned(),
        team_id: event.team_id,
        player_id: event.player_id,
        period: event
            .period
            .map(int_from_u32)
            .transpose()
            .map_err(GameRepositoryError::query)?,
        game_clock: event.game_clock.clone(),
        details: event.details.clone(),
        description: event.description.clone(),
        occurred_at: event.occurred_at,
    })
}

fn event_from_row(row: GameEventRow) -> Result<GameEvent, GameRepositoryError> {
    let kind = GameEventKind::parse(&row.kind).ok_or_else(|| {
        GameRepositoryError::query(format!("event {} has unknown kind '{}'", row.id, row.kind))
    })?;

    Ok(GameEvent {
        id: row.id,
        game_id: row.game_id,
        kind,
        team_id: row.team_id,
        player_id: row.player_id,
        period: row.period.map(u32_from_int),
        game_clock: row.game_clock,
        details: row.details,
        description: row.description,
        occurred_at: row.occurred_at,
    })
}

fn penalty_insert(penalty: &Penalty) -> Result<PenaltyInsert, GameRepositoryError> {
    Ok(PenaltyInsert {
        id: penalty.id,
        game_id: penalty.game_id,
        team_id: penalty.team_id,
        player_id: penalty.player_id,
        penalty_type: penalty.penalty_type.clone(),
        period: penalty
            .period
            .map(int_from_u32)
            .transpose()
            .map_err(GameRepositoryError::query)?,
        game_clock: penalty.game_clock.clone(),
        minutes: penalty
            .minutes
            .map(int_from_u32)
            .transpose()
            .map_err(GameRepositoryError::query)?,
        severity: penalty.severity.clone(),
        description: penalty.description.clone(),
        resulted_in_ejection: penalty.resulted_in_ejection,
        created_at: penalty.created_at,
    })
}

fn penalty_from_row(row: PenaltyRow) -> Penalty {
    Penalty {
        id: row.id,
        game_id: row.game_id,
        team_id: row.team_id,
        player_id: row.player_id,
        penalty_type: row.penalty_type,
        period: row.period.map(u32_from_int),
        game_clock: row.game_clock,
        minutes: row.minutes.map(u32_from_int),
        severity: row.severity,
        description: row.description,
        resulted_in_ejection: row.resulted_in_ejection,
        created_at: row.created_at,
    }
}

fn score_update_insert(update: &ScoreUpdate) -> ScoreUpdateInsert {
    ScoreUpdateInsert {
        id: update.id,
        game_id: update.game_id,
        actor: update.actor.clone(),
        previous_home_score: update.previous_home_score,
        previous_away_score: update.previous_away_score,
        new_home_score: update.new_home_score,
        new_away_score: update.new_away_score,
        notes: update.notes.clone(),
        created_at: update.created_at,
    }
}

fn score_update_from_row(row: ScoreUpdateRow) -> ScoreUpdate {
    ScoreUpdate {
        id: row.id,
        game_id: row.game_id,
        actor: row.actor,
        previous_home_score: row.previous_home_score,
        previous_away_score: row.previous_away_score,
        new_home_score: row.new_home_score,
        new_away_score: row.new_away_score,
        notes: row.notes,
        created_at: row.created_at,
    }
}

fn stat_from_row(row: PlayerGameStatRow) -> Result<PlayerGameStat, GameRepositoryError> {
    let kind = StatKind::parse(&row.kind).ok_or_else(|| {
        GameRepositoryError::query(format!("stat {} has unknown kind '{}'", row.id, row.kind))
    })?;

    Ok(PlayerGameStat {
        id: row.id,
        game_id: row.game_id,
        player_id: row.player_id,
        team_id: row.team_id,
        kind,
        value: row.value,
    })
}

#[async_trait]
impl GameRepository for DieselGameRepository {
    async fn find_game(&self, game_id: Uuid) -> Result<Option<Game>, GameRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let row: Option<GameRow> = games::table
            .find(game_id)
            .select(GameRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        row.map(game_from_row).transpose()
    }

    async fn save_game<'a>(
        &self,
        game: &Game,
        expected_status: GameStatus,
        score_update: Option<&'a ScoreUpdate>,
        events: &[GameEvent],
    ) -> Result<(), GameRepositoryError> {
        let game_id = game.id;
        let changeset = game_changeset(game)?;
        let update_row = score_update.map(score_update_insert);
        let audited_previous_scores = update_row
            .as_ref()
            .map(|row| (row.previous_home_score, row.previous_away_score));
        let event_rows: Vec<GameEventInsert> =
            events.iter().map(event_insert).collect::<Result<_, _>>()?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let outcome = conn
            .transaction::<_, SaveTxError, _>(|conn| {
                async move {
                    let (stored_status, stored_home, stored_away): (String, i32, i32) =
                        games::table
                            .find(game_id)
                            .select((games::status, games::home_score, games::away_score))
                            .for_update()
                            .first(conn)
                            .await?;
                    verify_locked_row(
                        &stored_status,
                        (stored_home, stored_away),
                        expected_status,
                        audited_previous_scores,
                    )?;

                    diesel::update(games::table.find(game_id))
                        .set(&changeset)
                        .execute(conn)
                        .await?;
                    if let Some(row) = &update_row {
                        diesel::insert_into(score_updates::table)
                            .values(row)
                            .execute(conn)
                            .await?;
                    }
                    diesel::insert_into(game_events::table)
                        .values(&event_rows)
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(SaveTxError::Diesel(err)) => Err(map_query_error(err)),
            Err(SaveTxError::Concurrency { found }) => {
                Err(GameRepositoryError::Concurrency { game_id, found })
            }
            Err(SaveTxError::UnknownStatus(status)) => Err(GameRepositoryError::query(format!(
                "game {game_id} has unknown status '{status}'"
            ))),
        }
    }

    async fn append_event(&self, event: &GameEvent) -> Result<(), GameRepositoryError> {
        let row = event_insert(event)?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        diesel::insert_into(game_events::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_query_error)?;
        Ok(())
    }

    async fn record_penalty(
        &self,
        penalty: &Penalty,
        event: &GameEvent,
    ) -> Result<(), GameRepositoryError> {
        let penalty_row = penalty_insert(penalty)?;
        let event_row = event_insert(event)?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(penalties::table)
                    .values(&penalty_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(game_events::table)
                    .values(&event_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)
    }

    async fn set_player_stat(
        &self,
        stat: &PlayerGameStat,
    ) -> Result<PlayerGameStat, GameRepositoryError> {
        let row = PlayerGameStatInsert {
            id: stat.id,
            game_id: stat.game_id,
            player_id: stat.player_id,
            team_id: stat.team_id,
            kind: stat.kind.as_str().to_owned(),
            value: stat.value,
        };

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let saved: PlayerGameStatRow = diesel::insert_into(player_game_stats::table)
            .values(&row)
            .on_conflict((
                player_game_stats::game_id,
                player_game_stats::player_id,
                player_game_stats::kind,
            ))
            .do_update()
            .set(player_game_stats::value.eq(stat.value))
            .returning(PlayerGameStatRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        stat_from_row(saved)
    }

    async fn increment_player_stat(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        team_id: Uuid,
        kind: StatKind,
        delta: i32,
    ) -> Result<PlayerGameStat, GameRepositoryError> {
        let row = PlayerGameStatInsert {
            id: Uuid::new_v4(),
            game_id,
            player_id,
            team_id,
            kind: kind.as_str().to_owned(),
            value: delta,
        };

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let saved: PlayerGameStatRow = diesel::insert_into(player_game_stats::table)
            .values(&row)
            .on_conflict((
                player_game_stats::game_id,
                player_game_stats::player_id,
                player_game_stats::kind,
            ))
            .do_update()
            .set(player_game_stats::value.eq(player_game_stats::value + delta))
            .returning(PlayerGameStatRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        stat_from_row(saved)
    }

    async fn list_player_stats(
        &self,
        game_id: Uuid,
    ) -> Result<Vec<PlayerGameStat>, GameRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<PlayerGameStatRow> = player_game_stats::table
            .filter(player_game_stats::game_id.eq(game_id))
            .select(PlayerGameStatRow::as_select())
            .order((
                player_game_stats::player_id.asc(),
                player_game_stats::kind.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(stat_from_row).collect()
    }

    async fn list_events(&self, game_id: Uuid) -> Result<Vec<GameEvent>, GameRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<GameEventRow> = game_events::table
            .filter(game_events::game_id.eq(game_id))
            .select(GameEventRow::as_select())
            .order(game_events::occurred_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(event_from_row).collect()
    }

    async fn list_penalties(&self, game_id: Uuid) -> Result<Vec<Penalty>, GameRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<PenaltyRow> = penalties::table
            .filter(penalties::game_id.eq(game_id))
            .select(PenaltyRow::as_select())
            .order(penalties::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows.into_iter().map(penalty_from_row).collect())
    }

    async fn list_score_updates(
        &self,
        game_id: Uuid,
    ) -> Result<Vec<ScoreUpdate>, GameRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<ScoreUpdateRow> = score_updates::table
            .filter(score_updates::game_id.eq(game_id))
            .select(ScoreUpdateRow::as_select())
            .order(score_updates::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows.into_iter().map(score_update_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; pool-backed paths are exercised in
    //! integration environments with a live database.

    use chrono::{DateTime, TimeZone};
    use rstest::rstest;

    use crate::domain::live::PeriodScore;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 19, 0, 0).single().expect("valid timestamp")
    }

    fn sample_game() -> Game {
        let mut game = Game::scheduled(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        game.start(now()).expect("start");
        game.apply_score(2, 1, now()).expect("score");
        game.set_halftime().expect("halftime");
        game
    }

    #[rstest]
    fn game_round_trips_through_its_row() {
        let game = sample_game();
        let changeset = game_changeset(&game).expect("serialisable game");
        assert_eq!(changeset.status, "halftime");

        let row = GameRow {
            id: game.id,
            season_id: game.season_id,
            match_id: game.match_id,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            status: changeset.status.clone(),
            home_score: changeset.home_score,
            away_score: changeset.away_score,
            home_score_regulation: changeset.home_score_regulation,
            away_score_regulation: changeset.away_score_regulation,
            period_scores: changeset.period_scores.clone(),
            went_to_overtime: changeset.went_to_overtime,
            overtime_periods: changeset.overtime_periods,
            current_period: changeset.current_period,
            game_clock: changeset.game_clock.clone(),
            last_score_update: changeset.last_score_update,
            is_reconciled: changeset.is_reconciled,
            reconciled_by: changeset.reconciled_by.clone(),
            reconciled_at: changeset.reconciled_at,
            updated_at: changeset.updated_at,
        };
        let restored = game_from_row(row).expect("well-formed row");
        assert_eq!(restored, game);
        assert_eq!(
            restored.period_scores,
            vec![PeriodScore { period: 1, home: 2, away: 1 }]
        );
    }

    #[rstest]
    fn unknown_game_status_maps_to_query_error() {
        let game = sample_game();
        let changeset = game_changeset(&game).expect("serialisable game");
        let row = GameRow {
            id: game.id,
            season_id: game.season_id,
            match_id: game.match_id,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            status: "suspended".to_owned(),
            home_score: changeset.home_score,
            away_score: changeset.away_score,
            home_score_regulation: None,
            away_score_regulation: None,
            period_scores: changeset.period_scores,
            went_to_overtime: false,
            overtime_periods: 0,
            current_period: 1,
            game_clock: None,
            last_score_update: None,
            is_reconciled: false,
            reconciled_by: None,
            reconciled_at: None,
            updated_at: changeset.updated_at,
        };
        let err = game_from_row(row).expect_err("unknown status");
        assert!(matches!(err, GameRepositoryError::Query { .. }));
    }

    #[rstest]
    fn event_round_trips_through_its_row() {
        let event = GameEvent {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            kind: GameEventKind::Goal,
            team_id: Some(Uuid::new_v4()),
            player_id: Some(Uuid::new_v4()),
            period: Some(2),
            game_clock: Some("04:12".to_owned()),
            details: serde_json::json!({"assist": true}),
            description: Some("header from the corner".to_owned()),
            occurred_at: now(),
        };

        let insert = event_insert(&event).expect("in-range period");
        let restored = event_from_row(GameEventRow {
            id: insert.id,
            game_id: insert.game_id,
            kind: insert.kind,
            team_id: insert.team_id,
            player_id: insert.player_id,
            period: insert.period,
            game_clock: insert.game_clock,
            details: insert.details,
            description: insert.description,
            occurred_at: insert.occurred_at,
        })
        .expect("well-formed row");
        assert_eq!(restored, event);
    }

    #[rstest]
    fn unknown_stat_kind_maps_to_query_error() {
        let row = PlayerGameStatRow {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            kind: "rebounds".to_owned(),
            value: 7,
        };
        let err = stat_from_row(row).expect_err("unknown kind");
        assert!(matches!(err, GameRepositoryError::Query { .. }));
    }

    #[rstest]
    fn penalty_minutes_round_trip() {
        let penalty = Penalty {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            player_id: Some(Uuid::new_v4()),
            penalty_type: "tripping".to_owned(),
            period: Some(3),
            game_clock: Some("11:30".to_owned()),
            minutes: Some(2),
            severity: Some("minor".to_owned()),
            description: None,
            resulted_in_ejection: false,
            created_at: now(),
        };

        let insert = penalty_insert(&penalty).expect("in-range minutes");
        let restored = penalty_from_row(PenaltyRow {
            id: insert.id,
            game_id: insert.game_id,
            team_id: insert.team_id,
            player_id: insert.player_id,
            penalty_type: insert.penalty_type,
            period: insert.period,
            game_clock: insert.game_clock,
            minutes: insert.minutes,
            severity: insert.severity,
            description: insert.description,
            resulted_in_ejection: insert.resulted_in_ejection,
            created_at: insert.created_at,
        });
        assert_eq!(restored, penalty);
    }

    fn sample_score_update(previous: (i32, i32), new: (i32, i32)) -> ScoreUpdate {
        ScoreUpdate {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            actor: Some("scorer-1".to_owned()),
            previous_home_score: previous.0,
            previous_away_score: previous.1,
            new_home_score: new.0,
            new_away_score: new.1,
            notes: None,
            created_at: now(),
        }
    }

    #[rstest]
    fn locked_row_guard_accepts_matching_status_and_scores() {
        let row = score_update_insert(&sample_score_update((2, 1), (3, 1)));
        let previous = Some((row.previous_home_score, row.previous_away_score));

        let outcome = verify_locked_row("in_progress", (2, 1), GameStatus::InProgress, previous);
        assert!(outcome.is_ok());
    }

    #[rstest]
    #[case((3, 1))]
    #[case((2, 2))]
    fn locked_row_guard_rejects_stale_scores(#[case] stored: (i32, i32)) {
        let row = score_update_insert(&sample_score_update((2, 1), (3, 1)));
        let previous = Some((row.previous_home_score, row.previous_away_score));

        let outcome = verify_locked_row("in_progress", stored, GameStatus::InProgress, previous);
        assert!(matches!(
            outcome,
            Err(SaveTxError::Concurrency { found: GameStatus::InProgress })
        ));
    }

    #[rstest]
    fn locked_row_guard_rejects_changed_status() {
        let outcome = verify_locked_row("halftime", (2, 1), GameStatus::InProgress, None);
        assert!(matches!(
            outcome,
            Err(SaveTxError::Concurrency { found: GameStatus::Halftime })
        ));
    }

    #[rstest]
    fn locked_row_guard_ignores_scores_without_an_audit_row() {
        let outcome = verify_locked_row("in_progress", (5, 5), GameStatus::InProgress, None);
        assert!(outcome.is_ok());
    }

    #[rstest]
    fn locked_row_guard_rejects_unknown_status() {
        let outcome = verify_locked_row("suspended", (0, 0), GameStatus::InProgress, None);
        assert!(matches!(outcome, Err(SaveTxError::UnknownStatus(status)) if status == "suspended"));
    }
}
