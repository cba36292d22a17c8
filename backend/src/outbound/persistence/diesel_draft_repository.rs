//! Diesel-backed implementation of the draft storage port.
//!
//! Every mutation that touches more than one table runs inside a single
//! transaction, so a failure partway through leaves the draft exactly as it
//! was. The publish conversion builds all of its rows before the transaction
//! opens; a conversion failure therefore writes nothing.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::live::Game;
use crate::domain::ports::{DraftRepository, DraftRepositoryError};
use crate::domain::schedule::{
    ApprovalLogEntry, ConflictKind, ConflictSeverity, DraftAction, DraftMatch, DraftStatus,
    PublishedFixture, ScheduleConflict, ScheduleDraft,
};

use super::error_mapping::DbFault;
use super::models::{
    ApprovalLogInsert, ApprovalLogRow, DraftMatchInsert, DraftMatchRow, NewGameRow, NewMatchRow,
    PublishedMatchRow, ScheduleConflictInsert, ScheduleConflictRow, ScheduleDraftChangeset,
    ScheduleDraftRow, int_from_u32, u32_from_int,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    draft_matches, games, matches, schedule_approval_log, schedule_conflicts, schedule_drafts,
};

/// PostgreSQL adapter for draft storage.
#[derive(Clone)]
pub struct DieselDraftRepository {
    pool: DbPool,
}

impl DieselDraftRepository {
    /// Create a new repository backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn fault_error(fault: DbFault) -> DraftRepositoryError {
    match fault {
        DbFault::Query(message) => DraftRepositoryError::query(message),
        DbFault::Connection(message) => DraftRepositoryError::connection(message),
    }
}

fn pool_error(error: PoolError) -> DraftRepositoryError {
    fault_error(DbFault::from_pool(error))
}

fn map_query_error(error: diesel::result::Error) -> DraftRepositoryError {
    fault_error(DbFault::from_diesel(error))
}

fn draft_changeset(draft: &ScheduleDraft) -> Result<ScheduleDraftChangeset, DraftRepositoryError> {
    Ok(ScheduleDraftChangeset {
        id: draft.id,
        league_id: draft.league_id,
        season_id: draft.season_id,
        name: draft.name.clone(),
        status: draft.status.as_str().to_owned(),
        params: serde_json::to_value(&draft.params).map_err(|err| {
            DraftRepositoryError::query(format!("generation params do not serialise: {err}"))
        })?,
        conflict_count: int_from_u32(draft.conflict_count).map_err(DraftRepositoryError::query)?,
        created_at: draft.created_at,
        submitted_at: draft.submitted_at,
        reviewed_at: draft.reviewed_at,
        reviewed_by: draft.reviewed_by.clone(),
        rejection_reason: draft.rejection_reason.clone(),
    })
}

fn draft_from_row(row: ScheduleDraftRow) -> Result<ScheduleDraft, DraftRepositoryError> {
    let status = DraftStatus::parse(&row.status).ok_or_else(|| {
        DraftRepositoryError::query(format!("draft {} has unknown status '{}'", row.id, row.status))
    })?;
    let params = serde_json::from_value(row.params).map_err(|err| {
        DraftRepositoryError::query(format!("draft {} has malformed params: {err}", row.id))
    })?;

    Ok(ScheduleDraft {
        id: row.id,
        league_id: row.league_id,
        season_id: row.season_id,
        name: row.name,
        status,
        params,
        conflict_count: u32_from_int(row.conflict_count),
        created_at: row.created_at,
        submitted_at: row.submitted_at,
        reviewed_at: row.reviewed_at,
        reviewed_by: row.reviewed_by,
        rejection_reason: row.rejection_reason,
    })
}

fn match_insert(m: &DraftMatch) -> Result<DraftMatchInsert, DraftRepositoryError> {
    Ok(DraftMatchInsert {
        id: m.id,
        draft_id: m.draft_id,
        home_team_id: m.home_team_id,
        away_team_id: m.away_team_id,
        kickoff: m.kickoff,
        venue_id: m.venue_id,
        matchday: int_from_u32(m.matchday).map_err(DraftRepositoryError::query)?,
        display_order: int_from_u32(m.display_order).map_err(DraftRepositoryError::query)?,
        has_conflict: m.has_conflict,
    })
}

fn match_from_row(row: DraftMatchRow) -> DraftMatch {
    DraftMatch {
        id: row.id,
        draft_id: row.draft_id,
        home_team_id: row.home_team_id,
        away_team_id: row.away_team_id,
        kickoff: row.kickoff,
        venue_id: row.venue_id,
        matchday: u32_from_int(row.matchday),
        display_order: u32_from_int(row.display_order),
        has_conflict: row.has_conflict,
    }
}

fn conflict_insert(draft_id: Uuid, conflict: &ScheduleConflict) -> ScheduleConflictInsert {
    ScheduleConflictInsert {
        id: Uuid::new_v4(),
        draft_id,
        draft_match_id: conflict.draft_match_id,
        kind: conflict.kind.as_str().to_owned(),
        severity: conflict.severity.as_str().to_owned(),
        description: conflict.description.clone(),
        auto_resolvable: conflict.auto_resolvable,
        suggested_resolution: conflict.suggested_resolution.clone(),
    }
}

fn conflict_from_row(row: ScheduleConflictRow) -> Result<ScheduleConflict, DraftRepositoryError> {
    let kind = ConflictKind::parse(&row.kind).ok_or_else(|| {
        DraftRepositoryError::query(format!("conflict has unknown kind '{}'", row.kind))
    })?;
    let severity = ConflictSeverity::parse(&row.severity).ok_or_else(|| {
        DraftRepositoryError::query(format!("conflict has unknown severity '{}'", row.severity))
    })?;

    Ok(ScheduleConflict {
        draft_match_id: row.draft_match_id,
        kind,
        severity,
        description: row.description,
        auto_resolvable: row.auto_resolvable,
        suggested_resolution: row.suggested_resolution,
    })
}

fn log_insert(entry: &ApprovalLogEntry) -> ApprovalLogInsert {
    ApprovalLogInsert {
        id: entry.id,
        draft_id: entry.draft_id,
        action: entry.action.as_str().to_owned(),
        actor: entry.actor.clone(),
        notes: entry.notes.clone(),
        created_at: entry.created_at,
    }
}

fn log_from_row(row: ApprovalLogRow) -> Result<ApprovalLogEntry, DraftRepositoryError> {
    let action = DraftAction::parse(&row.action).ok_or_else(|| {
        DraftRepositoryError::query(format!(
            "approval log {} has unknown action '{}'",
            row.id, row.action
        ))
    })?;

    Ok(ApprovalLogEntry {
        id: row.id,
        draft_id: row.draft_id,
        action,
        actor: row.actor,
        notes: row.notes,
        created_at: row.created_at,
    })
}

fn fixture_from_row(row: PublishedMatchRow) -> PublishedFixture {
    PublishedFixture {
        match_id: row.id,
        home_team_id: row.home_team_id,
        away_team_id: row.away_team_id,
        kickoff: row.kickoff,
        venue_id: row.venue_id,
    }
}

/// Rows for one published match: the match itself and its scheduled game.
struct PublishRow {
    match_row: NewMatchRow,
    game_row: NewGameRow,
}

fn publish_rows(
    draft: &ScheduleDraft,
    matches: &[DraftMatch],
) -> Result<Vec<PublishRow>, DraftRepositoryError> {
    let now = Utc::now();
    matches
        .iter()
        .map(|m| {
            let match_id = Uuid::new_v4();
            let game = Game::scheduled(
                Uuid::new_v4(),
                draft.season_id,
                Some(match_id),
                m.home_team_id,
                m.away_team_id,
            );
            Ok(PublishRow {
                match_row: NewMatchRow {
                    id: match_id,
                    season_id: draft.season_id,
                    draft_id: Some(draft.id),
                    home_team_id: m.home_team_id,
                    away_team_id: m.away_team_id,
                    kickoff: m.kickoff,
                    venue_id: m.venue_id,
                    matchday: int_from_u32(m.matchday).map_err(DraftRepositoryError::conversion)?,
                    display_order: int_from_u32(m.display_order)
                        .map_err(DraftRepositoryError::conversion)?,
                    status: game.status.as_str().to_owned(),
                },
                game_row: NewGameRow {
                    id: game.id,
                    season_id: game.season_id,
                    match_id: game.match_id,
                    home_team_id: game.home_team_id,
                    away_team_id: game.away_team_id,
                    status: game.status.as_str().to_owned(),
                    home_score: game.home_score,
                    away_score: game.away_score,
                    home_score_regulation: game.home_score_regulation,
                    away_score_regulation: game.away_score_regulation,
                    period_scores: serde_json::Value::Array(Vec::new()),
                    went_to_overtime: game.went_to_overtime,
                    overtime_periods: 0,
                    current_period: 0,
                    game_clock: game.game_clock.clone(),
                    last_score_update: game.last_score_update,
                    is_reconciled: game.is_reconciled,
                    reconciled_by: game.reconciled_by.clone(),
                    reconciled_at: game.reconciled_at,
                    updated_at: now,
                },
            })
        })
        .collect()
}

#[async_trait]
impl DraftRepository for DieselDraftRepository {
    async fn insert_draft(
        &self,
        draft: &ScheduleDraft,
        matches: &[DraftMatch],
        conflicts: &[ScheduleConflict],
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        let draft_row = draft_changeset(draft)?;
        let match_rows: Vec<DraftMatchInsert> =
            matches.iter().map(match_insert).collect::<Result<_, _>>()?;
        let conflict_rows: Vec<ScheduleConflictInsert> = conflicts
            .iter()
            .map(|c| conflict_insert(draft.id, c))
            .collect();
        let log_row = log_insert(log);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(schedule_drafts::table)
                    .values(&draft_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(draft_matches::table)
                    .values(&match_rows)
                    .execute(conn)
                    .await?;
                diesel::insert_into(schedule_conflicts::table)
                    .values(&conflict_rows)
                    .execute(conn)
                    .await?;
                diesel::insert_into(schedule_approval_log::table)
                    .values(&log_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)
    }

    async fn find_draft(
        &self,
        draft_id: Uuid,
    ) -> Result<Option<ScheduleDraft>, DraftRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let row: Option<ScheduleDraftRow> = schedule_drafts::table
            .find(draft_id)
            .select(ScheduleDraftRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        row.map(draft_from_row).transpose()
    }

    async fn list_drafts(
        &self,
        season_id: Uuid,
    ) -> Result<Vec<ScheduleDraft>, DraftRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<ScheduleDraftRow> = schedule_drafts::table
            .filter(schedule_drafts::season_id.eq(season_id))
            .select(ScheduleDraftRow::as_select())
            .order(schedule_drafts::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(draft_from_row).collect()
    }

    async fn list_matches(&self, draft_id: Uuid) -> Result<Vec<DraftMatch>, DraftRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<DraftMatchRow> = draft_matches::table
            .filter(draft_matches::draft_id.eq(draft_id))
            .select(DraftMatchRow::as_select())
            .order((
                draft_matches::matchday.asc(),
                draft_matches::display_order.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows.into_iter().map(match_from_row).collect())
    }

    async fn list_conflicts(
        &self,
        draft_id: Uuid,
    ) -> Result<Vec<ScheduleConflict>, DraftRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<ScheduleConflictRow> = schedule_conflicts::table
            .filter(schedule_conflicts::draft_id.eq(draft_id))
            .select(ScheduleConflictRow::as_select())
            .order((
                schedule_conflicts::draft_match_id.asc(),
                schedule_conflicts::kind.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(conflict_from_row).collect()
    }

    async fn update_draft(
        &self,
        draft: &ScheduleDraft,
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        let draft_row = draft_changeset(draft)?;
        let log_row = log_insert(log);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::update(schedule_drafts::table.find(draft_row.id))
                    .set(&draft_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(schedule_approval_log::table)
                    .values(&log_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)
    }

    async fn replace_matches(
        &self,
        draft: &ScheduleDraft,
        matches: &[DraftMatch],
        conflicts: &[ScheduleConflict],
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        let draft_row = draft_changeset(draft)?;
        let match_rows: Vec<DraftMatchInsert> =
            matches.iter().map(match_insert).collect::<Result<_, _>>()?;
        let conflict_rows: Vec<ScheduleConflictInsert> = conflicts
            .iter()
            .map(|c| conflict_insert(draft.id, c))
            .collect();
        let log_row = log_insert(log);
        let draft_id = draft.id;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(
                    schedule_conflicts::table.filter(schedule_conflicts::draft_id.eq(draft_id)),
                )
                .execute(conn)
                .await?;
                diesel::delete(draft_matches::table.filter(draft_matches::draft_id.eq(draft_id)))
                    .execute(conn)
                    .await?;
                diesel::insert_into(draft_matches::table)
                    .values(&match_rows)
                    .execute(conn)
                    .await?;
                diesel::insert_into(schedule_conflicts::table)
                    .values(&conflict_rows)
                    .execute(conn)
                    .await?;
                diesel::update(schedule_drafts::table.find(draft_id))
                    .set(&draft_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(schedule_approval_log::table)
                    .values(&log_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)
    }

    async fn delete_draft(
        &self,
        draft_id: Uuid,
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        let log_row = log_insert(log);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(
                    schedule_conflicts::table.filter(schedule_conflicts::draft_id.eq(draft_id)),
                )
                .execute(conn)
                .await?;
                diesel::delete(draft_matches::table.filter(draft_matches::draft_id.eq(draft_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(schedule_drafts::table.find(draft_id))
                    .execute(conn)
                    .await?;
                diesel::insert_into(schedule_approval_log::table)
                    .values(&log_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)
    }

    async fn list_approval_log(
        &self,
        draft_id: Uuid,
    ) -> Result<Vec<ApprovalLogEntry>, DraftRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<ApprovalLogRow> = schedule_approval_log::table
            .filter(schedule_approval_log::draft_id.eq(draft_id))
            .select(ApprovalLogRow::as_select())
            .order(schedule_approval_log::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(log_from_row).collect()
    }

    async fn publish(
        &self,
        draft: &ScheduleDraft,
        matches: &[DraftMatch],
        log: &ApprovalLogEntry,
    ) -> Result<Vec<Uuid>, DraftRepositoryError> {
        // All conversions happen before the transaction opens; a failure
        // here writes nothing and the draft stays approved.
        let draft_row = draft_changeset(draft)?;
        let rows = publish_rows(draft, matches)?;
        let log_row = log_insert(log);

        let match_ids: Vec<Uuid> = rows.iter().map(|r| r.match_row.id).collect();
        let (match_rows, game_rows): (Vec<NewMatchRow>, Vec<NewGameRow>) =
            rows.into_iter().map(|r| (r.match_row, r.game_row)).unzip();

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(matches::table)
                    .values(&match_rows)
                    .execute(conn)
                    .await?;
                diesel::insert_into(games::table)
                    .values(&game_rows)
                    .execute(conn)
                    .await?;
                diesel::update(schedule_drafts::table.find(draft_row.id))
                    .set(&draft_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(schedule_approval_log::table)
                    .values(&log_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)?;

        Ok(match_ids)
    }

    async fn list_published_fixtures(
        &self,
        season_id: Uuid,
    ) -> Result<Vec<PublishedFixture>, DraftRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<PublishedMatchRow> = matches::table
            .filter(matches::season_id.eq(season_id))
            .select(PublishedMatchRow::as_select())
            .order(matches::kickoff.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows.into_iter().map(fixture_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; pool-backed paths are exercised in
    //! integration environments with a live database.

    use chrono::TimeZone;
    use rstest::rstest;

    use crate::domain::schedule::GenerationParams;

    use super::*;

    fn sample_draft() -> ScheduleDraft {
        ScheduleDraft {
            id: Uuid::new_v4(),
            league_id: Uuid::new_v4(),
            season_id: Uuid::new_v4(),
            name: "Spring fixtures".to_owned(),
            status: DraftStatus::Approved,
            params: GenerationParams {
                start_date: "2025-03-01".parse().expect("valid date literal"),
                interval_days: 7,
                double_round_robin: true,
                shuffle_seed: Some(42),
                respect_blackouts: true,
            },
            conflict_count: 2,
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).single().expect("valid"),
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            rejection_reason: None,
        }
    }

    fn sample_match(draft_id: Uuid) -> DraftMatch {
        DraftMatch {
            id: Uuid::new_v4(),
            draft_id,
            home_team_id: Uuid::new_v4(),
            away_team_id: Uuid::new_v4(),
            kickoff: Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).single().expect("valid"),
            venue_id: Some(Uuid::new_v4()),
            matchday: 1,
            display_order: 2,
            has_conflict: false,
        }
    }

    #[rstest]
    fn draft_round_trips_through_its_row() {
        let draft = sample_draft();
        let changeset = draft_changeset(&draft).expect("serialisable draft");
        assert_eq!(changeset.status, "approved");
        assert_eq!(changeset.conflict_count, 2);

        let row = ScheduleDraftRow {
            id: changeset.id,
            league_id: changeset.league_id,
            season_id: changeset.season_id,
            name: changeset.name,
            status: changeset.status,
            params: changeset.params,
            conflict_count: changeset.conflict_count,
            created_at: changeset.created_at,
            submitted_at: changeset.submitted_at,
            reviewed_at: changeset.reviewed_at,
            reviewed_by: changeset.reviewed_by,
            rejection_reason: changeset.rejection_reason,
        };
        let restored = draft_from_row(row).expect("well-formed row");
        assert_eq!(restored, draft);
    }

    #[rstest]
    #[case("pending")]
    #[case("PUBLISHED")]
    fn unknown_status_maps_to_query_error(#[case] status: &str) {
        let draft = sample_draft();
        let changeset = draft_changeset(&draft).expect("serialisable draft");
        let row = ScheduleDraftRow {
            id: changeset.id,
            league_id: changeset.league_id,
            season_id: changeset.season_id,
            name: changeset.name,
            status: status.to_owned(),
            params: changeset.params,
            conflict_count: changeset.conflict_count,
            created_at: changeset.created_at,
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            rejection_reason: None,
        };
        let err = draft_from_row(row).expect_err("unknown status");
        assert!(matches!(err, DraftRepositoryError::Query { .. }));
    }

    #[rstest]
    fn match_round_trips_through_its_row() {
        let m = sample_match(Uuid::new_v4());
        let insert = match_insert(&m).expect("in-range counts");
        let restored = match_from_row(DraftMatchRow {
            id: insert.id,
            draft_id: insert.draft_id,
            home_team_id: insert.home_team_id,
            away_team_id: insert.away_team_id,
            kickoff: insert.kickoff,
            venue_id: insert.venue_id,
            matchday: insert.matchday,
            display_order: insert.display_order,
            has_conflict: insert.has_conflict,
        });
        assert_eq!(restored, m);
    }

    #[rstest]
    fn unknown_conflict_kind_maps_to_query_error() {
        let row = ScheduleConflictRow {
            id: Uuid::new_v4(),
            draft_id: Uuid::new_v4(),
            draft_match_id: Uuid::new_v4(),
            kind: "curfew".to_owned(),
            severity: "warning".to_owned(),
            description: "out past bedtime".to_owned(),
            auto_resolvable: false,
            suggested_resolution: None,
        };
        let err = conflict_from_row(row).expect_err("unknown kind");
        assert!(matches!(err, DraftRepositoryError::Query { .. }));
    }

    #[rstest]
    fn publish_rows_pair_each_match_with_a_scheduled_game() {
        let draft = sample_draft();
        let matches = vec![sample_match(draft.id), sample_match(draft.id)];

        let rows = publish_rows(&draft, &matches).expect("convertible matches");
        assert_eq!(rows.len(), 2);
        for (row, source) in rows.iter().zip(&matches) {
            assert_eq!(row.match_row.season_id, draft.season_id);
            assert_eq!(row.match_row.draft_id, Some(draft.id));
            assert_eq!(row.match_row.kickoff, source.kickoff);
            assert_eq!(row.game_row.match_id, Some(row.match_row.id));
            assert_eq!(row.game_row.status, "scheduled");
            assert_eq!(row.game_row.home_score, 0);
        }
    }
}
