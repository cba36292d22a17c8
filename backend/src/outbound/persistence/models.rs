//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    blackout_dates, draft_matches, game_events, games, matches, penalties, player_game_stats,
    schedule_approval_log, schedule_conflicts, schedule_drafts, score_updates, teams, venues,
};

/// Convert an unsigned domain count to an integer column value.
pub(crate) fn int_from_u32(value: u32) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("value {value} exceeds integer column range"))
}

/// Read an integer column back as an unsigned domain count.
///
/// Negative values cannot occur under the schema's check constraints; they
/// clamp to zero rather than failing the whole read.
pub(crate) fn u32_from_int(value: i32) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Season context models
// ---------------------------------------------------------------------------

/// Row struct for reading from the teams table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeamRow {
    pub id: Uuid,
    #[expect(dead_code, reason = "filter column, not part of the domain view")]
    pub season_id: Uuid,
    pub name: String,
    #[expect(dead_code, reason = "schema field for audit trail support")]
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the venues table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = venues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VenueRow {
    pub id: Uuid,
    #[expect(dead_code, reason = "filter column, not part of the domain view")]
    pub season_id: Uuid,
    pub name: String,
    #[expect(dead_code, reason = "schema field for audit trail support")]
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the blackout_dates table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = blackout_dates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BlackoutDateRow {
    pub id: Uuid,
    #[expect(dead_code, reason = "filter column, not part of the domain view")]
    pub season_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub scope: String,
    pub team_ids: Option<Vec<Uuid>>,
    pub venue_id: Option<Uuid>,
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Schedule draft models
// ---------------------------------------------------------------------------

/// Row struct for reading from the schedule_drafts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedule_drafts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScheduleDraftRow {
    pub id: Uuid,
    pub league_id: Uuid,
    pub season_id: Uuid,
    pub name: String,
    pub status: String,
    pub params: serde_json::Value,
    pub conflict_count: i32,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub rejection_reason: Option<String>,
}

/// Insert/update struct covering the full schedule_drafts row.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = schedule_drafts)]
pub(crate) struct ScheduleDraftChangeset {
    pub id: Uuid,
    pub league_id: Uuid,
    pub season_id: Uuid,
    pub name: String,
    pub status: String,
    pub params: serde_json::Value,
    pub conflict_count: i32,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub rejection_reason: Option<String>,
}

/// Row struct for reading from the draft_matches table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = draft_matches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DraftMatchRow {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub kickoff: DateTime<Utc>,
    pub venue_id: Option<Uuid>,
    pub matchday: i32,
    pub display_order: i32,
    pub has_conflict: bool,
}

/// Insertable struct for draft_matches.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = draft_matches)]
pub(crate) struct DraftMatchInsert {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub kickoff: DateTime<Utc>,
    pub venue_id: Option<Uuid>,
    pub matchday: i32,
    pub display_order: i32,
    pub has_conflict: bool,
}

/// Row struct for reading from the schedule_conflicts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedule_conflicts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScheduleConflictRow {
    #[expect(dead_code, reason = "surrogate key, conflicts are replaced wholesale")]
    pub id: Uuid,
    #[expect(dead_code, reason = "filter column, not part of the domain view")]
    pub draft_id: Uuid,
    pub draft_match_id: Uuid,
    pub kind: String,
    pub severity: String,
    pub description: String,
    pub auto_resolvable: bool,
    pub suggested_resolution: Option<String>,
}

/// Insertable struct for schedule_conflicts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedule_conflicts)]
pub(crate) struct ScheduleConflictInsert {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub draft_match_id: Uuid,
    pub kind: String,
    pub severity: String,
    pub description: String,
    pub auto_resolvable: bool,
    pub suggested_resolution: Option<String>,
}

/// Row struct for reading from the schedule_approval_log table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedule_approval_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApprovalLogRow {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub action: String,
    pub actor: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for schedule_approval_log.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedule_approval_log)]
pub(crate) struct ApprovalLogInsert {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub action: String,
    pub actor: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading published fixtures from the matches table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = matches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PublishedMatchRow {
    pub id: Uuid,
    #[expect(dead_code, reason = "filter column, not part of the domain view")]
    pub season_id: Uuid,
    #[expect(dead_code, reason = "provenance column kept for reporting")]
    pub draft_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub kickoff: DateTime<Utc>,
    pub venue_id: Option<Uuid>,
    #[expect(dead_code, reason = "ordering column, not part of the domain view")]
    pub matchday: i32,
    #[expect(dead_code, reason = "ordering column, not part of the domain view")]
    pub display_order: i32,
    #[expect(dead_code, reason = "lifecycle column owned by the games table")]
    pub status: String,
}

/// Insertable struct for the matches table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = matches)]
pub(crate) struct NewMatchRow {
    pub id: Uuid,
    pub season_id: Uuid,
    pub draft_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub kickoff: DateTime<Utc>,
    pub venue_id: Option<Uuid>,
    pub matchday: i32,
    pub display_order: i32,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Live game models
// ---------------------------------------------------------------------------

/// Row struct for reading from the games table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GameRow {
    pub id: Uuid,
    pub season_id: Uuid,
    pub match_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub status: String,
    pub home_score: i32,
    pub away_score: i32,
    pub home_score_regulation: Option<i32>,
    pub away_score_regulation: Option<i32>,
    pub period_scores: serde_json::Value,
    pub went_to_overtime: bool,
    pub overtime_periods: i32,
    pub current_period: i32,
    pub game_clock: Option<String>,
    pub last_score_update: Option<DateTime<Utc>>,
    pub is_reconciled: bool,
    pub reconciled_by: Option<String>,
    pub reconciled_at: Option<DateTime<Utc>>,
    #[expect(dead_code, reason = "schema field for audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the games table, used by the publish conversion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = games)]
pub(crate) struct NewGameRow {
    pub id: Uuid,
    pub season_id: Uuid,
    pub match_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub status: String,
    pub home_score: i32,
    pub away_score: i32,
    pub home_score_regulation: Option<i32>,
    pub away_score_regulation: Option<i32>,
    pub period_scores: serde_json::Value,
    pub went_to_overtime: bool,
    pub overtime_periods: i32,
    pub current_period: i32,
    pub game_clock: Option<String>,
    pub last_score_update: Option<DateTime<Utc>>,
    pub is_reconciled: bool,
    pub reconciled_by: Option<String>,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset covering every mutable games column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = games)]
pub(crate) struct GameChangeset {
    pub status: String,
    pub home_score: i32,
    pub away_score: i32,
    pub home_score_regulation: Option<i32>,
    pub away_score_regulation: Option<i32>,
    pub period_scores: serde_json::Value,
    pub went_to_overtime: bool,
    pub overtime_periods: i32,
    pub current_period: i32,
    pub game_clock: Option<String>,
    pub last_score_update: Option<DateTime<Utc>>,
    pub is_reconciled: bool,
    pub reconciled_by: Option<String>,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the score_updates table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = score_updates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScoreUpdateRow {
    pub id: Uuid,
    pub game_id: Uuid,
    pub actor: Option<String>,
    pub previous_home_score: i32,
    pub previous_away_score: i32,
    pub new_home_score: i32,
    pub new_away_score: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for score_updates.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = score_updates)]
pub(crate) struct ScoreUpdateInsert {
    pub id: Uuid,
    pub game_id: Uuid,
    pub actor: Option<String>,
    pub previous_home_score: i32,
    pub previous_away_score: i32,
    pub new_home_score: i32,
    pub new_away_score: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the game_events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = game_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GameEventRow {
    pub id: Uuid,
    pub game_id: Uuid,
    pub kind: String,
    pub team_id: Option<Uuid>,
    pub player_id: Option<Uuid>,
    pub period: Option<i32>,
    pub game_clock: Option<String>,
    pub details: serde_json::Value,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Insertable struct for game_events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = game_events)]
pub(crate) struct GameEventInsert {
    pub id: Uuid,
    pub game_id: Uuid,
    pub kind: String,
    pub team_id: Option<Uuid>,
    pub player_id: Option<Uuid>,
    pub period: Option<i32>,
    pub game_clock: Option<String>,
    pub details: serde_json::Value,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Row struct for reading from the penalties table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = penalties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PenaltyRow {
    pub id: Uuid,
    pub game_id: Uuid,
    pub team_id: Uuid,
    pub player_id: Option<Uuid>,
    pub penalty_type: String,
    pub period: Option<i32>,
    pub game_clock: Option<String>,
    pub minutes: Option<i32>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub resulted_in_ejection: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for penalties.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = penalties)]
pub(crate) struct PenaltyInsert {
    pub id: Uuid,
    pub game_id: Uuid,
    pub team_id: Uuid,
    pub player_id: Option<Uuid>,
    pub penalty_type: String,
    pub period: Option<i32>,
    pub game_clock: Option<String>,
    pub minutes: Option<i32>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub resulted_in_ejection: bool,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the player_game_stats table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = player_game_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlayerGameStatRow {
    pub id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub kind: String,
    pub value: i32,
}

/// Insertable struct for player_game_stats.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = player_game_stats)]
pub(crate) struct PlayerGameStatInsert {
    pub id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub kind: String,
    pub value: i32,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(38, 38)]
    fn u32_round_trips_through_integer_columns(#[case] value: u32, #[case] expected: i32) {
        let stored = int_from_u32(value).expect("fits in an integer column");
        assert_eq!(stored, expected);
        assert_eq!(u32_from_int(stored), value);
    }

    #[rstest]
    fn oversized_count_is_rejected() {
        let err = int_from_u32(u32::MAX).expect_err("exceeds i32");
        assert!(err.contains("exceeds"));
    }

    #[rstest]
    fn negative_column_values_clamp_to_zero() {
        assert_eq!(u32_from_int(-1), 0);
    }
}
