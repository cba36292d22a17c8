//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//! When migrations change the schema, regenerate or update this file to match.

diesel::table! {
    /// Seasons within a league.
    seasons (id) {
        id -> Uuid,
        league_id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Teams registered for a season.
    teams (id) {
        id -> Uuid,
        season_id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Venues available to a season.
    venues (id) {
        id -> Uuid,
        season_id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Date ranges during which applicable matches must not be scheduled.
    ///
    /// `scope` is one of "all", "teams", or "venue"; `team_ids` is set only
    /// for team scopes and `venue_id` only for venue scopes.
    blackout_dates (id) {
        id -> Uuid,
        season_id -> Uuid,
        start_date -> Date,
        end_date -> Date,
        scope -> Varchar,
        team_ids -> Nullable<Array<Uuid>>,
        venue_id -> Nullable<Uuid>,
        reason -> Nullable<Text>,
    }
}

diesel::table! {
    /// Named schedule proposals moving through the approval workflow.
    schedule_drafts (id) {
        id -> Uuid,
        league_id -> Uuid,
        season_id -> Uuid,
        name -> Varchar,
        status -> Varchar,
        params -> Jsonb,
        conflict_count -> Int4,
        created_at -> Timestamptz,
        submitted_at -> Nullable<Timestamptz>,
        reviewed_at -> Nullable<Timestamptz>,
        reviewed_by -> Nullable<Varchar>,
        rejection_reason -> Nullable<Text>,
    }
}

diesel::table! {
    /// Proposed matches belonging to a draft.
    draft_matches (id) {
        id -> Uuid,
        draft_id -> Uuid,
        home_team_id -> Uuid,
        away_team_id -> Uuid,
        kickoff -> Timestamptz,
        venue_id -> Nullable<Uuid>,
        matchday -> Int4,
        display_order -> Int4,
        has_conflict -> Bool,
    }
}

diesel::table! {
    /// Conflicts attached to a draft's matches, replaced on each detection run.
    schedule_conflicts (id) {
        id -> Uuid,
        draft_id -> Uuid,
        draft_match_id -> Uuid,
        kind -> Varchar,
        severity -> Varchar,
        description -> Text,
        auto_resolvable -> Bool,
        suggested_resolution -> Nullable<Text>,
    }
}

diesel::table! {
    /// Immutable audit trail of draft workflow actions.
    schedule_approval_log (id) {
        id -> Uuid,
        draft_id -> Uuid,
        action -> Varchar,
        actor -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published matches created from approved drafts.
    matches (id) {
        id -> Uuid,
        season_id -> Uuid,
        draft_id -> Nullable<Uuid>,
        home_team_id -> Uuid,
        away_team_id -> Uuid,
        kickoff -> Timestamptz,
        venue_id -> Nullable<Uuid>,
        matchday -> Int4,
        display_order -> Int4,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Live scoring state, one row per game.
    games (id) {
        id -> Uuid,
        season_id -> Uuid,
        match_id -> Nullable<Uuid>,
        home_team_id -> Uuid,
        away_team_id -> Uuid,
        status -> Varchar,
        home_score -> Int4,
        away_score -> Int4,
        home_score_regulation -> Nullable<Int4>,
        away_score_regulation -> Nullable<Int4>,
        period_scores -> Jsonb,
        went_to_overtime -> Bool,
        overtime_periods -> Int4,
        current_period -> Int4,
        game_clock -> Nullable<Varchar>,
        last_score_update -> Nullable<Timestamptz>,
        is_reconciled -> Bool,
        reconciled_by -> Nullable<Varchar>,
        reconciled_at -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail of score changes.
    score_updates (id) {
        id -> Uuid,
        game_id -> Uuid,
        actor -> Nullable<Varchar>,
        previous_home_score -> Int4,
        previous_away_score -> Int4,
        new_home_score -> Int4,
        new_away_score -> Int4,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Timestamped occurrences within games.
    game_events (id) {
        id -> Uuid,
        game_id -> Uuid,
        kind -> Varchar,
        team_id -> Nullable<Uuid>,
        player_id -> Nullable<Uuid>,
        period -> Nullable<Int4>,
        game_clock -> Nullable<Varchar>,
        details -> Jsonb,
        description -> Nullable<Text>,
        occurred_at -> Timestamptz,
    }
}

diesel::table! {
    /// Penalties recorded against teams or players.
    penalties (id) {
        id -> Uuid,
        game_id -> Uuid,
        team_id -> Uuid,
        player_id -> Nullable<Uuid>,
        penalty_type -> Varchar,
        period -> Nullable<Int4>,
        game_clock -> Nullable<Varchar>,
        minutes -> Nullable<Int4>,
        severity -> Nullable<Varchar>,
        description -> Nullable<Text>,
        resulted_in_ejection -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-player stat lines, one row per (game, player, kind).
    player_game_stats (id) {
        id -> Uuid,
        game_id -> Uuid,
        player_id -> Uuid,
        team_id -> Uuid,
        kind -> Varchar,
        value -> Int4,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    schedule_drafts,
    draft_matches,
    schedule_conflicts,
    schedule_approval_log,
    matches,
);

diesel::allow_tables_to_appear_in_same_query!(
    games,
    score_updates,
    game_events,
    penalties,
    player_game_stats,
);
