//! Tests for the schedule workflow service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockDraftRepository, MockSeasonRepository, ReorderEntry};
use crate::domain::schedule::{
    BlackoutDate, BlackoutScope, ConflictKind, ConflictSeverity, GenerationParams,
};

fn generation_params() -> GenerationParams {
    GenerationParams {
        start_date: "2025-01-01".parse().expect("valid date"),
        interval_days: 7,
        double_round_robin: false,
        shuffle_seed: None,
        respect_blackouts: true,
    }
}

fn sample_draft(status: DraftStatus) -> ScheduleDraft {
    ScheduleDraft {
        id: Uuid::new_v4(),
        league_id: Uuid::new_v4(),
        season_id: Uuid::new_v4(),
        name: "spring".to_owned(),
        status,
        params: generation_params(),
        conflict_count: 0,
        created_at: Utc::now(),
        submitted_at: None,
        reviewed_at: None,
        reviewed_by: None,
        rejection_reason: None,
    }
}

fn team_refs(n: usize) -> Vec<TeamRef> {
    (0..n)
        .map(|i| TeamRef {
            id: Uuid::new_v4(),
            name: format!("Team {i}"),
        })
        .collect()
}

fn draft_match(draft_id: Uuid, day: u32, date: &str) -> DraftMatch {
    DraftMatch {
        id: Uuid::new_v4(),
        draft_id,
        home_team_id: Uuid::new_v4(),
        away_team_id: Uuid::new_v4(),
        kickoff: Utc
            .from_utc_datetime(
                &format!("{date}T18:00:00")
                    .parse()
                    .expect("valid timestamp"),
            ),
        venue_id: None,
        matchday: day,
        display_order: 0,
        has_conflict: false,
    }
}

fn blocking_conflict(draft_match_id: Uuid) -> ScheduleConflict {
    ScheduleConflict {
        draft_match_id,
        kind: ConflictKind::DoubleBooking,
        severity: ConflictSeverity::Error,
        description: "a team has multiple matches scheduled on 2025-01-01".to_owned(),
        auto_resolvable: false,
        suggested_resolution: None,
    }
}

fn service(
    drafts: MockDraftRepository,
    seasons: MockSeasonRepository,
) -> ScheduleService<MockDraftRepository, MockSeasonRepository> {
    ScheduleService::new(Arc::new(drafts), Arc::new(seasons))
}

#[tokio::test]
async fn generate_builds_a_full_round_robin_draft() {
    let season_id = Uuid::new_v4();
    let teams = team_refs(4);

    let mut seasons = MockSeasonRepository::new();
    seasons.expect_season_exists().return_once(|_| Ok(true));
    seasons
        .expect_list_teams()
        .return_once(move |_| Ok(teams));
    seasons.expect_list_blackouts().return_once(|_| Ok(Vec::new()));

    let mut drafts = MockDraftRepository::new();
    drafts
        .expect_list_published_fixtures()
        .return_once(|_| Ok(Vec::new()));
    drafts
        .expect_insert_draft()
        .times(1)
        .withf(|draft, matches, conflicts, log| {
            draft.status == DraftStatus::Draft
                && matches.len() == 6
                && conflicts.is_empty()
                && log.action == DraftAction::Created
        })
        .return_once(|_, _, _, _| Ok(()));

    let service = service(drafts, seasons);
    let view = service
        .generate(GenerateScheduleRequest {
            league_id: Uuid::new_v4(),
            season_id,
            name: "spring".to_owned(),
            params: generation_params(),
            shuffle: false,
            actor: Some("scheduler".to_owned()),
        })
        .await
        .expect("generation succeeds");

    assert_eq!(view.matches.len(), 6);
    assert_eq!(view.draft.conflict_count, 0);
    let last_day = view.matches.iter().map(|m| m.matchday).max();
    assert_eq!(last_day, Some(3));
}

#[tokio::test]
async fn generate_with_one_team_is_an_invalid_request() {
    let mut seasons = MockSeasonRepository::new();
    seasons.expect_season_exists().return_once(|_| Ok(true));
    seasons
        .expect_list_teams()
        .return_once(|_| Ok(team_refs(1)));
    seasons.expect_list_blackouts().return_once(|_| Ok(Vec::new()));

    let mut drafts = MockDraftRepository::new();
    drafts.expect_insert_draft().times(0);

    let service = service(drafts, seasons);
    let error = service
        .generate(GenerateScheduleRequest {
            league_id: Uuid::new_v4(),
            season_id: Uuid::new_v4(),
            name: "spring".to_owned(),
            params: generation_params(),
            shuffle: false,
            actor: None,
        })
        .await
        .expect_err("one team cannot play");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn generate_for_a_missing_season_is_not_found() {
    let mut seasons = MockSeasonRepository::new();
    seasons.expect_season_exists().return_once(|_| Ok(false));

    let service = service(MockDraftRepository::new(), seasons);
    let error = service
        .generate(GenerateScheduleRequest {
            league_id: Uuid::new_v4(),
            season_id: Uuid::new_v4(),
            name: "spring".to_owned(),
            params: generation_params(),
            shuffle: false,
            actor: None,
        })
        .await
        .expect_err("missing season");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn submit_is_gated_by_blocking_conflicts() {
    let draft = sample_draft(DraftStatus::Draft);
    let conflict = blocking_conflict(Uuid::new_v4());

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts
        .expect_list_conflicts()
        .return_once(move |_| Ok(vec![conflict]));
    drafts.expect_update_draft().times(0);

    let service = service(drafts, MockSeasonRepository::new());
    let error = service
        .submit(ReviewRequest {
            draft_id: draft.id,
            actor: None,
            notes: None,
        })
        .await
        .expect_err("blocking conflicts");

    assert_eq!(error.code(), ErrorCode::ConflictBlocking);
}

#[tokio::test]
async fn submit_moves_a_clean_draft_to_pending_approval() {
    let draft = sample_draft(DraftStatus::Draft);

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts.expect_list_conflicts().return_once(|_| Ok(Vec::new()));
    drafts
        .expect_update_draft()
        .times(1)
        .withf(|draft, log| {
            draft.status == DraftStatus::PendingApproval
                && draft.submitted_at.is_some()
                && log.action == DraftAction::Submitted
        })
        .return_once(|_, _| Ok(()));

    let service = service(drafts, MockSeasonRepository::new());
    let updated = service
        .submit(ReviewRequest {
            draft_id: draft.id,
            actor: Some("scheduler".to_owned()),
            notes: None,
        })
        .await
        .expect("submission succeeds");

    assert_eq!(updated.status, DraftStatus::PendingApproval);
}

#[tokio::test]
async fn approve_requires_a_pending_draft() {
    let draft = sample_draft(DraftStatus::Draft);

    let mut drafts = MockDraftRepository::new();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(draft)));
    drafts.expect_update_draft().times(0);

    let service = service(drafts, MockSeasonRepository::new());
    let error = service
        .approve(ReviewRequest {
            draft_id: Uuid::new_v4(),
            actor: Some("reviewer".to_owned()),
            notes: None,
        })
        .await
        .expect_err("draft was never submitted");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn reject_requires_a_reason() {
    let drafts = MockDraftRepository::new();
    let service = service(drafts, MockSeasonRepository::new());

    let error = service
        .reject(ReviewRequest {
            draft_id: Uuid::new_v4(),
            actor: Some("reviewer".to_owned()),
            notes: Some("   ".to_owned()),
        })
        .await
        .expect_err("blank reason");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn reject_records_reason_and_reviewer() {
    let draft = sample_draft(DraftStatus::PendingApproval);

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts
        .expect_update_draft()
        .times(1)
        .withf(|draft, log| {
            draft.status == DraftStatus::Rejected
                && draft.rejection_reason.as_deref() == Some("weekend clash")
                && log.action == DraftAction::Rejected
        })
        .return_once(|_, _| Ok(()));

    let service = service(drafts, MockSeasonRepository::new());
    let updated = service
        .reject(ReviewRequest {
            draft_id: draft.id,
            actor: Some("reviewer".to_owned()),
            notes: Some("weekend clash".to_owned()),
        })
        .await
        .expect("rejection succeeds");

    assert_eq!(updated.reviewed_by.as_deref(), Some("reviewer"));
}

#[tokio::test]
async fn publish_converts_an_approved_draft() {
    let draft = sample_draft(DraftStatus::Approved);
    let matches = vec![
        draft_match(draft.id, 1, "2025-01-01"),
        draft_match(draft.id, 2, "2025-01-08"),
    ];
    let ids: Vec<Uuid> = matches.iter().map(|_| Uuid::new_v4()).collect();

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    let listed = matches.clone();
    drafts
        .expect_list_matches()
        .return_once(move |_| Ok(listed));
    let created = ids.clone();
    drafts
        .expect_publish()
        .times(1)
        .withf(|draft, matches, log| {
            draft.status == DraftStatus::Published
                && matches.len() == 2
                && log.action == DraftAction::Published
        })
        .return_once(move |_, _, _| Ok(created));

    let service = service(drafts, MockSeasonRepository::new());
    let response = service
        .publish(ReviewRequest {
            draft_id: draft.id,
            actor: Some("reviewer".to_owned()),
            notes: None,
        })
        .await
        .expect("publish succeeds");

    assert_eq!(response.draft.status, DraftStatus::Published);
    assert_eq!(response.match_ids, ids);
}

#[tokio::test]
async fn publish_conversion_failure_maps_to_conversion_failed() {
    let draft = sample_draft(DraftStatus::Approved);

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts.expect_list_matches().return_once(|_| Ok(Vec::new()));
    drafts
        .expect_publish()
        .return_once(|_, _, _| Err(DraftRepositoryError::conversion("season closed")));

    let service = service(drafts, MockSeasonRepository::new());
    let error = service
        .publish(ReviewRequest {
            draft_id: draft.id,
            actor: None,
            notes: None,
        })
        .await
        .expect_err("conversion fails");

    assert_eq!(error.code(), ErrorCode::ConversionFailed);
}

#[tokio::test]
async fn delete_refuses_published_drafts() {
    let draft = sample_draft(DraftStatus::Published);

    let mut drafts = MockDraftRepository::new();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(draft)));
    drafts.expect_delete_draft().times(0);

    let service = service(drafts, MockSeasonRepository::new());
    let error = service
        .delete(ReviewRequest {
            draft_id: Uuid::new_v4(),
            actor: None,
            notes: None,
        })
        .await
        .expect_err("published drafts are permanent");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn reorder_refuses_a_pending_draft() {
    let draft = sample_draft(DraftStatus::PendingApproval);

    let mut drafts = MockDraftRepository::new();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(draft)));
    drafts.expect_replace_matches().times(0);

    let service = service(drafts, MockSeasonRepository::new());
    let error = service
        .reorder(ReorderRequest {
            draft_id: Uuid::new_v4(),
            entries: Vec::new(),
            actor: None,
        })
        .await
        .expect_err("pending drafts are frozen");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn reorder_on_a_rejected_draft_returns_it_to_draft() {
    let draft = sample_draft(DraftStatus::Rejected);
    let entry = draft_match(draft.id, 1, "2025-01-01");
    let entry_id = entry.id;

    let mut seasons = MockSeasonRepository::new();
    seasons.expect_list_blackouts().return_once(|_| Ok(Vec::new()));

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts
        .expect_list_matches()
        .return_once(move |_| Ok(vec![entry]));
    drafts
        .expect_list_published_fixtures()
        .return_once(|_| Ok(Vec::new()));
    drafts
        .expect_replace_matches()
        .times(1)
        .withf(move |draft, matches, _, log| {
            draft.status == DraftStatus::Draft
                && matches.iter().any(|m| m.id == entry_id && m.matchday == 2)
                && log.action == DraftAction::Modified
        })
        .return_once(|_, _, _, _| Ok(()));

    let service = service(drafts, seasons);
    let view = service
        .reorder(ReorderRequest {
            draft_id: draft.id,
            entries: vec![ReorderEntry {
                draft_match_id: entry_id,
                matchday: 2,
                display_order: 0,
                kickoff: None,
            }],
            actor: None,
        })
        .await
        .expect("reorder succeeds");

    assert_eq!(view.draft.status, DraftStatus::Draft);
    assert!(view.draft.rejection_reason.is_none());
}

#[tokio::test]
async fn auto_resolve_shifts_blackout_conflicts_to_open_dates() {
    let draft = sample_draft(DraftStatus::Draft);
    let inside = draft_match(draft.id, 2, "2025-01-09");
    let blackout = BlackoutDate::try_new(
        Uuid::new_v4(),
        "2025-01-08".parse().expect("valid date"),
        "2025-01-10".parse().expect("valid date"),
        BlackoutScope::All,
        Some("arena closed".to_owned()),
    )
    .expect("valid blackout");

    let mut seasons = MockSeasonRepository::new();
    seasons
        .expect_list_blackouts()
        .return_once(move |_| Ok(vec![blackout]));

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts
        .expect_list_matches()
        .return_once(move |_| Ok(vec![inside]));
    drafts
        .expect_list_published_fixtures()
        .return_once(|_| Ok(Vec::new()));
    drafts
        .expect_replace_matches()
        .times(1)
        .withf(|draft, matches, conflicts, _| {
            draft.conflict_count == 0
                && conflicts.is_empty()
                && matches
                    .iter()
                    .all(|m| m.kickoff.date_naive().to_string() == "2025-01-11")
        })
        .return_once(|_, _, _, _| Ok(()));

    let service = service(drafts, seasons);
    let response = service
        .auto_resolve(ReviewRequest {
            draft_id: draft.id,
            actor: None,
            notes: None,
        })
        .await
        .expect("resolution succeeds");

    assert_eq!(response.shifted, 1);
    assert_eq!(response.remaining, 0);
}

#[tokio::test]
async fn export_uses_team_names() {
    let draft = sample_draft(DraftStatus::Draft);
    let mut entry = draft_match(draft.id, 1, "2025-01-01");
    let teams = team_refs(2);
    entry.home_team_id = teams[0].id;
    entry.away_team_id = teams[1].id;

    let mut seasons = MockSeasonRepository::new();
    seasons
        .expect_list_teams()
        .return_once(move |_| Ok(teams));
    seasons.expect_list_venues().return_once(|_| Ok(Vec::new()));

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts
        .expect_list_matches()
        .return_once(move |_| Ok(vec![entry]));

    let service = service(drafts, seasons);
    let payload = service
        .export(draft.id, TransferFormat::Csv)
        .await
        .expect("export succeeds");

    assert_eq!(payload.content_type, "text/csv");
    let text = String::from_utf8(payload.body).expect("utf8");
    assert!(text.contains("Team 0"));
    assert!(text.contains("Team 1"));
}

#[tokio::test]
async fn import_resolves_names_and_reports_unknown_teams() {
    let draft = sample_draft(DraftStatus::Draft);
    let teams = team_refs(2);
    let payload = format!(
        "matchday,date,time,home_team,away_team,venue,status\n\
         1,2025-02-01,18:00,{},{},,scheduled\n\
         1,2025-02-01,18:00,Ghosts,{},,scheduled\n",
        teams[0].name, teams[1].name, teams[1].name
    );

    let mut seasons = MockSeasonRepository::new();
    seasons
        .expect_list_teams()
        .return_once(move |_| Ok(teams));
    seasons.expect_list_venues().return_once(|_| Ok(Vec::new()));
    seasons.expect_list_blackouts().return_once(|_| Ok(Vec::new()));

    let mut drafts = MockDraftRepository::new();
    let found = draft.clone();
    drafts
        .expect_find_draft()
        .return_once(move |_| Ok(Some(found)));
    drafts.expect_list_matches().return_once(|_| Ok(Vec::new()));
    drafts
        .expect_list_published_fixtures()
        .return_once(|_| Ok(Vec::new()));
    drafts
        .expect_replace_matches()
        .times(1)
        .withf(|_, matches, _, log| {
            matches.len() == 1 && log.action == DraftAction::Modified
        })
        .return_once(|_, _, _, _| Ok(()));

    let service = service(drafts, seasons);
    let outcome = service
        .import(ImportRequest {
            draft_id: draft.id,
            format: TransferFormat::Csv,
            payload: payload.into_bytes(),
            actor: None,
        })
        .await
        .expect("import succeeds");

    assert_eq!(outcome.accepted, 1);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].row, 2);
    assert!(outcome.rejected[0].reason.contains("Ghosts"));
}
