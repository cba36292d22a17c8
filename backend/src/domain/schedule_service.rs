//! Schedule workflow service.
//!
//! Implements the [`ScheduleWorkflow`] driving port on top of the draft and
//! season repositories: generation, conflict detection, the approval state
//! machine, auto-resolution, and schedule transfer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{
    AutoResolveResponse, DraftRepository, DraftRepositoryError, DraftView, ExportPayload,
    GenerateScheduleRequest, ImportOutcome, ImportRequest, PublishResponse, ReorderRequest,
    ReviewRequest, ScheduleWorkflow, SeasonRepository, SeasonRepositoryError, TeamRef, VenueRef,
};
use crate::domain::schedule::{
    ApprovalLogEntry, DraftAction, DraftMatch, DraftStatus, FixtureParams, ImportRejection,
    ScheduleConflict, ScheduleDraft, ScheduleRow, TransferFormat, auto_resolve, detect_conflicts,
    export_rows, generate_fixtures, has_blocking, parse_import, unresolved_count,
};

/// Kickoff time assigned to generated matchdays until an editor sets one.
fn default_kickoff() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()
}

fn map_draft_error(error: DraftRepositoryError) -> Error {
    match error {
        DraftRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("draft repository unavailable: {message}"))
        }
        DraftRepositoryError::Query { message } => {
            Error::internal(format!("draft repository error: {message}"))
        }
        DraftRepositoryError::Conversion { message } => {
            Error::conversion_failed(format!("publish conversion failed: {message}"))
        }
    }
}

fn map_season_error(error: SeasonRepositoryError) -> Error {
    match error {
        SeasonRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("season repository unavailable: {message}"))
        }
        SeasonRepositoryError::Query { message } => {
            Error::internal(format!("season repository error: {message}"))
        }
    }
}

/// Schedule service implementing the workflow driving port.
#[derive(Clone)]
pub struct ScheduleService<D, S> {
    drafts: Arc<D>,
    seasons: Arc<S>,
}

impl<D, S> ScheduleService<D, S> {
    /// Create a new service over the draft and season repositories.
    pub fn new(drafts: Arc<D>, seasons: Arc<S>) -> Self {
        Self { drafts, seasons }
    }
}

impl<D, S> ScheduleService<D, S>
where
    D: DraftRepository,
    S: SeasonRepository,
{
    async fn load_draft(&self, draft_id: Uuid) -> Result<ScheduleDraft, Error> {
        self.drafts
            .find_draft(draft_id)
            .await
            .map_err(map_draft_error)?
            .ok_or_else(|| Error::not_found(format!("schedule draft {draft_id} not found")))
    }

    async fn load_view(&self, draft: ScheduleDraft) -> Result<DraftView, Error> {
        let matches = self
            .drafts
            .list_matches(draft.id)
            .await
            .map_err(map_draft_error)?;
        let conflicts = self
            .drafts
            .list_conflicts(draft.id)
            .await
            .map_err(map_draft_error)?;
        Ok(DraftView {
            draft,
            matches,
            conflicts,
        })
    }

    /// Run detection for the draft's matches against season blackouts and
    /// already published fixtures, and mark the flagged matches.
    async fn detect(
        &self,
        season_id: Uuid,
        matches: &mut [DraftMatch],
    ) -> Result<Vec<ScheduleConflict>, Error> {
        let blackouts = self
            .seasons
            .list_blackouts(season_id)
            .await
            .map_err(map_season_error)?;
        let published = self
            .drafts
            .list_published_fixtures(season_id)
            .await
            .map_err(map_draft_error)?;
        let conflicts = detect_conflicts(matches, &blackouts, &published);
        mark_conflicted(matches, &conflicts);
        Ok(conflicts)
    }

    /// Editable gate shared by reorder, import, and auto-resolve. A rejected
    /// draft re-enters `draft` on its first edit.
    fn ensure_editable(draft: &mut ScheduleDraft) -> Result<(), Error> {
        if !draft.status.is_editable() {
            return Err(Error::invalid_transition(format!(
                "draft cannot be edited while {}",
                draft.status.as_str()
            )));
        }
        if draft.status == DraftStatus::Rejected {
            draft.status = DraftStatus::Draft;
            draft.rejection_reason = None;
        }
        Ok(())
    }

    async fn persist_edit(
        &self,
        mut draft: ScheduleDraft,
        matches: Vec<DraftMatch>,
        conflicts: Vec<ScheduleConflict>,
        actor: Option<String>,
        notes: String,
    ) -> Result<DraftView, Error> {
        draft.conflict_count = unresolved_count(&conflicts);
        let log = log_entry(draft.id, DraftAction::Modified, actor, Some(notes));
        self.drafts
            .replace_matches(&draft, &matches, &conflicts, &log)
            .await
            .map_err(map_draft_error)?;
        Ok(DraftView {
            draft,
            matches,
            conflicts,
        })
    }

    async fn season_teams(&self, season_id: Uuid) -> Result<Vec<TeamRef>, Error> {
        self.seasons
            .list_teams(season_id)
            .await
            .map_err(map_season_error)
    }

    async fn season_venues(&self, season_id: Uuid) -> Result<Vec<VenueRef>, Error> {
        self.seasons
            .list_venues(season_id)
            .await
            .map_err(map_season_error)
    }
}

fn log_entry(
    draft_id: Uuid,
    action: DraftAction,
    actor: Option<String>,
    notes: Option<String>,
) -> ApprovalLogEntry {
    ApprovalLogEntry {
        id: Uuid::new_v4(),
        draft_id,
        action,
        actor,
        notes,
        created_at: Utc::now(),
    }
}

fn mark_conflicted(matches: &mut [DraftMatch], conflicts: &[ScheduleConflict]) {
    for entry in matches.iter_mut() {
        entry.has_conflict = conflicts.iter().any(|c| c.draft_match_id == entry.id);
    }
}

fn blocking_error(conflicts: &[ScheduleConflict]) -> Error {
    let errors = conflicts
        .iter()
        .filter(|c| c.severity == crate::domain::schedule::ConflictSeverity::Error)
        .count();
    Error::conflict_blocking(format!(
        "draft has {errors} blocking conflicts; resolve them before submitting"
    ))
    .with_details(serde_json::json!({ "blockingConflicts": errors }))
}

#[async_trait]
impl<D, S> ScheduleWorkflow for ScheduleService<D, S>
where
    D: DraftRepository,
    S: SeasonRepository,
{
    async fn generate(&self, request: GenerateScheduleRequest) -> Result<DraftView, Error> {
        if !self
            .seasons
            .season_exists(request.season_id)
            .await
            .map_err(map_season_error)?
        {
            return Err(Error::not_found(format!(
                "season {} not found",
                request.season_id
            )));
        }
        if request.name.trim().is_empty() {
            return Err(Error::invalid_request("draft name must not be empty"));
        }

        let mut params = request.params;
        if request.shuffle && params.shuffle_seed.is_none() {
            params.shuffle_seed = Some(rand::random());
        }

        let teams = self.season_teams(request.season_id).await?;
        let team_ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();
        let blackouts = self
            .seasons
            .list_blackouts(request.season_id)
            .await
            .map_err(map_season_error)?;

        let fixture_params = FixtureParams {
            start_date: params.start_date,
            interval_days: params.interval_days,
            double_round_robin: params.double_round_robin,
            shuffle_seed: params.shuffle_seed,
            respect_blackouts: params.respect_blackouts,
        };
        let slots = generate_fixtures(&team_ids, &fixture_params, &blackouts)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let draft_id = Uuid::new_v4();
        let mut order_within_day: HashMap<u32, u32> = HashMap::new();
        let mut matches: Vec<DraftMatch> = slots
            .iter()
            .map(|slot| {
                let display_order = order_within_day.entry(slot.matchday).or_insert(0);
                let current = *display_order;
                *display_order += 1;
                DraftMatch {
                    id: Uuid::new_v4(),
                    draft_id,
                    home_team_id: slot.home,
                    away_team_id: slot.away,
                    kickoff: Utc.from_utc_datetime(&slot.date.and_time(default_kickoff())),
                    venue_id: None,
                    matchday: slot.matchday,
                    display_order: current,
                    has_conflict: false,
                }
            })
            .collect();

        let published = self
            .drafts
            .list_published_fixtures(request.season_id)
            .await
            .map_err(map_draft_error)?;
        let conflicts = detect_conflicts(&matches, &blackouts, &published);
        mark_conflicted(&mut matches, &conflicts);

        let matchdays = matches.iter().map(|m| m.matchday).max().unwrap_or(0);
        let draft = ScheduleDraft {
            id: draft_id,
            league_id: request.league_id,
            season_id: request.season_id,
            name: request.name,
            status: DraftStatus::Draft,
            params,
            conflict_count: unresolved_count(&conflicts),
            created_at: Utc::now(),
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            rejection_reason: None,
        };
        let log = log_entry(
            draft_id,
            DraftAction::Created,
            request.actor,
            Some(format!(
                "generated {} matches across {matchdays} matchdays",
                matches.len()
            )),
        );
        self.drafts
            .insert_draft(&draft, &matches, &conflicts, &log)
            .await
            .map_err(map_draft_error)?;

        Ok(DraftView {
            draft,
            matches,
            conflicts,
        })
    }

    async fn draft(&self, draft_id: Uuid) -> Result<DraftView, Error> {
        let draft = self.load_draft(draft_id).await?;
        self.load_view(draft).await
    }

    async fn list(&self, season_id: Uuid) -> Result<Vec<ScheduleDraft>, Error> {
        self.drafts
            .list_drafts(season_id)
            .await
            .map_err(map_draft_error)
    }

    async fn approval_log(&self, draft_id: Uuid) -> Result<Vec<ApprovalLogEntry>, Error> {
        self.load_draft(draft_id).await?;
        self.drafts
            .list_approval_log(draft_id)
            .await
            .map_err(map_draft_error)
    }

    async fn reorder(&self, request: ReorderRequest) -> Result<DraftView, Error> {
        let mut draft = self.load_draft(request.draft_id).await?;
        Self::ensure_editable(&mut draft)?;

        let mut matches = self
            .drafts
            .list_matches(draft.id)
            .await
            .map_err(map_draft_error)?;
        for entry in &request.entries {
            let target = matches
                .iter_mut()
                .find(|m| m.id == entry.draft_match_id)
                .ok_or_else(|| {
                    Error::invalid_request(format!(
                        "draft match {} does not belong to this draft",
                        entry.draft_match_id
                    ))
                })?;
            target.matchday = entry.matchday;
            target.display_order = entry.display_order;
            if let Some(kickoff) = entry.kickoff {
                target.kickoff = kickoff;
            }
        }
        matches.sort_by_key(|m| (m.matchday, m.display_order, m.kickoff, m.id));

        let conflicts = self.detect(draft.season_id, &mut matches).await?;
        let moved = request.entries.len();
        self.persist_edit(
            draft,
            matches,
            conflicts,
            request.actor,
            format!("reordered {moved} matches"),
        )
        .await
    }

    async fn submit(&self, request: ReviewRequest) -> Result<ScheduleDraft, Error> {
        let mut draft = self.load_draft(request.draft_id).await?;
        draft
            .status
            .ensure_can(DraftStatus::PendingApproval)
            .map_err(|err| Error::invalid_transition(err.to_string()))?;

        let conflicts = self
            .drafts
            .list_conflicts(draft.id)
            .await
            .map_err(map_draft_error)?;
        if has_blocking(&conflicts) {
            return Err(blocking_error(&conflicts));
        }

        draft.status = DraftStatus::PendingApproval;
        draft.submitted_at = Some(Utc::now());
        let log = log_entry(draft.id, DraftAction::Submitted, request.actor, request.notes);
        self.drafts
            .update_draft(&draft, &log)
            .await
            .map_err(map_draft_error)?;
        Ok(draft)
    }

    async fn approve(&self, request: ReviewRequest) -> Result<ScheduleDraft, Error> {
        let mut draft = self.load_draft(request.draft_id).await?;
        draft
            .status
            .ensure_can(DraftStatus::Approved)
            .map_err(|err| Error::invalid_transition(err.to_string()))?;

        draft.status = DraftStatus::Approved;
        draft.reviewed_at = Some(Utc::now());
        draft.reviewed_by = request.actor.clone();
        let log = log_entry(draft.id, DraftAction::Approved, request.actor, request.notes);
        self.drafts
            .update_draft(&draft, &log)
            .await
            .map_err(map_draft_error)?;
        Ok(draft)
    }

    async fn reject(&self, request: ReviewRequest) -> Result<ScheduleDraft, Error> {
        let reason = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| Error::invalid_request("rejection requires a reason"))?;

        let mut draft = self.load_draft(request.draft_id).await?;
        draft
            .status
            .ensure_can(DraftStatus::Rejected)
            .map_err(|err| Error::invalid_transition(err.to_string()))?;

        draft.status = DraftStatus::Rejected;
        draft.reviewed_at = Some(Utc::now());
        draft.reviewed_by = request.actor.clone();
        draft.rejection_reason = Some(reason.clone());
        let log = log_entry(draft.id, DraftAction::Rejected, request.actor, Some(reason));
        self.drafts
            .update_draft(&draft, &log)
            .await
            .map_err(map_draft_error)?;
        Ok(draft)
    }

    async fn publish(&self, request: ReviewRequest) -> Result<PublishResponse, Error> {
        let mut draft = self.load_draft(request.draft_id).await?;
        draft
            .status
            .ensure_can(DraftStatus::Published)
            .map_err(|err| Error::invalid_transition(err.to_string()))?;

        let matches = self
            .drafts
            .list_matches(draft.id)
            .await
            .map_err(map_draft_error)?;
        draft.status = DraftStatus::Published;
        let log = log_entry(
            draft.id,
            DraftAction::Published,
            request.actor,
            Some(format!("published {} matches", matches.len())),
        );
        let match_ids = self
            .drafts
            .publish(&draft, &matches, &log)
            .await
            .map_err(map_draft_error)?;

        Ok(PublishResponse { draft, match_ids })
    }

    async fn delete(&self, request: ReviewRequest) -> Result<(), Error> {
        let draft = self.load_draft(request.draft_id).await?;
        if draft.status == DraftStatus::Published {
            return Err(Error::invalid_transition(
                "a published draft cannot be deleted",
            ));
        }
        let log = log_entry(draft.id, DraftAction::Deleted, request.actor, request.notes);
        self.drafts
            .delete_draft(draft.id, &log)
            .await
            .map_err(map_draft_error)
    }

    async fn auto_resolve(&self, request: ReviewRequest) -> Result<AutoResolveResponse, Error> {
        let mut draft = self.load_draft(request.draft_id).await?;
        Self::ensure_editable(&mut draft)?;

        let mut matches = self
            .drafts
            .list_matches(draft.id)
            .await
            .map_err(map_draft_error)?;
        let blackouts = self
            .seasons
            .list_blackouts(draft.season_id)
            .await
            .map_err(map_season_error)?;
        let published = self
            .drafts
            .list_published_fixtures(draft.season_id)
            .await
            .map_err(map_draft_error)?;

        let outcome = auto_resolve(&mut matches, &blackouts, &published);
        mark_conflicted(&mut matches, &outcome.remaining);

        let shifted = u32::try_from(outcome.shifted.len()).unwrap_or(u32::MAX);
        let remaining = unresolved_count(&outcome.remaining);
        let view = self
            .persist_edit(
                draft,
                matches,
                outcome.remaining,
                request.actor,
                format!("auto-resolved {shifted} conflicts, {remaining} remaining"),
            )
            .await?;

        Ok(AutoResolveResponse {
            view,
            shifted,
            remaining,
        })
    }

    async fn export(
        &self,
        draft_id: Uuid,
        format: TransferFormat,
    ) -> Result<ExportPayload, Error> {
        let draft = self.load_draft(draft_id).await?;
        let matches = self
            .drafts
            .list_matches(draft.id)
            .await
            .map_err(map_draft_error)?;
        let teams = self.season_teams(draft.season_id).await?;
        let venues = self.season_venues(draft.season_id).await?;
        let team_names: HashMap<Uuid, String> =
            teams.into_iter().map(|t| (t.id, t.name)).collect();
        let venue_names: HashMap<Uuid, String> =
            venues.into_iter().map(|v| (v.id, v.name)).collect();

        let name_of = |id: Uuid| {
            team_names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string())
        };
        let rows: Vec<ScheduleRow> = matches
            .iter()
            .map(|entry| ScheduleRow {
                match_id: Some(entry.id),
                matchday: entry.matchday,
                kickoff: entry.kickoff,
                home_team: name_of(entry.home_team_id),
                away_team: name_of(entry.away_team_id),
                venue: entry.venue_id.and_then(|id| venue_names.get(&id).cloned()),
                status: draft.status.as_str().to_owned(),
                home_score: None,
                away_score: None,
            })
            .collect();

        let body = export_rows(&rows, format)
            .map_err(|err| Error::internal(format!("schedule export failed: {err}")))?;
        Ok(ExportPayload {
            content_type: format.content_type(),
            body,
        })
    }

    async fn import(&self, request: ImportRequest) -> Result<ImportOutcome, Error> {
        let mut draft = self.load_draft(request.draft_id).await?;
        Self::ensure_editable(&mut draft)?;

        let parsed = parse_import(&request.payload, request.format)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let teams = self.season_teams(draft.season_id).await?;
        let venues = self.season_venues(draft.season_id).await?;
        let team_ids: HashMap<&str, Uuid> =
            teams.iter().map(|t| (t.name.as_str(), t.id)).collect();
        let venue_ids: HashMap<&str, Uuid> =
            venues.iter().map(|v| (v.name.as_str(), v.id)).collect();

        let mut matches = self
            .drafts
            .list_matches(draft.id)
            .await
            .map_err(map_draft_error)?;
        let mut rejected: Vec<ImportRejection> = parsed.rejected;
        let mut accepted = 0u32;
        for entry in parsed.accepted {
            let Some(&home) = team_ids.get(entry.home_team.as_str()) else {
                rejected.push(ImportRejection {
                    row: entry.row,
                    reason: format!("unknown team {:?}", entry.home_team),
                });
                continue;
            };
            let Some(&away) = team_ids.get(entry.away_team.as_str()) else {
                rejected.push(ImportRejection {
                    row: entry.row,
                    reason: format!("unknown team {:?}", entry.away_team),
                });
                continue;
            };
            let venue_id = match entry.venue.as_deref() {
                None => None,
                Some(name) => match venue_ids.get(name) {
                    Some(&id) => Some(id),
                    None => {
                        rejected.push(ImportRejection {
                            row: entry.row,
                            reason: format!("unknown venue {name:?}"),
                        });
                        continue;
                    }
                },
            };

            let display_order = matches
                .iter()
                .filter(|m| m.matchday == entry.matchday)
                .count();
            matches.push(DraftMatch {
                id: Uuid::new_v4(),
                draft_id: draft.id,
                home_team_id: home,
                away_team_id: away,
                kickoff: entry.kickoff,
                venue_id,
                matchday: entry.matchday,
                display_order: u32::try_from(display_order).unwrap_or(u32::MAX),
                has_conflict: false,
            });
            accepted += 1;
        }
        rejected.sort_by_key(|r| r.row);

        let conflicts = self.detect(draft.season_id, &mut matches).await?;
        let view = self
            .persist_edit(
                draft,
                matches,
                conflicts,
                request.actor,
                format!("imported {accepted} matches, {} rejected", rejected.len()),
            )
            .await?;

        Ok(ImportOutcome {
            view,
            accepted,
            rejected,
        })
    }
}

#[cfg(test)]
#[path = "schedule_service_tests.rs"]
mod tests;
