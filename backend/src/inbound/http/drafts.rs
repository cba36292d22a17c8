//! Schedule draft HTTP handlers.
//!
//! ```text
//! POST   /api/v1/schedule-drafts
//! GET    /api/v1/schedule-drafts?seasonId=...
//! GET    /api/v1/schedule-drafts/{draft_id}
//! GET    /api/v1/schedule-drafts/{draft_id}/approval-log
//! PUT    /api/v1/schedule-drafts/{draft_id}/matches
//! POST   /api/v1/schedule-drafts/{draft_id}/submit
//! POST   /api/v1/schedule-drafts/{draft_id}/approve
//! POST   /api/v1/schedule-drafts/{draft_id}/reject
//! POST   /api/v1/schedule-drafts/{draft_id}/publish
//! POST   /api/v1/schedule-drafts/{draft_id}/auto-resolve
//! DELETE /api/v1/schedule-drafts/{draft_id}
//! GET    /api/v1/schedule-drafts/{draft_id}/export?format=...
//! POST   /api/v1/schedule-drafts/{draft_id}/import?format=...
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{
    AutoResolveResponse, DraftView, GenerateScheduleRequest, ImportOutcome, ImportRequest,
    PublishResponse, ReorderEntry, ReorderRequest, ReviewRequest,
};
use crate::domain::schedule::{ApprovalLogEntry, GenerationParams, ScheduleDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{DraftViewSchema, ErrorSchema, ScheduleDraftSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_optional_rfc3339_timestamp, parse_transfer_format, parse_uuid,
};

fn default_interval_days() -> u32 {
    7
}

fn default_respect_blackouts() -> bool {
    true
}

/// Request payload for generating a draft schedule.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScheduleRequestBody {
    #[schema(format = "uuid")]
    pub league_id: String,
    #[schema(format = "uuid")]
    pub season_id: String,
    pub name: String,
    #[schema(format = "date", example = "2026-03-01")]
    pub start_date: String,
    #[serde(default = "default_interval_days")]
    pub interval_days: u32,
    #[serde(default)]
    pub double_round_robin: bool,
    #[serde(default)]
    pub shuffle: bool,
    pub shuffle_seed: Option<u64>,
    #[serde(default = "default_respect_blackouts")]
    pub respect_blackouts: bool,
    pub actor: Option<String>,
}

/// One repositioned match in a reorder payload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntryBody {
    #[schema(format = "uuid")]
    pub draft_match_id: String,
    pub matchday: u32,
    pub display_order: u32,
    #[schema(format = "date-time")]
    pub kickoff: Option<String>,
}

/// Request payload for reordering a draft's matches.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequestBody {
    pub entries: Vec<ReorderEntryBody>,
    pub actor: Option<String>,
}

/// Request payload for draft review actions.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestBody {
    #[serde(default)]
    pub actor: Option<String>,
    /// Approval notes or rejection reason.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters for listing a season's drafts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDraftsQuery {
    season_id: String,
}

/// Query parameters for schedule export and import.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuery {
    format: String,
    #[serde(default)]
    actor: Option<String>,
}

/// Query parameters carrying an optional actor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorQuery {
    #[serde(default)]
    actor: Option<String>,
}

fn parse_generate_request(body: GenerateScheduleRequestBody) -> Result<GenerateScheduleRequest, Error> {
    Ok(GenerateScheduleRequest {
        league_id: parse_uuid(body.league_id, FieldName::new("leagueId"))?,
        season_id: parse_uuid(body.season_id, FieldName::new("seasonId"))?,
        name: body.name,
        params: GenerationParams {
            start_date: parse_date(body.start_date, FieldName::new("startDate"))?,
            interval_days: body.interval_days,
            double_round_robin: body.double_round_robin,
            shuffle_seed: body.shuffle_seed,
            respect_blackouts: body.respect_blackouts,
        },
        shuffle: body.shuffle,
        actor: body.actor,
    })
}

fn parse_reorder_request(
    draft_id: uuid::Uuid,
    body: ReorderRequestBody,
) -> Result<ReorderRequest, Error> {
    let mut entries = Vec::with_capacity(body.entries.len());
    for entry in body.entries {
        entries.push(ReorderEntry {
            draft_match_id: parse_uuid(entry.draft_match_id, FieldName::new("draftMatchId"))?,
            matchday: entry.matchday,
            display_order: entry.display_order,
            kickoff: parse_optional_rfc3339_timestamp(entry.kickoff, FieldName::new("kickoff"))?,
        });
    }
    Ok(ReorderRequest {
        draft_id,
        entries,
        actor: body.actor,
    })
}

fn parse_draft_id(raw: String) -> Result<uuid::Uuid, Error> {
    parse_uuid(raw, FieldName::new("draftId"))
}

fn review_request(draft_id: uuid::Uuid, body: ReviewRequestBody) -> ReviewRequest {
    ReviewRequest {
        draft_id,
        actor: body.actor,
        notes: body.notes,
    }
}

/// Generate a round-robin draft schedule for a season.
#[utoipa::path(
    post,
    path = "/api/v1/schedule-drafts",
    request_body = GenerateScheduleRequestBody,
    responses(
        (status = 200, description = "Draft generated", body = DraftViewSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Season not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "generateScheduleDraft"
)]
#[post("/schedule-drafts")]
pub async fn generate_draft(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateScheduleRequestBody>,
) -> ApiResult<web::Json<DraftView>> {
    let request = parse_generate_request(payload.into_inner())?;
    let view = state.schedule.generate(request).await?;
    Ok(web::Json(view))
}

/// List a season's drafts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/schedule-drafts",
    params(("seasonId" = String, Query, format = "uuid", description = "Season to list drafts for")),
    responses(
        (status = 200, description = "Drafts for the season", body = Vec<ScheduleDraftSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "listScheduleDrafts"
)]
#[get("/schedule-drafts")]
pub async fn list_drafts(
    state: web::Data<HttpState>,
    query: web::Query<ListDraftsQuery>,
) -> ApiResult<web::Json<Vec<ScheduleDraft>>> {
    let season_id = parse_uuid(query.into_inner().season_id, FieldName::new("seasonId"))?;
    let drafts = state.schedule.list(season_id).await?;
    Ok(web::Json(drafts))
}

/// Fetch one draft with its matches and conflicts.
#[utoipa::path(
    get,
    path = "/api/v1/schedule-drafts/{draft_id}",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    responses(
        (status = 200, description = "The draft", body = DraftViewSchema),
        (status = 404, description = "Draft not found", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "getScheduleDraft"
)]
#[get("/schedule-drafts/{draft_id}")]
pub async fn get_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DraftView>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let view = state.schedule.draft(draft_id).await?;
    Ok(web::Json(view))
}

/// Approval log for a draft, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/schedule-drafts/{draft_id}/approval-log",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    responses(
        (status = 200, description = "Approval log entries"),
        (status = 404, description = "Draft not found", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "getApprovalLog"
)]
#[get("/schedule-drafts/{draft_id}/approval-log")]
pub async fn approval_log(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ApprovalLogEntry>>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let log = state.schedule.approval_log(draft_id).await?;
    Ok(web::Json(log))
}

/// Reorder a draft's matches and re-run conflict detection.
#[utoipa::path(
    put,
    path = "/api/v1/schedule-drafts/{draft_id}/matches",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    request_body = ReorderRequestBody,
    responses(
        (status = 200, description = "Draft after the reorder", body = DraftViewSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Draft is not editable", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "reorderScheduleDraft"
)]
#[put("/schedule-drafts/{draft_id}/matches")]
pub async fn reorder_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReorderRequestBody>,
) -> ApiResult<web::Json<DraftView>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let request = parse_reorder_request(draft_id, payload.into_inner())?;
    let view = state.schedule.reorder(request).await?;
    Ok(web::Json(view))
}

/// Submit a draft for approval.
#[utoipa::path(
    post,
    path = "/api/v1/schedule-drafts/{draft_id}/submit",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Draft now pending approval", body = ScheduleDraftSchema),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Blocking conflicts or illegal transition", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "submitScheduleDraft"
)]
#[post("/schedule-drafts/{draft_id}/submit")]
pub async fn submit_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<ScheduleDraft>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let draft = state
        .schedule
        .submit(review_request(draft_id, payload.into_inner()))
        .await?;
    Ok(web::Json(draft))
}

/// Approve a pending draft.
#[utoipa::path(
    post,
    path = "/api/v1/schedule-drafts/{draft_id}/approve",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Draft approved", body = ScheduleDraftSchema),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Illegal transition", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "approveScheduleDraft"
)]
#[post("/schedule-drafts/{draft_id}/approve")]
pub async fn approve_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<ScheduleDraft>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let draft = state
        .schedule
        .approve(review_request(draft_id, payload.into_inner()))
        .await?;
    Ok(web::Json(draft))
}

/// Reject a pending draft; the notes must carry the reason.
#[utoipa::path(
    post,
    path = "/api/v1/schedule-drafts/{draft_id}/reject",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Draft rejected", body = ScheduleDraftSchema),
        (status = 400, description = "Missing rejection reason", body = ErrorSchema),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Illegal transition", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "rejectScheduleDraft"
)]
#[post("/schedule-drafts/{draft_id}/reject")]
pub async fn reject_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<ScheduleDraft>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let draft = state
        .schedule
        .reject(review_request(draft_id, payload.into_inner()))
        .await?;
    Ok(web::Json(draft))
}

/// Convert an approved draft into real matches.
#[utoipa::path(
    post,
    path = "/api/v1/schedule-drafts/{draft_id}/publish",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Draft published"),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Illegal transition", body = ErrorSchema),
        (status = 422, description = "Conversion failed; nothing was written", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "publishScheduleDraft"
)]
#[post("/schedule-drafts/{draft_id}/publish")]
pub async fn publish_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<PublishResponse>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let response = state
        .schedule
        .publish(review_request(draft_id, payload.into_inner()))
        .await?;
    Ok(web::Json(response))
}

/// Shift auto-resolvable conflicts to nearby open dates.
#[utoipa::path(
    post,
    path = "/api/v1/schedule-drafts/{draft_id}/auto-resolve",
    params(("draft_id" = String, Path, format = "uuid", description = "Draft identifier")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Resolution outcome"),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Draft is not editable", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "autoResolveScheduleDraft"
)]
#[post("/schedule-drafts/{draft_id}/auto-resolve")]
pub async fn auto_resolve_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<AutoResolveResponse>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let response = state
        .schedule
        .auto_resolve(review_request(draft_id, payload.into_inner()))
        .await?;
    Ok(web::Json(response))
}

/// Delete a non-published draft.
#[utoipa::path(
    delete,
    path = "/api/v1/schedule-drafts/{draft_id}",
    params(
        ("draft_id" = String, Path, format = "uuid", description = "Draft identifier"),
        ("actor" = Option<String>, Query, description = "Who asked")
    ),
    responses(
        (status = 204, description = "Draft deleted"),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Published drafts cannot be deleted", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "deleteScheduleDraft"
)]
#[delete("/schedule-drafts/{draft_id}")]
pub async fn delete_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ActorQuery>,
) -> ApiResult<HttpResponse> {
    let draft_id = parse_draft_id(path.into_inner())?;
    state
        .schedule
        .delete(ReviewRequest {
            draft_id,
            actor: query.into_inner().actor,
            notes: None,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Serialise a draft's schedule as CSV, JSON, or iCalendar.
#[utoipa::path(
    get,
    path = "/api/v1/schedule-drafts/{draft_id}/export",
    params(
        ("draft_id" = String, Path, format = "uuid", description = "Draft identifier"),
        ("format" = String, Query, description = "csv, json, or ics")
    ),
    responses(
        (status = 200, description = "Serialised schedule"),
        (status = 400, description = "Unknown format", body = ErrorSchema),
        (status = 404, description = "Draft not found", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "exportScheduleDraft"
)]
#[get("/schedule-drafts/{draft_id}/export")]
pub async fn export_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<TransferQuery>,
) -> ApiResult<HttpResponse> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let format = parse_transfer_format(query.into_inner().format, FieldName::new("format"))?;
    let payload = state.schedule.export(draft_id, format).await?;
    Ok(HttpResponse::Ok()
        .content_type(payload.content_type)
        .body(payload.body))
}

/// Import proposed matches into an editable draft.
///
/// The request body is the raw schedule payload in the format named by the
/// `format` query parameter. Rows that fail validation or name unknown teams
/// are reported per row; the rest are added to the draft.
#[utoipa::path(
    post,
    path = "/api/v1/schedule-drafts/{draft_id}/import",
    params(
        ("draft_id" = String, Path, format = "uuid", description = "Draft identifier"),
        ("format" = String, Query, description = "csv, json, or ics"),
        ("actor" = Option<String>, Query, description = "Who asked")
    ),
    request_body = String,
    responses(
        (status = 200, description = "Import outcome with per-row verdicts"),
        (status = 400, description = "Malformed payload or unknown format", body = ErrorSchema),
        (status = 404, description = "Draft not found", body = ErrorSchema),
        (status = 409, description = "Draft is not editable", body = ErrorSchema)
    ),
    tags = ["schedule-drafts"],
    operation_id = "importScheduleDraft"
)]
#[post("/schedule-drafts/{draft_id}/import")]
pub async fn import_draft(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<TransferQuery>,
    payload: web::Bytes,
) -> ApiResult<web::Json<ImportOutcome>> {
    let draft_id = parse_draft_id(path.into_inner())?;
    let query = query.into_inner();
    let format = parse_transfer_format(query.format, FieldName::new("format"))?;
    let outcome = state
        .schedule
        .import(ImportRequest {
            draft_id,
            format,
            payload: payload.to_vec(),
            actor: query.actor,
        })
        .await?;
    Ok(web::Json(outcome))
}

#[cfg(test)]
#[path = "drafts_tests.rs"]
mod tests;
