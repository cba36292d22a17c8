//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (schedule drafts,
//!   live games, health)
//! - **Schemas**: Domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`ScheduleDraftSchema`], [`GameSchema`], and friends) that provide
//!   OpenAPI definitions without coupling domain types to the utoipa
//!   framework
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::drafts::{
    GenerateScheduleRequestBody, ReorderEntryBody, ReorderRequestBody, ReviewRequestBody,
};
use crate::inbound::http::games::{
    GameActionBody, PlayerStatBody, ReconcileBody, RecordEventBody, RecordPenaltyBody,
    UpdateScoreBody,
};
use crate::inbound::http::health::HealthResponse;
use crate::inbound::http::schemas::{
    DraftViewSchema, ErrorCodeSchema, ErrorSchema, GameDetailSchema, GameSchema,
    ScheduleDraftSchema,
};

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "League backend API",
        description = "HTTP interface for schedule drafting, approval, live scoring, and transfers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::drafts::generate_draft,
        crate::inbound::http::drafts::list_drafts,
        crate::inbound::http::drafts::get_draft,
        crate::inbound::http::drafts::approval_log,
        crate::inbound::http::drafts::reorder_draft,
        crate::inbound::http::drafts::submit_draft,
        crate::inbound::http::drafts::approve_draft,
        crate::inbound::http::drafts::reject_draft,
        crate::inbound::http::drafts::publish_draft,
        crate::inbound::http::drafts::auto_resolve_draft,
        crate::inbound::http::drafts::delete_draft,
        crate::inbound::http::drafts::export_draft,
        crate::inbound::http::drafts::import_draft,
        crate::inbound::http::games::get_game,
        crate::inbound::http::games::start_game,
        crate::inbound::http::games::halftime_game,
        crate::inbound::http::games::resume_game,
        crate::inbound::http::games::overtime_game,
        crate::inbound::http::games::end_game,
        crate::inbound::http::games::reconcile_game,
        crate::inbound::http::games::update_score,
        crate::inbound::http::games::record_event,
        crate::inbound::http::games::record_penalty,
        crate::inbound::http::games::set_player_stat,
        crate::inbound::http::games::increment_player_stat,
        crate::inbound::http::health::health,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ScheduleDraftSchema,
        DraftViewSchema,
        GameSchema,
        GameDetailSchema,
        GenerateScheduleRequestBody,
        ReorderEntryBody,
        ReorderRequestBody,
        ReviewRequestBody,
        GameActionBody,
        ReconcileBody,
        UpdateScoreBody,
        RecordEventBody,
        RecordPenaltyBody,
        PlayerStatBody,
        HealthResponse,
    )),
    tags(
        (name = "schedule-drafts", description = "Fixture generation and the draft approval workflow"),
        (name = "games", description = "Live game scoring, events, and reconciliation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
