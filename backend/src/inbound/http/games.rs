//! Live game console HTTP handlers.
//!
//! ```text
//! GET  /api/v1/games/{game_id}
//! POST /api/v1/games/{game_id}/start
//! POST /api/v1/games/{game_id}/halftime
//! POST /api/v1/games/{game_id}/resume
//! POST /api/v1/games/{game_id}/overtime
//! POST /api/v1/games/{game_id}/end
//! POST /api/v1/games/{game_id}/reconcile
//! POST /api/v1/games/{game_id}/score
//! POST /api/v1/games/{game_id}/events
//! POST /api/v1/games/{game_id}/penalties
//! PUT  /api/v1/games/{game_id}/player-stats
//! POST /api/v1/games/{game_id}/player-stats/increment
//! ```

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::live::{Game, GameEvent, GameEventKind, Penalty, PlayerGameStat, StatKind};
use crate::domain::ports::{
    GameActionRequest, GameDetail, PlayerStatRequest, ReconcileRequest, ReconcileResponse,
    RecordEventRequest, RecordPenaltyRequest, UpdateScoreRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, GameDetailSchema, GameSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_choice, parse_optional_uuid, parse_uuid,
};

/// Request payload for lifecycle actions.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameActionBody {
    #[serde(default)]
    pub actor: Option<String>,
}

/// Request payload for reconciliation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileBody {
    /// Administrator confirming the score.
    pub actor: String,
    /// Whether the caller holds the admin role. Set by the gateway.
    #[serde(default)]
    pub is_admin: bool,
}

/// Request payload for a score update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreBody {
    pub home_score: i32,
    pub away_score: i32,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request payload for recording a game event.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventBody {
    /// Event kind wire name, e.g. "goal" or "timeout".
    pub kind: String,
    #[schema(format = "uuid")]
    pub team_id: Option<String>,
    #[schema(format = "uuid")]
    pub player_id: Option<String>,
    pub period: Option<u32>,
    #[schema(example = "04:12")]
    pub game_clock: Option<String>,
    #[serde(default)]
    pub details: serde_json::Value,
    pub description: Option<String>,
}

/// Request payload for recording a penalty.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPenaltyBody {
    #[schema(format = "uuid")]
    pub team_id: String,
    #[schema(format = "uuid")]
    pub player_id: Option<String>,
    pub penalty_type: String,
    pub period: Option<u32>,
    pub game_clock: Option<String>,
    pub minutes: Option<u32>,
    pub severity: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub resulted_in_ejection: bool,
}

/// Request payload for a player stat write.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatBody {
    #[schema(format = "uuid")]
    pub player_id: String,
    #[schema(format = "uuid")]
    pub team_id: String,
    /// Stat kind wire name, e.g. "points" or "goals".
    pub kind: String,
    /// Absolute value for a set, delta for an increment.
    pub value: i32,
}

fn parse_game_id(raw: String) -> Result<Uuid, Error> {
    parse_uuid(raw, FieldName::new("gameId"))
}

fn parse_player_stat_request(game_id: Uuid, body: PlayerStatBody) -> Result<PlayerStatRequest, Error> {
    Ok(PlayerStatRequest {
        game_id,
        player_id: parse_uuid(body.player_id, FieldName::new("playerId"))?,
        team_id: parse_uuid(body.team_id, FieldName::new("teamId"))?,
        kind: parse_choice(
            body.kind,
            FieldName::new("kind"),
            "points, goals, assists, saves, fouls",
            StatKind::parse,
        )?,
        value: body.value,
    })
}

/// Fetch a game with everything recorded against it.
#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}",
    params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
    responses(
        (status = 200, description = "The game with events, penalties, stats, and score history", body = GameDetailSchema),
        (status = 404, description = "Game not found", body = ErrorSchema)
    ),
    tags = ["games"],
    operation_id = "getGame"
)]
#[get("/games/{game_id}")]
pub async fn get_game(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<GameDetail>> {
    let game_id = parse_game_id(path.into_inner())?;
    let detail = state.games.game(game_id).await?;
    Ok(web::Json(detail))
}

macro_rules! lifecycle_handler {
    ($name:ident, $method:ident, $route:literal, $path:literal, $op:literal, $doc:literal) => {
        #[doc = $doc]
        #[utoipa::path(
            post,
            path = $path,
            params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
            request_body = GameActionBody,
            responses(
                (status = 200, description = "Game after the transition", body = GameSchema),
                (status = 404, description = "Game not found", body = ErrorSchema),
                (status = 409, description = "Illegal transition", body = ErrorSchema)
            ),
            tags = ["games"],
            operation_id = $op
        )]
        #[post($route)]
        pub async fn $name(
            state: web::Data<HttpState>,
            path: web::Path<String>,
            payload: web::Json<GameActionBody>,
        ) -> ApiResult<web::Json<Game>> {
            let game_id = parse_game_id(path.into_inner())?;
            let game = state
                .games
                .$method(GameActionRequest {
                    game_id,
                    actor: payload.into_inner().actor,
                })
                .await?;
            Ok(web::Json(game))
        }
    };
}

lifecycle_handler!(
    start_game,
    start,
    "/games/{game_id}/start",
    "/api/v1/games/{game_id}/start",
    "startGame",
    "Begin play."
);
lifecycle_handler!(
    halftime_game,
    set_halftime,
    "/games/{game_id}/halftime",
    "/api/v1/games/{game_id}/halftime",
    "setHalftime",
    "Pause at the half."
);
lifecycle_handler!(
    resume_game,
    resume,
    "/games/{game_id}/resume",
    "/api/v1/games/{game_id}/resume",
    "resumeGame",
    "Resume from the half."
);
lifecycle_handler!(
    overtime_game,
    start_overtime,
    "/games/{game_id}/overtime",
    "/api/v1/games/{game_id}/overtime",
    "startOvertime",
    "Enter an overtime period. A finished tie may reopen into overtime."
);
lifecycle_handler!(
    end_game,
    end,
    "/games/{game_id}/end",
    "/api/v1/games/{game_id}/end",
    "endGame",
    "End play and freeze the score."
);

/// Confirm a finished game's score. Admin-only.
#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/reconcile",
    params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
    request_body = ReconcileBody,
    responses(
        (status = 200, description = "Reconciled game with the validation report"),
        (status = 403, description = "Caller is not an administrator", body = ErrorSchema),
        (status = 404, description = "Game not found", body = ErrorSchema),
        (status = 409, description = "Game is not final", body = ErrorSchema)
    ),
    tags = ["games"],
    operation_id = "reconcileGame"
)]
#[post("/games/{game_id}/reconcile")]
pub async fn reconcile_game(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReconcileBody>,
) -> ApiResult<web::Json<ReconcileResponse>> {
    let game_id = parse_game_id(path.into_inner())?;
    let body = payload.into_inner();
    let response = state
        .games
        .reconcile(ReconcileRequest {
            game_id,
            actor: body.actor,
            is_admin: body.is_admin,
        })
        .await?;
    Ok(web::Json(response))
}

/// Report a score change.
#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/score",
    params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
    request_body = UpdateScoreBody,
    responses(
        (status = 200, description = "Game with the new score", body = GameSchema),
        (status = 400, description = "Negative score", body = ErrorSchema),
        (status = 404, description = "Game not found", body = ErrorSchema),
        (status = 409, description = "Game is not accepting score changes", body = ErrorSchema)
    ),
    tags = ["games"],
    operation_id = "updateScore"
)]
#[post("/games/{game_id}/score")]
pub async fn update_score(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateScoreBody>,
) -> ApiResult<web::Json<Game>> {
    let game_id = parse_game_id(path.into_inner())?;
    let body = payload.into_inner();
    let game = state
        .games
        .update_score(UpdateScoreRequest {
            game_id,
            home_score: body.home_score,
            away_score: body.away_score,
            actor: body.actor,
            notes: body.notes,
        })
        .await?;
    Ok(web::Json(game))
}

/// Record a game event.
#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/events",
    params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
    request_body = RecordEventBody,
    responses(
        (status = 200, description = "Recorded event"),
        (status = 400, description = "Unknown event kind", body = ErrorSchema),
        (status = 404, description = "Game not found", body = ErrorSchema)
    ),
    tags = ["games"],
    operation_id = "recordEvent"
)]
#[post("/games/{game_id}/events")]
pub async fn record_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RecordEventBody>,
) -> ApiResult<web::Json<GameEvent>> {
    let game_id = parse_game_id(path.into_inner())?;
    let body = payload.into_inner();
    let event = state
        .games
        .record_event(RecordEventRequest {
            game_id,
            kind: parse_choice(
                body.kind,
                FieldName::new("kind"),
                "goal, timeout, substitution, period_start, period_end, overtime_start, game_end, penalty",
                GameEventKind::parse,
            )?,
            team_id: parse_optional_uuid(body.team_id, FieldName::new("teamId"))?,
            player_id: parse_optional_uuid(body.player_id, FieldName::new("playerId"))?,
            period: body.period,
            game_clock: body.game_clock,
            details: body.details,
            description: body.description,
        })
        .await?;
    Ok(web::Json(event))
}

/// Record a penalty and its paired event.
#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/penalties",
    params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
    request_body = RecordPenaltyBody,
    responses(
        (status = 200, description = "Recorded penalty"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Game not found", body = ErrorSchema)
    ),
    tags = ["games"],
    operation_id = "recordPenalty"
)]
#[post("/games/{game_id}/penalties")]
pub async fn record_penalty(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RecordPenaltyBody>,
) -> ApiResult<web::Json<Penalty>> {
    let game_id = parse_game_id(path.into_inner())?;
    let body = payload.into_inner();
    let penalty = state
        .games
        .record_penalty(RecordPenaltyRequest {
            game_id,
            team_id: parse_uuid(body.team_id, FieldName::new("teamId"))?,
            player_id: parse_optional_uuid(body.player_id, FieldName::new("playerId"))?,
            penalty_type: body.penalty_type,
            period: body.period,
            game_clock: body.game_clock,
            minutes: body.minutes,
            severity: body.severity,
            description: body.description,
            resulted_in_ejection: body.resulted_in_ejection,
        })
        .await?;
    Ok(web::Json(penalty))
}

/// Set a player's stat to an absolute value.
#[utoipa::path(
    put,
    path = "/api/v1/games/{game_id}/player-stats",
    params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
    request_body = PlayerStatBody,
    responses(
        (status = 200, description = "Stored stat line"),
        (status = 400, description = "Negative value or unknown stat kind", body = ErrorSchema),
        (status = 404, description = "Game not found", body = ErrorSchema)
    ),
    tags = ["games"],
    operation_id = "setPlayerStat"
)]
#[put("/games/{game_id}/player-stats")]
pub async fn set_player_stat(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<PlayerStatBody>,
) -> ApiResult<web::Json<PlayerGameStat>> {
    let game_id = parse_game_id(path.into_inner())?;
    let request = parse_player_stat_request(game_id, payload.into_inner())?;
    let stat = state.games.set_player_stat(request).await?;
    Ok(web::Json(stat))
}

/// Add a delta to a player's stat.
#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/player-stats/increment",
    params(("game_id" = String, Path, format = "uuid", description = "Game identifier")),
    request_body = PlayerStatBody,
    responses(
        (status = 200, description = "Stat line after the increment"),
        (status = 400, description = "Unknown stat kind", body = ErrorSchema),
        (status = 404, description = "Game not found", body = ErrorSchema)
    ),
    tags = ["games"],
    operation_id = "incrementPlayerStat"
)]
#[post("/games/{game_id}/player-stats/increment")]
pub async fn increment_player_stat(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<PlayerStatBody>,
) -> ApiResult<web::Json<PlayerGameStat>> {
    let game_id = parse_game_id(path.into_inner())?;
    let request = parse_player_stat_request(game_id, payload.into_inner())?;
    let stat = state.games.increment_player_stat(request).await?;
    Ok(web::Json(stat))
}

#[cfg(test)]
#[path = "games_tests.rs"]
mod tests;
