//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The requested state change is not legal from the current state.
    #[schema(rename = "invalid_transition")]
    InvalidTransition,
    /// Blocking schedule conflicts prevent the operation.
    #[schema(rename = "conflict_blocking")]
    ConflictBlocking,
    /// A draft could not be converted into real matches.
    #[schema(rename = "conversion_failed")]
    ConversionFailed,
    /// A downstream dependency is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Something went wrong")]
    message: String,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::schedule::ScheduleDraft`].
#[derive(ToSchema)]
#[schema(as = crate::domain::schedule::ScheduleDraft)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ScheduleDraftSchema {
    /// Stable draft identifier.
    #[schema(value_type = String, format = "uuid")]
    id: String,
    /// Owning league.
    #[schema(value_type = String, format = "uuid")]
    league_id: String,
    /// Owning season.
    #[schema(value_type = String, format = "uuid")]
    season_id: String,
    /// Human-readable name.
    name: String,
    /// Current workflow state.
    #[schema(example = "pending_approval")]
    status: String,
    /// Generation parameters the draft was built with.
    #[schema(value_type = Object)]
    params: serde_json::Value,
    /// Unresolved conflicts at warning severity or above.
    conflict_count: u32,
}

/// OpenAPI schema for [`crate::domain::ports::DraftView`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::DraftView)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DraftViewSchema {
    /// The draft row.
    draft: ScheduleDraftSchema,
    /// Matches ordered by matchday then display order.
    #[schema(value_type = Vec<Object>)]
    matches: Vec<serde_json::Value>,
    /// Conflicts attached to the matches.
    #[schema(value_type = Vec<Object>)]
    conflicts: Vec<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::live::Game`].
#[derive(ToSchema)]
#[schema(as = crate::domain::live::Game)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct GameSchema {
    /// Stable game identifier.
    #[schema(value_type = String, format = "uuid")]
    id: String,
    /// Owning season.
    #[schema(value_type = String, format = "uuid")]
    season_id: String,
    /// Current lifecycle state.
    #[schema(example = "in_progress")]
    status: String,
    /// Current home score.
    home_score: i32,
    /// Current away score.
    away_score: i32,
    /// 1-based period currently in play.
    current_period: u32,
    /// Whether the game reached overtime.
    went_to_overtime: bool,
    /// Whether an administrator confirmed the final score.
    is_reconciled: bool,
}

/// OpenAPI schema for [`crate::domain::ports::GameDetail`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::GameDetail)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct GameDetailSchema {
    /// The game row.
    game: GameSchema,
    /// Events, newest first.
    #[schema(value_type = Vec<Object>)]
    events: Vec<serde_json::Value>,
    /// Penalties, oldest first.
    #[schema(value_type = Vec<Object>)]
    penalties: Vec<serde_json::Value>,
    /// Player stat lines.
    #[schema(value_type = Vec<Object>)]
    player_stats: Vec<serde_json::Value>,
    /// Score audit trail, oldest first.
    #[schema(value_type = Vec<Object>)]
    score_history: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        let name = ErrorCodeSchema::name();
        // utoipa replaces :: with . in schema names
        assert_eq!(name, "crate.domain.ErrorCode");
        assert!(
            schema_json.contains("invalid_request"),
            "schema should contain error code variants"
        );
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "invalid_transition",
            "conflict_blocking",
            "conversion_failed",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorSchema>();
        let name = ErrorSchema::name();
        // utoipa replaces :: with . in schema names
        assert_eq!(name, "crate.domain.Error");
        assert!(
            schema_json.contains("message"),
            "schema should contain message field"
        );
    }

    #[test]
    fn draft_view_schema_nests_the_draft() {
        let schema_json = schema_to_json::<DraftViewSchema>();
        assert!(
            schema_json.contains("conflicts"),
            "schema should contain conflicts field"
        );
    }

    #[test]
    fn game_schema_has_expected_fields() {
        let schema_json = schema_to_json::<GameSchema>();
        assert!(
            schema_json.contains("home_score"),
            "schema should contain home_score field"
        );
    }
}
