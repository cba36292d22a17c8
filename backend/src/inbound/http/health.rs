//! Liveness endpoint.

use actix_web::{HttpResponse, get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;

/// Health check response payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving requests.
    pub status: &'static str,
}

/// Report process liveness.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    ),
    tags = ["health"],
    operation_id = "health"
)]
#[get("/health")]
pub async fn health() -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse { status: "ok" }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use serde_json::Value;

    use super::*;
    use crate::inbound::http::state::HttpState;

    #[actix_web::test]
    async fn health_reports_ok() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::default()))
                .service(web::scope("/api/v1").service(health)),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/health").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("status").and_then(Value::as_str), Some("ok"));
    }
}
