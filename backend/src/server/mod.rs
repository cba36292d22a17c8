//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    FixtureLiveGameConsole, FixtureScheduleWorkflow, LiveGameConsole, ScheduleWorkflow,
};
use crate::domain::{LiveGameService, ScheduleService};
use crate::inbound::http::drafts::{
    approval_log, approve_draft, auto_resolve_draft, delete_draft, export_draft, generate_draft,
    get_draft, import_draft, list_drafts, publish_draft, reject_draft, reorder_draft, submit_draft,
};
use crate::inbound::http::games::{
    end_game, get_game, halftime_game, increment_player_stat, overtime_game, reconcile_game,
    record_event, record_penalty, resume_game, set_player_stat, start_game, update_score,
};
use crate::inbound::http::health::health;
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DieselDraftRepository, DieselGameRepository, DieselSeasonRepository,
};
use crate::outbound::webhook::{LogNotificationSink, WebhookNotificationSink};

/// Select the schedule workflow implementation from the configuration.
fn build_schedule_workflow(config: &ServerConfig) -> Arc<dyn ScheduleWorkflow> {
    match &config.db_pool {
        Some(pool) => Arc::new(ScheduleService::new(
            Arc::new(DieselDraftRepository::new(pool.clone())),
            Arc::new(DieselSeasonRepository::new(pool.clone())),
        )),
        None => Arc::new(FixtureScheduleWorkflow),
    }
}

/// Select the live game console implementation from the configuration.
fn build_live_game_console(config: &ServerConfig) -> Arc<dyn LiveGameConsole> {
    match (&config.db_pool, &config.webhook_url) {
        (Some(pool), Some(url)) => Arc::new(LiveGameService::new(
            Arc::new(DieselGameRepository::new(pool.clone())),
            Arc::new(WebhookNotificationSink::new(url.clone())),
        )),
        (Some(pool), None) => Arc::new(LiveGameService::new(
            Arc::new(DieselGameRepository::new(pool.clone())),
            Arc::new(LogNotificationSink),
        )),
        (None, _) => Arc::new(FixtureLiveGameConsole),
    }
}

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(generate_draft)
        .service(list_drafts)
        .service(get_draft)
        .service(approval_log)
        .service(reorder_draft)
        .service(submit_draft)
        .service(approve_draft)
        .service(reject_draft)
        .service(publish_draft)
        .service(auto_resolve_draft)
        .service(delete_draft)
        .service(export_draft)
        .service(import_draft)
        .service(get_game)
        .service(start_game)
        .service(halftime_game)
        .service(resume_game)
        .service(overtime_game)
        .service(end_game)
        .service(reconcile_game)
        .service(update_score)
        .service(record_event)
        .service(record_penalty)
        .service(set_player_stat)
        .service(increment_player_stat)
        .service(health);

    let app = App::new().app_data(http_state).service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let schedule = build_schedule_workflow(&config);
    let games = build_live_game_console(&config);
    let http_state = web::Data::new(HttpState::new(schedule, games));

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(config.bind_addr)?
        .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use rstest::rstest;

    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:0".parse().expect("valid socket address")
    }

    #[rstest]
    fn config_keeps_its_bind_address() {
        let config = ServerConfig::new(addr());
        assert_eq!(config.bind_addr().ip().to_string(), "127.0.0.1");
        assert!(config.db_pool.is_none());
        assert!(config.webhook_url.is_none());
    }

    #[rstest]
    fn missing_pool_selects_fixture_ports() {
        let config = ServerConfig::new(addr()).with_webhook_url("https://hooks.example.test");
        // Fixture workflow serves empty lists, which is what a server without
        // a database should report rather than failing requests.
        let schedule = build_schedule_workflow(&config);
        let games = build_live_game_console(&config);
        let state = HttpState::new(schedule, games);
        drop(state);
    }
}
