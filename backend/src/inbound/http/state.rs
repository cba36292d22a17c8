//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureLiveGameConsole, FixtureScheduleWorkflow, LiveGameConsole, ScheduleWorkflow,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub schedule: Arc<dyn ScheduleWorkflow>,
    pub games: Arc<dyn LiveGameConsole>,
}

impl HttpState {
    /// Construct state from port implementations.
    pub fn new(schedule: Arc<dyn ScheduleWorkflow>, games: Arc<dyn LiveGameConsole>) -> Self {
        Self { schedule, games }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self {
            schedule: Arc::new(FixtureScheduleWorkflow),
            games: Arc::new(FixtureLiveGameConsole),
        }
    }
}
