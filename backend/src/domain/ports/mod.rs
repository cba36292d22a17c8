//! Domain ports and supporting types for the hexagonal boundary.

mod draft_repository;
mod game_repository;
mod live_game_console;
mod notification_sink;
mod schedule_workflow;
mod season_repository;

#[cfg(test)]
pub use draft_repository::MockDraftRepository;
pub use draft_repository::{DraftRepository, DraftRepositoryError, FixtureDraftRepository};
#[cfg(test)]
pub use game_repository::MockGameRepository;
pub use game_repository::{FixtureGameRepository, GameRepository, GameRepositoryError};
#[cfg(test)]
pub use live_game_console::MockLiveGameConsole;
pub use live_game_console::{
    FixtureLiveGameConsole, GameActionRequest, GameDetail, LiveGameConsole, PlayerStatRequest,
    ReconcileRequest, ReconcileResponse, RecordEventRequest, RecordPenaltyRequest,
    UpdateScoreRequest,
};
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{
    FixtureNotificationSink, Notification, NotificationDispatchError, NotificationKind,
    NotificationSink, standings_cache_key, ticker_cache_key,
};
#[cfg(test)]
pub use schedule_workflow::MockScheduleWorkflow;
pub use schedule_workflow::{
    AutoResolveResponse, DraftView, ExportPayload, FixtureScheduleWorkflow,
    GenerateScheduleRequest, ImportOutcome, ImportRequest, PublishResponse, ReorderEntry,
    ReorderRequest, ReviewRequest, ScheduleWorkflow,
};
#[cfg(test)]
pub use season_repository::MockSeasonRepository;
pub use season_repository::{
    FixtureSeasonRepository, SeasonRepository, SeasonRepositoryError, TeamRef, VenueRef,
};
