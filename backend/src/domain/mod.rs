//! Domain entities, services, and ports.
//!
//! Types in this module are transport agnostic: inbound adapters map them to
//! HTTP payloads, outbound adapters persist them through the ports. Keep
//! invariants inside validated constructors and document them on each type.

pub mod error;
pub mod live;
pub mod live_game_service;
pub mod ports;
pub mod schedule;
pub mod schedule_service;

pub use self::error::{Error, ErrorCode};
pub use self::live_game_service::LiveGameService;
pub use self::schedule_service::ScheduleService;

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
