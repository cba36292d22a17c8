//! PostgreSQL persistence adapters built on Diesel.
//!
//! Each repository implements one domain port over the shared [`DbPool`].
//! Row structs and the generated schema stay private to this module; the
//! rest of the crate only sees domain types.

mod diesel_draft_repository;
mod diesel_game_repository;
mod diesel_season_repository;
mod error_mapping;
mod models;
mod pool;
pub(crate) mod schema;

pub use diesel_draft_repository::DieselDraftRepository;
pub use diesel_game_repository::DieselGameRepository;
pub use diesel_season_repository::DieselSeasonRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
