//! HTTP inbound adapter exposing REST endpoints.

pub mod drafts;
pub mod error;
pub mod games;
pub mod health;
pub mod schemas;
pub mod state;
pub mod validation;

pub use error::ApiResult;
