//! # Bazaar Server
//!
//! HTTP transport for the Bazaar identity engine.
//!
//! Handlers translate JSON requests into calls on the `bazaar-core`
//! services and map each closed outcome onto a status code. Route gates
//! check the bearer access token before a handler runs.

pub mod infra;
pub mod routes;
pub mod users;

pub use infra::app_state::AppState;
