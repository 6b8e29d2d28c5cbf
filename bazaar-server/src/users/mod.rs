pub mod auth;
pub mod policy_handlers;
pub mod profile_handlers;
