//! Email gateway implementations wired in by the server.

pub mod log;
pub mod smtp;

pub use log::LogEmailGateway;
pub use smtp::SmtpEmailGateway;
