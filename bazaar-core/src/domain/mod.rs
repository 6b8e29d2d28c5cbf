pub mod notifications;
pub mod users;
