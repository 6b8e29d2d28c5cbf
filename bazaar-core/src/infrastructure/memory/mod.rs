//! In-process implementations of the store and email ports. They back the
//! development server and the test suites.

mod credential_store;
mod email_gateway;

pub use credential_store::InMemoryCredentialStore;
pub use email_gateway::{DeliveryMode, RecordingEmailGateway};
