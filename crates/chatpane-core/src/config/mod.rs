#[allow(clippy::module_inception)]
pub mod config;
pub mod credentials;
pub use config::WidgetConfig;
pub use credentials::{Credential, CredentialManager, CREDENTIAL_PREFIX, CREDENTIAL_STORE_KEY};
