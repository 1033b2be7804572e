pub mod config;
pub mod error;
pub mod providers;
pub mod storage;
pub mod widget;

pub use config::{Credential, CredentialManager, WidgetConfig, CREDENTIAL_PREFIX};
pub use error::{CredentialError, EndpointError, StorageError, SubmitRejected, ValidationError};
pub use providers::{classify, AnthropicEndpoint, ChatEndpoint, ChatRequest, Outcome, Role, Turn};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use widget::{ChatWidget, Completion, Draft, PendingRequest, Session, Settlement};
