pub mod auth;
pub mod local;
pub mod remote;
pub mod rest;

pub use auth::{AuthSession, StaticAuth, UserId};
pub use local::{InMemoryLocalStore, JsonFileStore, LocalStore, StoreError};
pub use remote::{DisabledRemoteStore, InMemoryRemoteStore, RemoteDocumentStore, RemoteError};
pub use rest::RestRemoteStore;
