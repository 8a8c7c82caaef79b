//! ClubHub Client Library
//!
//! Client side of the ClubHub gym and club management platform:
//!
//! - **Request pipeline**: authenticated JSON calls against the REST backend
//! - **Session store**: durable identity and credential records
//! - **Session context**: login, logout, role switching and profile updates
//! - **Route guard**: role-based access decisions for dashboards
//!
//! ## Modules
//!
//! - [`api`]: request descriptors and the HTTP client
//! - [`config`]: configuration from `CLUBHUB_*` environment variables
//! - [`error`]: error taxonomy shared by every layer
//! - [`guard`]: route guard and role landing surfaces
//! - [`services`]: auth and role-scoped endpoint wrappers
//! - [`session`]: identity model, session store and session context
//! - [`storage`]: key-value persistence backends
//!
//! ## Example
//!
//! ```ignore
//! use clubhub_client::{ClientConfig, FileStore, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let store = FileStore::new(config.session_path()?);
//!     let session = SessionContext::from_config(&config, store)?;
//!     let identity = session.login("a@b.com", "secret", None).await?;
//!     println!("{} is a {}", identity.name, identity.role);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod result_ext;
pub mod services;
pub mod session;
pub mod storage;

pub use api::{ApiClient, CredentialSource, Method, RequestDescriptor};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use guard::{GuardDecision, RouteGuard};
pub use session::{
    Identity, IdentityPatch, Role, SessionContext, SessionRecord, SessionScope, SessionSnapshot,
    SessionStore,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
