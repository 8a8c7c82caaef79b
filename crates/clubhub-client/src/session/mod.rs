//! Session lifecycle: identity model, durable records and the context that
//! ties them to the auth service.

pub mod context;
pub mod identity;
pub mod store;

pub use context::{SessionContext, SessionScope, SessionSnapshot};
pub use identity::{avatar_for, Identity, IdentityPatch, Role};
pub use store::{SessionRecord, SessionStore};
