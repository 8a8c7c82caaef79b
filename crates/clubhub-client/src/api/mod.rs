//! Authenticated REST request pipeline.

mod client;
mod request;

pub use client::ApiClient;
pub use request::{Method, RequestDescriptor};

/// Supplies the bearer credential attached to outgoing requests.
pub trait CredentialSource: Send + Sync {
    fn credential(&self) -> Option<String>;
}

/// Credential source for unauthenticated clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialSource for Anonymous {
    fn credential(&self) -> Option<String> {
        None
    }
}
