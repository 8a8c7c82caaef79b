//! Durable session records.
//!
//! Two independent records live in the backing [`KeyValueStore`]:
//! - `user`: JSON-serialized [`Identity`]
//! - `token`: raw bearer credential
//!
//! Older clients embedded the credential in the `user` record. It is still
//! read from there as a fallback, and [`SessionStore::migrate_legacy_credential`]
//! moves it into the `token` record once per process.

use serde::Serialize;

use super::identity::Identity;
use crate::api::CredentialSource;
use crate::error::ClientResult;
use crate::result_ext::ResultExt;
use crate::storage::KeyValueStore;

pub const IDENTITY_KEY: &str = "user";
pub const CREDENTIAL_KEY: &str = "token";

/// Combined view of both session records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub identity: Option<Identity>,
    pub credential: Option<String>,
}

/// Session persistence over a key-value store.
#[derive(Debug)]
pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Stored identity. Absent and malformed records both read as `None`.
    ///
    /// A record whose active role is not among its roles is malformed.
    pub fn read_identity(&self) -> Option<Identity> {
        let raw = self.backend.get(IDENTITY_KEY)?;
        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) if identity.has_role(identity.role) => Some(identity),
            Ok(identity) => {
                tracing::warn!(
                    role = %identity.role,
                    "Stored identity holds an active role outside its roles, treating as logged out"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored identity is malformed, treating as logged out");
                None
            }
        }
    }

    pub fn write_identity(&self, identity: &Identity) -> ClientResult<()> {
        let raw = serde_json::to_string(identity)?;
        self.backend.set(IDENTITY_KEY, &raw).log("persisting identity")
    }

    /// Stored credential, preferring the dedicated record over the legacy
    /// field. Never writes.
    pub fn read_credential(&self) -> Option<String> {
        self.backend
            .get(CREDENTIAL_KEY)
            .filter(|t| !t.is_empty())
            .or_else(|| self.legacy_credential())
    }

    /// Copy a credential embedded in the `user` record into the `token`
    /// record when no dedicated credential exists yet.
    ///
    /// Returns whether anything was migrated.
    pub fn migrate_legacy_credential(&self) -> ClientResult<bool> {
        if self.backend.get(CREDENTIAL_KEY).is_some_and(|t| !t.is_empty()) {
            return Ok(false);
        }
        let Some(token) = self.legacy_credential() else {
            return Ok(false);
        };

        tracing::info!("Migrating credential embedded in stored identity");
        self.write_credential(&token)?;
        Ok(true)
    }

    pub fn write_credential(&self, credential: &str) -> ClientResult<()> {
        self.backend
            .set(CREDENTIAL_KEY, credential)
            .log("persisting credential")
    }

    /// Replace both records for a new session.
    ///
    /// The identity is written first. If either write fails, both records
    /// are put back to what they held before, so a credential never sits
    /// next to another principal's identity.
    pub fn write_session(&self, identity: &Identity, credential: &str) -> ClientResult<()> {
        let previous_identity = self.backend.get(IDENTITY_KEY);
        let previous_credential = self.backend.get(CREDENTIAL_KEY);

        let written = self
            .write_identity(identity)
            .and_then(|_| self.write_credential(credential));
        if written.is_err() {
            self.restore(IDENTITY_KEY, previous_identity.as_deref());
            self.restore(CREDENTIAL_KEY, previous_credential.as_deref());
        }
        written
    }

    fn restore(&self, key: &str, previous: Option<&str>) {
        let restored = match previous {
            Some(raw) => self.backend.set(key, raw),
            None => self.backend.remove(key),
        };
        let _ = restored.log("restoring previous session record");
    }

    /// Remove both records. Idempotent.
    pub fn clear(&self) -> ClientResult<()> {
        let identity = self.backend.remove(IDENTITY_KEY);
        let credential = self.backend.remove(CREDENTIAL_KEY);
        identity.and(credential).log("clearing session records")
    }

    pub fn load_record(&self) -> SessionRecord {
        SessionRecord {
            identity: self.read_identity(),
            credential: self.read_credential(),
        }
    }

    fn legacy_credential(&self) -> Option<String> {
        let raw = self.backend.get(IDENTITY_KEY)?;
        let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
        value
            .get("token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

impl<S: KeyValueStore> CredentialSource for SessionStore<S> {
    fn credential(&self) -> Option<String> {
        self.read_credential()
    }
}
