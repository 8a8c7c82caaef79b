//! Session orchestration.
//!
//! [`SessionContext`] owns the current identity for the lifetime of the
//! process. It is built explicitly (hydrating from the session store) and
//! shared by `Arc` with everything that needs it. Changes are published on
//! a `watch` channel so views can re-render.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;

use super::identity::{Identity, IdentityPatch, Role};
use super::store::SessionStore;
use crate::api::{ApiClient, CredentialSource};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::services::auth::AuthService;
use crate::storage::KeyValueStore;

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Process-wide session manager.
pub struct SessionContext<S> {
    auth: AuthService,
    store: Arc<SessionStore<S>>,
    state: RwLock<SessionSnapshot>,
    changes: watch::Sender<SessionSnapshot>,
}

impl<S: KeyValueStore + 'static> SessionContext<S> {
    /// Create a context over `store`, hydrating the identity from it.
    ///
    /// A credential left in the legacy location is migrated here, once.
    pub fn new(auth: AuthService, store: Arc<SessionStore<S>>) -> Self {
        if let Err(e) = store.migrate_legacy_credential() {
            tracing::warn!(error = %e, "Legacy credential could not be migrated");
        }

        let initial = SessionSnapshot {
            identity: store.read_identity(),
            loading: false,
            error: None,
        };
        tracing::debug!(
            authenticated = initial.is_authenticated(),
            "Session context initialized from store"
        );

        let (changes, _) = watch::channel(initial.clone());
        Self {
            auth,
            store,
            state: RwLock::new(initial),
            changes,
        }
    }

    /// Wire the whole stack: store over `backend`, API client authenticating
    /// from that store, auth service, context.
    pub fn from_config(config: &ClientConfig, backend: S) -> ClientResult<Self> {
        let store = Arc::new(SessionStore::new(backend));
        let credentials: Arc<dyn CredentialSource> = store.clone();
        let api = ApiClient::new(config, credentials)?;
        Ok(Self::new(AuthService::new(api), store))
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// API client sharing this session's credential.
    pub fn api(&self) -> &ApiClient {
        self.auth.api()
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.read().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().identity.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.changes.subscribe()
    }

    /// Authenticate and establish a session.
    ///
    /// `role` is the role the caller intends to act as; the server decides
    /// the principal's roles and it is not transmitted. On failure the
    /// message is recorded in [`error`](Self::error), the previous session
    /// is left as it was, and the error is returned.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> ClientResult<Identity> {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });
        let _loading = LoadingGuard { state: self };

        if let Some(role) = role {
            tracing::debug!(requested_role = %role, "Login role hint is not sent to the server");
        }

        match self.authenticate(email, password).await {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, role = %identity.role, "Logged in");
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                let message = e.message();
                self.update(|s| s.error = Some(message));
                Err(e)
            }
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> ClientResult<Identity> {
        let data = self.auth.login(email, password).await?;
        let identity = Identity::try_from(data.user)?;

        self.store.write_session(&identity, &data.token)?;

        let current = identity.clone();
        self.update(|s| s.identity = Some(current));
        Ok(identity)
    }

    /// End the session. No network call; always succeeds.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Session records could not be removed");
        }
        self.update(|s| {
            s.identity = None;
            s.error = None;
        });
        tracing::info!("Logged out");
    }

    /// Make `role` the active role if the principal holds it.
    ///
    /// Returns `Ok(false)` without touching anything when logged out or when
    /// `role` is not among the principal's roles.
    pub fn switch_active_role(&self, role: Role) -> ClientResult<bool> {
        let Some(mut identity) = self.identity() else {
            return Ok(false);
        };
        if !identity.has_role(role) {
            tracing::debug!(role = %role, "Ignoring switch to a role the principal does not hold");
            return Ok(false);
        }

        identity.role = role;
        self.store.write_identity(&identity)?;
        self.update(|s| s.identity = Some(identity));
        tracing::info!(role = %role, "Active role switched");
        Ok(true)
    }

    /// Shallow-merge `patch` into the current identity and persist it.
    ///
    /// Returns the updated identity, or `None` when logged out.
    pub fn update_identity(&self, patch: IdentityPatch) -> ClientResult<Option<Identity>> {
        let Some(mut identity) = self.identity() else {
            return Ok(None);
        };

        identity.apply(patch);
        self.store.write_identity(&identity)?;
        let updated = identity.clone();
        self.update(|s| s.identity = Some(updated));
        Ok(Some(identity))
    }

    /// Exchange `refresh_token` for a new credential and store it.
    ///
    /// Only runs when called; nothing refreshes credentials implicitly.
    pub async fn refresh_credential(&self, refresh_token: &str) -> ClientResult<String> {
        let token = self.auth.refresh_token(refresh_token).await?;
        self.store.write_credential(&token)?;
        tracing::info!("Credential refreshed");
        Ok(token)
    }

    fn update(&self, apply: impl FnOnce(&mut SessionSnapshot)) {
        let snapshot = {
            let mut state = self.state.write();
            apply(&mut state);
            state.clone()
        };
        self.changes.send_replace(snapshot);
    }
}

/// Clears `loading` on every exit path of `login`.
struct LoadingGuard<'a, S: KeyValueStore + 'static> {
    state: &'a SessionContext<S>,
}

impl<S: KeyValueStore + 'static> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.state.update(|s| s.loading = false);
    }
}

/// Slot through which consumers reach the established session.
///
/// Reading before [`establish`](Self::establish) is a configuration error:
/// the session must exist before anything depending on it starts.
pub struct SessionScope<S> {
    slot: OnceLock<Arc<SessionContext<S>>>,
}

impl<S> Default for SessionScope<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SessionScope<S> {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub fn establish(&self, session: Arc<SessionContext<S>>) -> ClientResult<()> {
        self.slot
            .set(session)
            .map_err(|_| ClientError::Config("session context is already established".to_string()))
    }

    pub fn session(&self) -> ClientResult<Arc<SessionContext<S>>> {
        self.slot.get().cloned().ok_or_else(|| {
            ClientError::Config(
                "session context is not established; create it before its consumers".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn offline_context(store: MemoryStore) -> SessionContext<MemoryStore> {
        // Nothing listens here; these tests never reach the network.
        let config = ClientConfig {
            api_url: "http://127.0.0.1:9/api".to_string(),
            ..ClientConfig::default()
        };
        SessionContext::from_config(&config, store).unwrap()
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .set(
                "user",
                r#"{"id":"u1","email":"a@b.com","name":"Alex","avatar":"x","role":"member","roles":["member","coach"]}"#,
            )
            .unwrap();
        store.set("token", "abc123").unwrap();
        store
    }

    #[test]
    fn test_hydrates_from_store() {
        let ctx = offline_context(seeded_store());
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.identity().unwrap().role, Role::Member);
        assert!(!ctx.is_loading());
    }

    #[test]
    fn test_legacy_credential_migrated_on_construction() {
        let store = MemoryStore::new();
        store
            .set(
                "user",
                r#"{"id":"u1","email":"a@b.com","name":"Alex","avatar":"x","role":"member","roles":["member"],"token":"legacy"}"#,
            )
            .unwrap();

        let ctx = offline_context(store);

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.store().backend().get("token").as_deref(), Some("legacy"));
    }

    #[test]
    fn test_malformed_store_starts_logged_out() {
        let store = MemoryStore::new();
        store.set("user", "definitely not json").unwrap();
        let ctx = offline_context(store);
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_switch_role_only_to_held_roles() {
        let ctx = offline_context(seeded_store());

        assert!(!ctx.switch_active_role(Role::Admin).unwrap());
        assert_eq!(ctx.identity().unwrap().role, Role::Member);

        assert!(ctx.switch_active_role(Role::Coach).unwrap());
        assert_eq!(ctx.identity().unwrap().role, Role::Coach);
        assert_eq!(ctx.store().read_identity().unwrap().role, Role::Coach);
    }

    #[test]
    fn test_switch_role_when_logged_out_is_noop() {
        let ctx = offline_context(MemoryStore::new());
        assert!(!ctx.switch_active_role(Role::Member).unwrap());
        assert!(ctx.store().backend().is_empty());
    }

    #[test]
    fn test_update_identity_merges_and_persists() {
        let ctx = offline_context(seeded_store());
        let updated = ctx
            .update_identity(IdentityPatch {
                phone: Some("+1-555-0100".to_string()),
                ..IdentityPatch::default()
            })
            .unwrap()
            .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("+1-555-0100"));
        assert_eq!(updated.name, "Alex");
        assert_eq!(ctx.store().read_identity(), Some(updated));
    }

    #[test]
    fn test_update_identity_when_logged_out_is_noop() {
        let ctx = offline_context(MemoryStore::new());
        let result = ctx
            .update_identity(IdentityPatch {
                name: Some("Ghost".to_string()),
                ..IdentityPatch::default()
            })
            .unwrap();
        assert!(result.is_none());
        assert!(ctx.store().read_identity().is_none());
    }

    #[test]
    fn test_logout_clears_everything() {
        let ctx = offline_context(seeded_store());
        let mut changes = ctx.subscribe();

        ctx.logout();

        assert!(!ctx.is_authenticated());
        assert!(ctx.store().backend().is_empty());
        assert!(changes.has_changed().unwrap());
        assert!(!changes.borrow_and_update().is_authenticated());

        ctx.logout();
        assert!(ctx.store().backend().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_records_error_and_keeps_session() {
        let ctx = offline_context(seeded_store());

        let err = ctx.login("a@b.com", "pw", Some(Role::Member)).await.unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(ctx.error(), Some(err.message()));
        assert!(!ctx.is_loading());
        assert_eq!(ctx.identity().unwrap().id, "u1");
        assert_eq!(ctx.store().read_credential().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_scope_fails_fast_until_established() {
        let scope: SessionScope<MemoryStore> = SessionScope::new();
        assert!(matches!(scope.session(), Err(ClientError::Config(_))));

        let ctx = Arc::new(offline_context(MemoryStore::new()));
        scope.establish(ctx.clone()).unwrap();
        assert!(Arc::ptr_eq(&scope.session().unwrap(), &ctx));
        assert!(matches!(scope.establish(ctx), Err(ClientError::Config(_))));
    }
}
