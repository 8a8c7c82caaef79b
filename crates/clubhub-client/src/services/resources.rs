//! Role-scoped resource endpoints (`/member/...`, `/coach/...`, `/admin/...`).
//!
//! These follow the uniform get/post/put/delete conventions of the backend.
//! Payload shapes belong to the callers, so results stay `serde_json::Value`.

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::session::identity::Role;

/// API calls under one role's path prefix.
#[derive(Debug, Clone)]
pub struct RoleApi {
    api: ApiClient,
    role: Role,
}

impl RoleApi {
    pub fn new(api: ApiClient, role: Role) -> Self {
        Self { api, role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// `/<role>/<path>`
    pub fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("/{}", self.role)
        } else {
            format!("/{}/{}", self.role, path)
        }
    }

    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        self.api.get(&self.endpoint(path)).await
    }

    pub async fn get_with_query<K, V>(&self, path: &str, query: &[(K, V)]) -> ClientResult<Value>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.api.get_with_query(&self.endpoint(path), query).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> ClientResult<Value> {
        self.api.post(&self.endpoint(path), body).await
    }

    pub async fn put(&self, path: &str, body: Option<Value>) -> ClientResult<Value> {
        self.api.put(&self.endpoint(path), body).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        self.api.delete(&self.endpoint(path)).await
    }
}

/// Member dashboard: schedule, progress, clubs, payments and messages.
#[derive(Debug, Clone)]
pub struct MemberApi {
    scope: RoleApi,
}

impl MemberApi {
    pub fn new(api: ApiClient) -> Self {
        Self {
            scope: RoleApi::new(api, Role::Member),
        }
    }

    pub async fn dashboard(&self) -> ClientResult<Value> {
        self.scope.get("dashboard").await
    }

    /// Class schedule, optionally filtered (e.g. `week`, `branch`).
    pub async fn schedule(&self, query: &[(String, String)]) -> ClientResult<Value> {
        self.scope.get_with_query("schedule", query).await
    }

    pub async fn progress(&self) -> ClientResult<Value> {
        self.scope.get("progress").await
    }

    pub async fn clubs(&self) -> ClientResult<Value> {
        self.scope.get("clubs").await
    }

    /// Ask to join a club; admins approve or reject the request.
    pub async fn join_club(&self, club_id: &str) -> ClientResult<Value> {
        self.scope
            .post(&format!("clubs/{}/join", club_id), None)
            .await
    }

    pub async fn payments(&self) -> ClientResult<Value> {
        self.scope.get("payments").await
    }

    pub async fn messages(&self) -> ClientResult<Value> {
        self.scope.get("messages").await
    }

    pub async fn send_message(&self, message: Value) -> ClientResult<Value> {
        self.scope.post("messages", Some(message)).await
    }
}

#[derive(Debug, Clone)]
pub struct CoachApi {
    scope: RoleApi,
}

impl CoachApi {
    pub fn new(api: ApiClient) -> Self {
        Self {
            scope: RoleApi::new(api, Role::Coach),
        }
    }

    pub async fn dashboard(&self) -> ClientResult<Value> {
        self.scope.get("dashboard").await
    }

    pub async fn clients(&self) -> ClientResult<Value> {
        self.scope.get("clients").await
    }

    pub async fn sessions(&self) -> ClientResult<Value> {
        self.scope.get("sessions").await
    }
}

/// Branch administration, including the club-join approval queue.
#[derive(Debug, Clone)]
pub struct AdminApi {
    scope: RoleApi,
}

impl AdminApi {
    pub fn new(api: ApiClient) -> Self {
        Self {
            scope: RoleApi::new(api, Role::Admin),
        }
    }

    pub async fn dashboard(&self) -> ClientResult<Value> {
        self.scope.get("dashboard").await
    }

    pub async fn members(&self, query: &[(String, String)]) -> ClientResult<Value> {
        self.scope.get_with_query("members", query).await
    }

    pub async fn join_requests(&self) -> ClientResult<Value> {
        self.scope.get("join-requests").await
    }

    pub async fn approve_join_request(&self, request_id: &str) -> ClientResult<Value> {
        self.scope
            .put(&format!("join-requests/{}/approve", request_id), None)
            .await
    }

    pub async fn reject_join_request(&self, request_id: &str) -> ClientResult<Value> {
        self.scope
            .put(&format!("join-requests/{}/reject", request_id), None)
            .await
    }
}
