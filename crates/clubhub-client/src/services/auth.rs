//! Authentication endpoints.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::result_ext::ResultExt;
use crate::session::identity::ServerUser;

/// Standard response envelope: `{status, data?, message?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap `data`, failing with the payload's message when the envelope
    /// does not report success.
    pub fn into_data(self, fallback: &str) -> ClientResult<T> {
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        if self.status.as_deref() != Some("success") {
            return Err(ClientError::Logical(message));
        }
        self.data.ok_or(ClientError::Logical(message))
    }
}

/// `data` of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user: ServerUser,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Client for `/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// POST /auth/login with `{email, password}`.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginData> {
        let body = self
            .api
            .post(
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        login_data(body)
    }

    /// POST /auth/register with an arbitrary registration payload.
    pub async fn register(&self, payload: Value) -> ClientResult<Value> {
        self.api
            .post("/auth/register", Some(payload))
            .await
            .log("registering account")
    }

    /// GET /auth/branches
    pub async fn branches(&self) -> ClientResult<Value> {
        self.api.get("/auth/branches").await.log("loading branches")
    }

    /// POST /auth/refresh-token, returning the new credential.
    ///
    /// Accepts both `{token}` and `{data: {token}}` responses.
    pub async fn refresh_token(&self, refresh_token: &str) -> ClientResult<String> {
        let body = self
            .api
            .post(
                "/auth/refresh-token",
                Some(json!({ "refreshToken": refresh_token })),
            )
            .await
            .log("refreshing credential")?;

        extract_token(&body)
            .ok_or_else(|| ClientError::Decode("refresh response carries no token".to_string()))
    }
}

/// Check the envelope status before decoding `data`: failed logins may carry
/// a `data` object that is not shaped like [`LoginData`].
fn login_data(body: Value) -> ClientResult<LoginData> {
    let envelope: Envelope<Value> = serde_json::from_value(body)?;
    let data = envelope.into_data("Login failed")?;
    Ok(serde_json::from_value(data)?)
}

fn extract_token(body: &Value) -> Option<String> {
    body.get("token")
        .or_else(|| body.get("data").and_then(|d| d.get("token")))
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_envelope_success() {
        let envelope: Envelope<LoginData> = serde_json::from_value(json!({
            "status": "success",
            "data": {
                "token": "abc123",
                "user": {"_id": "u1", "email": "a@b.com", "role": "member"}
            }
        }))
        .unwrap();

        let data = envelope.into_data("Login failed").unwrap();
        assert_eq!(data.token, "abc123");
        assert_eq!(data.user.id, "u1");
        assert!(data.refresh_token.is_none());
    }

    #[test]
    fn test_login_envelope_fail_uses_message() {
        let envelope: Envelope<LoginData> = serde_json::from_value(json!({
            "status": "fail",
            "message": "Invalid credentials"
        }))
        .unwrap();

        let err = envelope.into_data("Login failed").unwrap_err();
        assert_eq!(err, ClientError::Logical("Invalid credentials".to_string()));
    }

    #[test]
    fn test_login_fail_with_data_reports_server_message() {
        let err = login_data(json!({
            "status": "fail",
            "message": "Invalid credentials",
            "data": {"errors": ["bad"]}
        }))
        .unwrap_err();
        assert_eq!(err, ClientError::Logical("Invalid credentials".to_string()));
    }

    #[test]
    fn test_login_success_with_bad_data_is_decode_error() {
        let err = login_data(json!({"status": "success", "data": {"errors": []}})).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));

        let data = login_data(json!({
            "status": "success",
            "data": {"token": "abc123", "user": {"_id": "u1", "email": "a@b.com", "role": "member"}}
        }))
        .unwrap();
        assert_eq!(data.token, "abc123");
    }

    #[test]
    fn test_envelope_without_message_uses_fallback() {
        let envelope: Envelope<LoginData> =
            serde_json::from_value(json!({"status": "error"})).unwrap();
        assert_eq!(
            envelope.into_data("Login failed").unwrap_err().message(),
            "Login failed"
        );

        let envelope: Envelope<LoginData> =
            serde_json::from_value(json!({"status": "success"})).unwrap();
        assert!(matches!(
            envelope.into_data("Login failed"),
            Err(ClientError::Logical(_))
        ));
    }

    #[test]
    fn test_extract_token_shapes() {
        assert_eq!(extract_token(&json!({"token": "t1"})).as_deref(), Some("t1"));
        assert_eq!(
            extract_token(&json!({"status": "success", "data": {"token": "t2"}})).as_deref(),
            Some("t2")
        );
        assert!(extract_token(&json!({"token": ""})).is_none());
        assert!(extract_token(&Value::Null).is_none());
    }
}
