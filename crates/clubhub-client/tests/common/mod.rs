//! Common test utilities: an in-process stub of the ClubHub backend.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use clubhub_client::{ClientConfig, MemoryStore, SessionContext};

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "abc123";

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match (email, password) {
        ("locked@b.com", _) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "fail", "message": "Account locked"})),
        ),
        ("rejected@b.com", _) => (
            StatusCode::OK,
            Json(json!({
                "status": "fail",
                "message": "Invalid credentials",
                "data": {"errors": ["password does not match"]}
            })),
        ),
        ("coach@b.com", PASSWORD) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": {
                    "token": "coach-token",
                    "user": {
                        "_id": "c1",
                        "email": "coach@b.com",
                        "name": "Casey Coach",
                        "role": "coach",
                        "roles": ["coach", "member"],
                        "permissions": ["schedule:write"],
                        "branch": "br-1"
                    }
                }
            })),
        ),
        (EMAIL, PASSWORD) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": {
                    "token": TOKEN,
                    "user": {"_id": "u1", "email": EMAIL, "role": "member"}
                }
            })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({"status": "fail", "message": "Invalid credentials"})),
        ),
    }
}

/// Echoes what the pipeline sent so tests can inspect it.
async fn echo(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "authorization": header_value(header::AUTHORIZATION),
        "contentType": header_value(header::CONTENT_TYPE),
        "query": query,
    }))
}

async fn refresh(Json(body): Json<Value>) -> Json<Value> {
    let refresh_token = body["refreshToken"].as_str().unwrap_or_default();
    Json(json!({ "token": format!("fresh-{}", refresh_token) }))
}

async fn branches() -> Json<Value> {
    Json(json!({"status": "success", "data": [{"_id": "br-1", "name": "Downtown"}]}))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
}

async fn delete_message(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Start the stub on an ephemeral port and return its API base URL.
pub async fn spawn_backend() -> String {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh))
        .route("/auth/branches", get(branches))
        .route("/member/schedule", get(echo))
        .route("/member/messages/{id}", delete(delete_message))
        .route("/broken", get(broken));
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub backend");
    let addr = listener.local_addr().expect("stub backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend stopped");
    });

    format!("http://{}/api", addr)
}

pub fn config_for(api_url: &str) -> ClientConfig {
    ClientConfig {
        api_url: api_url.to_string(),
        ..ClientConfig::default()
    }
}

/// Session context over a fresh in-memory store talking to `api_url`.
pub fn memory_session(api_url: &str) -> SessionContext<MemoryStore> {
    SessionContext::from_config(&config_for(api_url), MemoryStore::new())
        .expect("Failed to build session context")
}
