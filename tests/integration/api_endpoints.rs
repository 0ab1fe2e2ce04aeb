//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - CRUD endpoints return the stored records with the right status codes
//! - Validation, not-found and probe failures map to 400/404 bodies
//! - Authentication middleware functions properly

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use rmon::{
    Prober, Registry,
    api::{ApiState, spawn_api_server},
    config::ApiConfig,
    storage::memory::MemoryBackend,
};
use serde_json::{Value, json};

use super::helpers::{closed_port, spawn_fake_redis};

const TOKEN: &str = "test-token";

async fn spawn_test_api() -> SocketAddr {
    let registry = Registry::new(Arc::new(MemoryBackend::new()));
    let state = ApiState::new(registry, Prober::new(Duration::from_secs(2)));

    let config = ApiConfig {
        bind: "127.0.0.1:0".parse().unwrap(),
        auth_token: Some(TOKEN.to_string()),
        enable_cors: true,
    };

    spawn_api_server(config, state).await.unwrap()
}

struct Client {
    addr: SocketAddr,
    http: reqwest::Client,
}

impl Client {
    fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}/api/v1{}", self.addr, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let response = request.bearer_auth(TOKEN).send().await.unwrap();
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(self.http.get(self.url(path))).await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(self.http.post(self.url(path)).json(&body)).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(self.http.put(self.url(path)).json(&body)).await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(self.http.delete(self.url(path))).await
    }
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let client = Client::new(spawn_test_api().await);

    let (status, body) = client.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_then_update_scenario() {
    let client = Client::new(spawn_test_api().await);

    let (status, created) = client
        .post(
            "/servers",
            json!({ "name": "cache-1", "host": "10.0.0.5", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["port"], 6379);
    assert_eq!(created["created_at"], created["updated_at"]);
    assert!(created.get("password").is_none());
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = client
        .put(
            &format!("/servers/{id}"),
            json!({ "description": "primary cache" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "primary cache");
    assert_eq!(updated["host"], "10.0.0.5");
    assert_eq!(updated["port"], 6379);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_ne!(updated["updated_at"], created["updated_at"]);

    let (status, fetched) = client.get(&format!("/servers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_list_servers() {
    let client = Client::new(spawn_test_api().await);

    client
        .post("/servers", json!({ "name": "cache-a", "host": "10.0.0.5" }))
        .await;
    client
        .post("/servers", json!({ "name": "cache-b", "host": "10.0.0.6" }))
        .await;

    let (status, body) = client.get("/servers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["servers"][0]["name"], "cache-a");
    assert_eq!(body["servers"][1]["name"], "cache-b");
}

#[tokio::test]
async fn test_validation_errors_are_bad_requests() {
    let client = Client::new(spawn_test_api().await);

    let (status, body) = client
        .post("/servers", json!({ "name": "cache-1", "host": "not-an-ip" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "host");

    let (status, body) = client
        .post(
            "/servers",
            json!({ "name": "cache-1", "host": "10.0.0.5", "port": 65536 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "port");

    client
        .post("/servers", json!({ "name": "cache-1", "host": "10.0.0.5" }))
        .await;
    let (status, body) = client
        .post("/servers", json!({ "name": "cache-1", "host": "10.0.0.6" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "name");
    assert_eq!(body["error"], "Redis server already exist");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let client = Client::new(spawn_test_api().await);

    let (status, body) = client
        .post("/servers", json!({ "name": "cache-1", "host": "10.0.0.5", "port": "high" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_non_numeric_id_is_json_bad_request() {
    let client = Client::new(spawn_test_api().await);

    for path in ["/servers/abc", "/servers/abc/ping", "/servers/abc/metrics"] {
        let (status, body) = client.get(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert!(body["error"].is_string(), "{path}");
    }

    let (status, body) = client.put("/servers/abc", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_explicit_null_is_rejected_per_field() {
    let client = Client::new(spawn_test_api().await);

    let (status, body) = client
        .post("/servers", json!({ "name": "cache-1", "host": null }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "host");
    assert_eq!(body["error"], "Field may not be null.");

    let (_, created) = client
        .post("/servers", json!({ "name": "cache-1", "host": "10.0.0.5" }))
        .await;
    let path = format!("/servers/{}", created["id"]);

    let (status, body) = client.put(&path, json!({ "name": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "name");

    let (_, stored) = client.get(&path).await;
    assert_eq!(stored["name"], "cache-1");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let client = Client::new(spawn_test_api().await);

    let (status, _) = client.get("/servers/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = client.put("/servers/99", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = client.delete("/servers/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = client.get("/servers/99/ping").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_returns_no_content() {
    let client = Client::new(spawn_test_api().await);

    let (_, created) = client
        .post("/servers", json!({ "name": "cache-1", "host": "10.0.0.5" }))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = client.delete(&format!("/servers/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = client.get(&format!("/servers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_probe_endpoints_against_fake_redis() {
    let client = Client::new(spawn_test_api().await);
    let redis = spawn_fake_redis(None).await;

    let (_, created) = client
        .post(
            "/servers",
            json!({ "name": "local", "host": "127.0.0.1", "port": redis.port() }),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = client.get(&format!("/servers/{id}/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "alive": true }));

    let (status, body) = client.get(&format!("/servers/{id}/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redis_version"], "7.2.4");
}

#[tokio::test]
async fn test_probe_failure_is_bad_request() {
    let client = Client::new(spawn_test_api().await);
    let port = closed_port().await;

    let (_, created) = client
        .post(
            "/servers",
            json!({ "name": "gone", "host": "127.0.0.1", "port": port }),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = client.get(&format!("/servers/{id}/ping")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "redis server 127.0.0.1 can not connected");

    let (status, _) = client.get(&format!("/servers/{id}/metrics")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // a failed probe leaves the record untouched
    let (_, fetched) = client.get(&format!("/servers/{id}")).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let addr = spawn_test_api().await;
    let http = reqwest::Client::new();

    let response = http
        .get(format!("http://{addr}/api/v1/servers"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = http
        .get(format!("http://{addr}/api/v1/servers"))
        .bearer_auth("wrong-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
