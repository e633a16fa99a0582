#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use emojipedia_server::{app, AppState, ServerConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = ServerConfig::with_base_dir(dir.path(), SECRET);
    // Lowest bcrypt cost keeps the suite fast.
    config.hash_cost = 4;
    let state = AppState::new(config).await.unwrap();

    TestApp {
        router: app(state.clone()),
        state,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("access-token", token);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), body).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Register and return `(token, user_id)`.
    pub async fn register(&self, name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/user",
                None,
                json!({ "name": name, "email": email, "password": "password1" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Create an emoji post as `token`, returning its id.
    pub async fn create_emoji(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/emoji",
                Some(token),
                json!({ "emoji": "🦀", "title": title, "description": "a post" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create emoji failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_profile(&self, token: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/profile",
                Some(token),
                json!({
                    "status": "Developer",
                    "skills": "rust, sql , axum",
                    "github": "octocat",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create profile failed: {body}");
        body
    }
}
