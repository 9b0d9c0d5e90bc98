// Common test utilities for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use corelog_backend::api;
use corelog_backend::app_data::AppData;
use corelog_backend::audit::AuditEmitter;
use corelog_backend::config::{BootstrapSettings, DatabaseConnections, EnvironmentProvider};
use corelog_backend::types::internal::audit::{AuditLogEntry, AuditQuery};
use corelog_backend::types::internal::context::Identity;
use poem::http::{Method, StatusCode};
use poem::{Endpoint, IntoResponse, Request, Route};
use serde_json::Value;

pub const TEST_JWT_SECRET: &str = "integration-secret-key-minimum-32-characters";

/// Fixed environment for building settings without touching process env
struct TestEnvironment {
    vars: HashMap<&'static str, &'static str>,
}

impl EnvironmentProvider for TestEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).map(|v| v.to_string())
    }
}

pub fn test_settings() -> BootstrapSettings {
    let env = TestEnvironment {
        vars: HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("AUDIT_DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", TEST_JWT_SECRET),
            ("PASSWORD_PEPPER", "integration-pepper"),
            ("AUDIT_BUFFER_SIZE", "64"),
        ]),
    };

    BootstrapSettings::from_env_provider(Arc::new(env)).expect("Failed to load test settings")
}

/// The full application wired against in-memory databases
pub struct TestApp {
    pub app_data: AppData,
    pub routes: Route,
    token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let settings = test_settings();
        let connections = DatabaseConnections::init(&settings)
            .await
            .expect("Failed to connect test databases");
        connections.migrate().await.expect("Failed to run migrations");

        let app_data = AppData::init(connections, &settings);
        let (emitter, _writer) = AuditEmitter::spawn(app_data.audit_store.clone(), settings.audit_buffer_size());
        let routes = api::routes(&app_data, emitter, "http://localhost:3000");

        let token = app_data
            .token_provider
            .issue_token(&Identity::new("admin-1", "admin"), 3600)
            .expect("Failed to issue test token");

        Self {
            app_data,
            routes,
            token,
        }
    }

    /// Send an authenticated request and return the status and JSON body
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.dispatch(method, uri, body, Some(&self.token)).await
    }

    /// Send a request without an Authorization header
    pub async fn send_anonymous(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.dispatch(method, uri, body, None).await
    }

    /// Send an authenticated request with a raw body and content type
    pub async fn send_raw(&self, method: Method, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri_str(uri)
            .header("Authorization", format!("Bearer {}", self.token))
            .content_type(content_type)
            .body(body.to_string());

        self.finish(req).await
    }

    async fn dispatch(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri_str(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder.content_type("application/json").body(body.to_string()),
            None => builder.finish(),
        };

        self.finish(req).await
    }

    async fn finish(&self, req: Request) -> (StatusCode, Value) {
        let resp = match self.routes.call(req).await {
            Ok(resp) => resp,
            Err(err) => err.into_response(),
        };
        let status = resp.status();
        let text = resp.into_body().into_string().await.expect("Failed to read response body");
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);

        (status, json)
    }

    /// Wait until the background writer has stored at least `count` entries
    ///
    /// Returns the entries newest first.
    pub async fn wait_for_audit_entries(&self, count: u64) -> Vec<AuditLogEntry> {
        for _ in 0..200 {
            let page = self
                .app_data
                .audit_store
                .query(&AuditQuery::default())
                .await
                .expect("Failed to query audit log");
            if page.total >= count {
                return page.list;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        panic!("Timed out waiting for {} audit entries", count);
    }

    /// Create a document through the API and return its id
    pub async fn create_document(&self, collection: &str, body: Value) -> String {
        let (status, json) = self
            .send(Method::POST, &format!("/api/admin/core/{}", collection), Some(body))
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", json);

        json["data"]["_id"].as_str().expect("created document has no _id").to_string()
    }
}
