#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use ignite_api::config::AuthConfig;
use ignite_api::{AppState, AppStateInner, build_router};
use ignite_db::Database;
use ignite_types::patch::UserChanges;

pub const PASSWORD: &str = "correct-horse-battery";

/// Router plus direct access to its state for seeding.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

pub fn test_app() -> TestApp {
    let db = Database::open_in_memory().expect("in-memory database");
    let state = AppStateInner::new(db, AuthConfig::new("integration-test-secret"));
    let router = build_router(state.clone());
    TestApp { state, router }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Register a user and return its id.
    pub async fn register(&self, name: &str) -> i64 {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({ "name": name, "email": email_for(name), "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["id"].as_i64().unwrap()
    }

    pub async fn login(&self, name: &str) -> String {
        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email_for(name), "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Register + login; returns (user id, token).
    pub async fn user(&self, name: &str) -> (i64, String) {
        let id = self.register(name).await;
        (id, self.login(name).await)
    }

    /// Register a user, grant it `roles` directly in the store, then log in.
    pub async fn user_with_roles(&self, name: &str, roles: &[&str]) -> (i64, String) {
        let id = self.register(name).await;
        let changes = UserChanges {
            roles: Some(roles.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        };
        self.state.db.update_user(id, &changes).unwrap().unwrap();
        (id, self.login(name).await)
    }

    pub async fn create_category(&self, admin_token: &str, name: &str) -> i64 {
        let response = self
            .post("/api/admin/categories/", Some(admin_token), json!({ "name": name }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_i64().unwrap()
    }

    pub async fn create_idea(&self, token: &str, title: &str, category_id: i64) -> i64 {
        let response = self
            .post(
                "/api/ideas/",
                Some(token),
                json!({ "title": title, "description": "details", "category_id": category_id }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_i64().unwrap()
    }
}

pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
