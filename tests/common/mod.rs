#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cadastro::Config;
use cadastro::services::cep_service::canonicalize;
use cadastro::services::{CepError, CepInfo, CepService};

/// Bootstrap admin seeded at startup (must match `AuthConfig::default`).
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Scripted stand-in for the postal-code normalizer. Codes can resolve
/// always, a limited number of times, or not at all.
pub struct ScriptedCep {
    entries: Mutex<HashMap<String, Entry>>,
}

enum Entry {
    Known(CepInfo),
    KnownTimes(CepInfo, usize),
}

fn info(digits: &str, street: &str, neighborhood: &str, city: &str, state: &str) -> CepInfo {
    CepInfo {
        postal_code: digits.to_string(),
        street: street.to_string(),
        neighborhood: neighborhood.to_string(),
        city: city.to_string(),
        state: state.to_string(),
    }
}

impl ScriptedCep {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The code resolves on every lookup.
    pub fn known(
        self,
        code: &str,
        street: &str,
        neighborhood: &str,
        city: &str,
        state: &str,
    ) -> Self {
        let digits = canonicalize(code).unwrap();
        self.entries.lock().unwrap().insert(
            digits.clone(),
            Entry::Known(info(&digits, street, neighborhood, city, state)),
        );
        self
    }

    /// The code resolves `times` times, then reports not-found. Used to
    /// script a lookup whose answer changes between pre-flight and
    /// creation.
    pub fn known_times(
        self,
        code: &str,
        street: &str,
        neighborhood: &str,
        city: &str,
        state: &str,
        times: usize,
    ) -> Self {
        let digits = canonicalize(code).unwrap();
        self.entries.lock().unwrap().insert(
            digits.clone(),
            Entry::KnownTimes(info(&digits, street, neighborhood, city, state), times),
        );
        self
    }
}

#[async_trait]
impl CepService for ScriptedCep {
    async fn resolve(&self, postal_code: &str) -> Result<CepInfo, CepError> {
        let digits = canonicalize(postal_code)?;
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&digits) {
            Some(Entry::Known(info)) => Ok(info.clone()),
            Some(Entry::KnownTimes(info, remaining)) => {
                if *remaining == 0 {
                    return Err(CepError::NotFound(digits));
                }
                *remaining -= 1;
                Ok(info.clone())
            }
            None => Err(CepError::NotFound(digits)),
        }
    }
}

pub async fn spawn_app(cep: ScriptedCep) -> Router {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    // One pooled connection so the in-memory database is shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = cadastro::api::create_app_state_with_cep(config, Arc::new(cep))
        .await
        .expect("Failed to create app state");
    cadastro::api::router(state)
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = if let Some(body) = body {
        builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Registers a user through the public signup endpoint and returns its id.
pub async fn signup(app: &Router, name: &str, email: &str, password: &str) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"name": name, "email": email, "password": password})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}
