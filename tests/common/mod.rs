//! Shared wiring for the HTTP level tests: the in-memory store plus fake
//! identity provider and notifier, registered the same way `main` does.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use di::{Injectable, ServiceCollection, ServiceProvider, inject, injectable};
use di_axum::RouterServiceProviderExtensions;
use live_chat_api::api;
use live_chat_api::core::services::LiveChatConversationService;
use live_chat_api::infrastructure::errors::{IdentityError, NotifyError};
use live_chat_api::infrastructure::identity::{Operator, OperatorSession};
use live_chat_api::infrastructure::memory::InMemoryConversationRepository;
use live_chat_api::infrastructure::notifier::ConversationAlert;
use live_chat_api::infrastructure::traits::{IdentityProvider, Notifier};
use serde_json::Value;
use tower::ServiceExt;

pub const VALID_TOKEN: &str = "operator-token";
pub const OPERATOR_EMAIL: &str = "nini@example.com";
pub const OPERATOR_PASSWORD: &str = "correct horse";

pub struct StaticIdentityProvider;

#[injectable(IdentityProvider)]
impl StaticIdentityProvider {
    #[inject]
    pub fn create() -> StaticIdentityProvider {
        StaticIdentityProvider
    }
}

fn operator() -> Operator {
    Operator {
        id: "operator-1".to_owned(),
        email: Some(OPERATOR_EMAIL.to_owned()),
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Operator, IdentityError> {
        if token == VALID_TOKEN {
            Ok(operator())
        } else {
            Err(IdentityError::Rejected("Invalid or expired token".to_owned()))
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<OperatorSession, IdentityError> {
        if email == OPERATOR_EMAIL && password == OPERATOR_PASSWORD {
            Ok(OperatorSession {
                access_token: VALID_TOKEN.to_owned(),
                user: operator(),
            })
        } else {
            Err(IdentityError::Rejected("Invalid credentials".to_owned()))
        }
    }
}

pub struct SilentNotifier;

#[injectable(Notifier)]
impl SilentNotifier {
    #[inject]
    pub fn create() -> SilentNotifier {
        SilentNotifier
    }
}

#[async_trait]
impl Notifier for SilentNotifier {
    async fn conversation_started(&self, _alert: ConversationAlert) -> Result<(), NotifyError> {
        Ok(())
    }
}

pub fn create_provider() -> ServiceProvider {
    ServiceCollection::new()
        .add(InMemoryConversationRepository::singleton())
        .add(StaticIdentityProvider::singleton())
        .add(SilentNotifier::singleton())
        .add(LiveChatConversationService::singleton())
        .build_provider()
        .unwrap()
}

pub fn create_test_app(provider: ServiceProvider) -> Router {
    api::router().with_provider(provider)
}

pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // axum's own rejections are plain text
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn operator_post(uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {VALID_TOKEN}"));

    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
