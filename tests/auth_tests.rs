//! Tests for operator bearer-token authentication

mod common;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
use common::{call, create_provider, create_test_app, operator_post, post_json};
use live_chat_api::api::bearer_token;
use live_chat_api::core::errors::SupportError;
use serde_json::json;

#[test]
fn test_bearer_token_valid() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Bearer abc.def.ghi"),
    );

    assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
}

#[test]
fn test_bearer_token_missing_header() {
    let result = bearer_token(&HeaderMap::new());

    match result {
        Err(SupportError::Unauthorized(message)) => assert!(message.contains("Missing")),
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test]
fn test_bearer_token_wrong_scheme() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Basic bmluaTpzZWNyZXQ="),
    );

    assert!(matches!(
        bearer_token(&headers),
        Err(SupportError::Unauthorized(_))
    ));
}

#[test]
fn test_bearer_token_empty() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));

    assert!(bearer_token(&headers).is_err());
}

#[test]
fn test_bearer_token_invalid_utf8() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap(),
    );

    assert!(matches!(
        bearer_token(&headers),
        Err(SupportError::Unauthorized(_))
    ));
}

async fn start(app: &axum::Router) -> String {
    let (_, json) = call(app, post_json("/support/start", json!({ "message": "Hi" }))).await;
    json["conversationId"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_operator_route_without_token_is_unauthorized() {
    let app = create_test_app(create_provider());
    let id = start(&app).await;

    for action in ["seen", "join", "typing", "resolve"] {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/operator/{action}/{id}"))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "typing": true }).to_string()))
            .unwrap();

        let (status, json) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{action}");
        assert_eq!(json["error"], "Missing Authorization header");
    }
}

#[tokio::test]
async fn test_operator_route_with_invalid_token_is_unauthorized() {
    let app = create_test_app(create_provider());
    let id = start(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/operator/join/{id}"))
        .header("Authorization", "Bearer forged-token")
        .body(Body::empty())
        .unwrap();

    let (status, json) = call(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid or expired token");

    // nothing changed
    let (_, presence) = call(
        &app,
        common::get(&format!("/support/status/{id}")),
    )
    .await;
    assert_eq!(presence["operatorJoined"], false);
}

#[tokio::test]
async fn test_operator_route_with_valid_token() {
    let app = create_test_app(create_provider());
    let id = start(&app).await;

    let (status, _) = call(&app, operator_post(&format!("/operator/join/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let app = create_test_app(create_provider());
    let id = start(&app).await;

    for uri in [
        format!("/messages/{id}"),
        format!("/support/typing/{id}"),
        format!("/support/status/{id}"),
        "/operator/conversations".to_owned(),
    ] {
        let (status, _) = call(&app, common::get(&uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}
