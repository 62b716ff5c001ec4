use crate::core::errors::SupportError;
use crate::infrastructure::identity::Operator;
use crate::infrastructure::traits::IdentityProvider;
use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use di_axum::Inject;
use log::error;
use serde::de::DeserializeOwned;
use serde_json::json;

pub mod operator;
pub mod support;

/// All JSON endpoints of the service.
pub fn router() -> Router {
    Router::new()
        .merge(support::router())
        .merge(operator::router())
}

impl IntoResponse for SupportError {
    fn into_response(self) -> Response {
        let status = match &self {
            SupportError::Validation(_) | SupportError::State(_) => StatusCode::BAD_REQUEST,
            SupportError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SupportError::Dependency(reason) => {
                error!("{reason}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, SupportError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| SupportError::Unauthorized("Missing Authorization header".to_owned()))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| SupportError::Unauthorized("Invalid or expired token".to_owned()))
}

/// An operator whose bearer token the identity provider accepted.
#[derive(Debug)]
pub struct OperatorAuth(pub Operator);

#[async_trait]
impl<S> FromRequestParts<S> for OperatorAuth
where
    S: Send + Sync,
{
    type Rejection = SupportError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, SupportError> {
        let token = bearer_token(&parts.headers)?;

        let Inject(identity) = Inject::<dyn IdentityProvider>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                SupportError::Dependency("identity provider is not registered".to_owned())
            })?;

        let operator = identity.verify_token(&token).await?;
        Ok(OperatorAuth(operator))
    }
}

/// JSON request body whose rejections are reported as validation errors.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = SupportError;

    async fn from_request(req: Request, state: &S) -> Result<Self, SupportError> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| SupportError::Validation(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}
