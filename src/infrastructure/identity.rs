//! Identity provider client for operator sessions.
//!
//! Speaks the GoTrue flavoured REST API (`/auth/v1/user`, `/auth/v1/token`).

use crate::config::Settings;
use crate::infrastructure::errors::IdentityError;
use crate::infrastructure::traits::IdentityProvider;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::warn;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// An authenticated operator, as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperatorSession {
    pub access_token: String,
    pub user: Operator,
}

pub struct HttpIdentityProvider {
    client: reqwest::Client,
    auth_url: Option<String>,
    api_key: String,
}

#[injectable(IdentityProvider)]
impl HttpIdentityProvider {
    #[inject]
    pub fn create(settings: Ref<Settings>) -> HttpIdentityProvider {
        HttpIdentityProvider::new(settings.auth_url.clone(), settings.auth_api_key.clone())
    }
}

impl HttpIdentityProvider {
    pub fn new(auth_url: Option<String>, api_key: String) -> HttpIdentityProvider {
        HttpIdentityProvider {
            client: reqwest::Client::new(),
            auth_url,
            api_key,
        }
    }

    fn endpoint(&self, path: &str) -> Result<String, IdentityError> {
        match &self.auth_url {
            Some(base) => Ok(format!("{base}{path}")),
            None => {
                warn!("operator authentication attempted but AUTH_URL is not set");
                Err(IdentityError::NotConfigured)
            }
        }
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

fn unavailable(e: reqwest::Error) -> IdentityError {
    IdentityError::Unavailable(e.to_string())
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Operator, IdentityError> {
        let response = self
            .client
            .get(self.endpoint("/auth/v1/user")?)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            status if status.is_success() => response.json().await.map_err(unavailable),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IdentityError::Rejected(
                "Invalid or expired token".to_owned(),
            )),
            status => Err(IdentityError::Unavailable(format!(
                "token verification answered with status {status}"
            ))),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<OperatorSession, IdentityError> {
        let response = self
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=password")?)
            .header("apikey", &self.api_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            status if status.is_success() => response.json().await.map_err(unavailable),
            status if status.is_client_error() => {
                Err(IdentityError::Rejected("Invalid credentials".to_owned()))
            }
            status => Err(IdentityError::Unavailable(format!(
                "sign in answered with status {status}"
            ))),
        }
    }
}
