//! Errors surfaced by lifecycle operations

use crate::infrastructure::errors::{IdentityError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupportError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The conversation does not exist or no longer accepts the action.
    #[error("{0}")]
    State(String),

    /// The store or the identity provider failed.
    #[error("{0}")]
    Dependency(String),
}

impl From<StoreError> for SupportError {
    fn from(e: StoreError) -> Self {
        SupportError::Dependency(e.to_string())
    }
}

impl From<IdentityError> for SupportError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Rejected(reason) => SupportError::Unauthorized(reason),
            IdentityError::NotConfigured => {
                SupportError::Unauthorized("Operator authentication is not available".to_owned())
            }
            IdentityError::Unavailable(reason) => SupportError::Dependency(reason),
        }
    }
}
