//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use crate::infrastructure::errors::{IdentityError, NotifyError, StoreError};
use crate::infrastructure::identity::{Operator, OperatorSession};
use crate::infrastructure::notifier::ConversationAlert;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The durable store for conversations and their messages.
///
/// Every call is independent; nothing here spans more than one statement.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Id of an `open` conversation started with the given phone, if any.
    async fn find_open_conversation_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<Uuid>, StoreError>;

    async fn create_conversation(
        &self,
        conversation: entities::Conversation,
    ) -> Result<entities::Conversation, StoreError>;

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<entities::Conversation>, StoreError>;

    /// All conversations, most recently active first.
    async fn list_conversations(&self) -> Result<Vec<entities::Conversation>, StoreError>;

    /// Applies a partial update. Returns `false` if no conversation has the given id.
    async fn update_conversation(
        &self,
        conversation_id: Uuid,
        patch: entities::ConversationPatch,
    ) -> Result<bool, StoreError>;

    /// Ids of `open` conversations whose last message is older than `cutoff`.
    async fn list_inactive_open_conversations(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, StoreError>;

    async fn create_message(
        &self,
        message: entities::Message,
    ) -> Result<entities::Message, StoreError>;

    /// Messages of a conversation, oldest first.
    async fn list_conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, StoreError>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token to the operator it was issued to.
    async fn verify_token(&self, token: &str) -> Result<Operator, IdentityError>;

    /// Exchanges operator credentials for a session token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<OperatorSession, IdentityError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announces a newly started conversation to the support team.
    async fn conversation_started(&self, alert: ConversationAlert) -> Result<(), NotifyError>;
}
