//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Conversation, ConversationPatch, ConversationStatus, Message};
use crate::infrastructure::errors::StoreError;
use crate::infrastructure::traits::ConversationRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di::{Ref, injectable};
use log::error;
use uuid::Uuid;

#[injectable(ConversationRepository)]
pub struct DbConversationRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbConversationRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

fn log_error(e: sqlx::Error) -> StoreError {
    error!("{e}");
    StoreError::from(e)
}

#[async_trait]
impl ConversationRepository for DbConversationRepository {
    async fn find_open_conversation_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        sqlx::query_scalar(
            "SELECT id FROM conversations WHERE status = ? AND visitor_phone = ? LIMIT 1",
        )
        .bind(ConversationStatus::Open)
        .bind(phone)
        .fetch_optional(&**self.connection)
        .await
        .map_err(log_error)
    }

    async fn create_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<Conversation, StoreError> {
        sqlx::query_as(
            "INSERT INTO conversations (id, status, business_hours, source_page, visitor_name, visitor_phone, last_message_at, last_message_from, operator_seen, operator_joined, operator_name, operator_typing, system_message_sent, operator_join_message_sent, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(conversation.id)
        .bind(conversation.status)
        .bind(conversation.business_hours)
        .bind(conversation.source_page)
        .bind(conversation.visitor_name)
        .bind(conversation.visitor_phone)
        .bind(conversation.last_message_at)
        .bind(conversation.last_message_from)
        .bind(conversation.operator_seen)
        .bind(conversation.operator_joined)
        .bind(conversation.operator_name)
        .bind(conversation.operator_typing)
        .bind(conversation.system_message_sent)
        .bind(conversation.operator_join_message_sent)
        .bind(conversation.created_at)
        .fetch_one(&**self.connection)
        .await
        .map_err(log_error)
    }

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError> {
        sqlx::query_as("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(log_error)
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        sqlx::query_as("SELECT * FROM conversations ORDER BY last_message_at DESC")
            .fetch_all(&**self.connection)
            .await
            .map_err(log_error)
    }

    async fn update_conversation(
        &self,
        conversation_id: Uuid,
        patch: ConversationPatch,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE conversations SET \
                status = COALESCE(?, status), \
                last_message_at = COALESCE(?, last_message_at), \
                last_message_from = COALESCE(?, last_message_from), \
                operator_seen = COALESCE(?, operator_seen), \
                operator_joined = COALESCE(?, operator_joined), \
                operator_name = COALESCE(?, operator_name), \
                operator_typing = COALESCE(?, operator_typing), \
                system_message_sent = COALESCE(?, system_message_sent), \
                operator_join_message_sent = COALESCE(?, operator_join_message_sent) \
             WHERE id = ?",
        )
        .bind(patch.status)
        .bind(patch.last_message_at)
        .bind(patch.last_message_from)
        .bind(patch.operator_seen)
        .bind(patch.operator_joined)
        .bind(patch.operator_name)
        .bind(patch.operator_typing)
        .bind(patch.system_message_sent)
        .bind(patch.operator_join_message_sent)
        .bind(conversation_id)
        .execute(&**self.connection)
        .await
        .map_err(log_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_inactive_open_conversations(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, StoreError> {
        sqlx::query_scalar(
            "SELECT id FROM conversations WHERE status = ? AND last_message_at < ?",
        )
        .bind(ConversationStatus::Open)
        .bind(cutoff)
        .fetch_all(&**self.connection)
        .await
        .map_err(log_error)
    }

    async fn create_message(&self, message: Message) -> Result<Message, StoreError> {
        sqlx::query_as(
            "INSERT INTO messages (id, conversation_id, sender, text, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.sender)
        .bind(message.text)
        .bind(message.created_at)
        .fetch_one(&**self.connection)
        .await
        .map_err(log_error)
    }

    async fn list_conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, StoreError> {
        sqlx::query_as(
            "SELECT id, conversation_id, sender, text, created_at FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(conversation_id)
        .fetch_all(&**self.connection)
        .await
        .map_err(log_error)
    }
}
