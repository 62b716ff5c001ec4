//! In-process store, used when no database is configured and in tests.

use crate::infrastructure::entities::{Conversation, ConversationPatch, ConversationStatus, Message};
use crate::infrastructure::errors::StoreError;
use crate::infrastructure::traits::ConversationRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di::{inject, injectable};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    tables: RwLock<Tables>,
}

#[injectable(ConversationRepository)]
impl InMemoryConversationRepository {
    #[inject]
    pub fn create() -> InMemoryConversationRepository {
        InMemoryConversationRepository::default()
    }
}

impl InMemoryConversationRepository {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_open_conversation_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        Ok(self
            .read()?
            .conversations
            .iter()
            .find(|c| {
                c.status == ConversationStatus::Open && c.visitor_phone.as_deref() == Some(phone)
            })
            .map(|c| c.id))
    }

    async fn create_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<Conversation, StoreError> {
        let mut tables = self.write()?;
        if tables.conversations.iter().any(|c| c.id == conversation.id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate conversation id {}",
                conversation.id
            )));
        }
        tables.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError> {
        Ok(self
            .read()?
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned())
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut conversations = self.read()?.conversations.clone();
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(conversations)
    }

    async fn update_conversation(
        &self,
        conversation_id: Uuid,
        patch: ConversationPatch,
    ) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        match tables
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            Some(conversation) => {
                patch.apply(conversation);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_inactive_open_conversations(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, StoreError> {
        Ok(self
            .read()?
            .conversations
            .iter()
            .filter(|c| c.status == ConversationStatus::Open && c.last_message_at < cutoff)
            .map(|c| c.id)
            .collect())
    }

    async fn create_message(&self, message: Message) -> Result<Message, StoreError> {
        let mut tables = self.write()?;
        if !tables
            .conversations
            .iter()
            .any(|c| c.id == message.conversation_id)
        {
            return Err(StoreError::Unavailable(format!(
                "conversation {} does not exist",
                message.conversation_id
            )));
        }
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn list_conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, StoreError> {
        let mut messages: Vec<Message> = self
            .read()?
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        // stable, so equal timestamps keep insertion order
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::entities::Sender;
    use chrono::Duration;

    #[tokio::test]
    async fn test_find_open_conversation_ignores_waiting() {
        let repo = InMemoryConversationRepository::default();
        let conversation = repo
            .create_conversation(Conversation::started(
                None,
                None,
                Some("+995555000111".to_owned()),
                true,
                Utc::now(),
            ))
            .await
            .unwrap();

        assert_eq!(
            repo.find_open_conversation_by_phone("+995555000111")
                .await
                .unwrap(),
            Some(conversation.id)
        );

        repo.update_conversation(
            conversation.id,
            ConversationPatch {
                status: Some(ConversationStatus::Waiting),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(
            repo.find_open_conversation_by_phone("+995555000111")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_update_unknown_conversation_reports_missing() {
        let repo = InMemoryConversationRepository::default();
        let updated = repo
            .update_conversation(Uuid::new_v4(), ConversationPatch::default())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_message_requires_existing_conversation() {
        let repo = InMemoryConversationRepository::default();
        let result = repo
            .create_message(Message::new(Uuid::new_v4(), Sender::User, "hello"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_conversations_listed_most_recent_first() {
        let repo = InMemoryConversationRepository::default();
        let now = Utc::now();
        let older = repo
            .create_conversation(Conversation::started(None, None, None, false, now - Duration::hours(2)))
            .await
            .unwrap();
        let newer = repo
            .create_conversation(Conversation::started(None, None, None, false, now))
            .await
            .unwrap();

        let ids: Vec<Uuid> = repo
            .list_conversations()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
