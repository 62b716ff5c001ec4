//! DI "Interfaces"

use crate::core::errors::SupportError;
use crate::infrastructure::entities;
use crate::infrastructure::entities::{ConversationStatus, Sender};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A visitor's first message, as submitted by the chat widget.
#[derive(Debug, Clone, Default)]
pub struct StartChat {
    pub message: String,
    pub page: Option<String>,
    pub visitor_name: Option<String>,
    pub visitor_phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Created {
        conversation_id: Uuid,
        business_hours: bool,
    },
    /// The phone already had an open conversation.
    Reused { conversation_id: Uuid },
}

impl StartOutcome {
    pub fn conversation_id(&self) -> Uuid {
        match self {
            StartOutcome::Created {
                conversation_id, ..
            }
            | StartOutcome::Reused { conversation_id } => *conversation_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
}

/// What the widget shows about the operator side of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorPresence {
    pub operator_joined: bool,
    pub operator_name: Option<String>,
    pub status: Option<ConversationStatus>,
}

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Starts a conversation from a visitor's first message, evaluated at `now`.
    ///
    /// If the visitor left a phone that already has an `open` conversation, that one is
    /// returned instead and nothing is written.
    async fn start_conversation_at(
        &self,
        chat: StartChat,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome, SupportError>;

    async fn start_conversation(&self, chat: StartChat) -> Result<StartOutcome, SupportError> {
        self.start_conversation_at(chat, Utc::now()).await
    }

    /// Appends a message and hands the conversation to the other side.
    ///
    /// Returns `Err` if the conversation does not exist or is closed.
    async fn send_message(
        &self,
        conversation_id: Uuid,
        text: String,
        sender: Sender,
    ) -> Result<entities::Message, SupportError>;

    /// List all messages in a conversation, oldest first.
    async fn list_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, SupportError>;

    async fn list_conversations(&self) -> Result<Vec<entities::Conversation>, SupportError>;

    async fn operator_typing(&self, conversation_id: Uuid) -> Result<bool, SupportError>;

    /// Never fails; an unknown conversation reads as "no operator".
    async fn operator_presence(&self, conversation_id: Uuid) -> OperatorPresence;

    async fn mark_seen(&self, conversation_id: Uuid) -> Result<(), SupportError>;

    async fn join(&self, conversation_id: Uuid) -> Result<JoinOutcome, SupportError>;

    async fn set_typing(&self, conversation_id: Uuid, typing: bool) -> Result<(), SupportError>;

    async fn resolve(&self, conversation_id: Uuid) -> Result<(), SupportError>;

    /// Closes every `open` conversation idle for longer than `max_idle` as of `now`.
    ///
    /// Returns how many were closed. Failures on individual conversations are logged
    /// and skipped.
    async fn close_inactive_conversations_at(
        &self,
        now: DateTime<Utc>,
        max_idle: chrono::Duration,
    ) -> usize;

    async fn close_inactive_conversations(&self, max_idle: chrono::Duration) -> usize {
        self.close_inactive_conversations_at(Utc::now(), max_idle)
            .await
    }
}
