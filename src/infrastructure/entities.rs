//! Database entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Waiting,
    Closed,
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Sender {
    User,
    Operator,
    System,
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "operator" => Ok(Sender::Operator),
            "system" => Ok(Sender::System),
            other => Err(format!("unknown sender `{other}`")),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub status: ConversationStatus,
    pub business_hours: bool,
    pub source_page: Option<String>,
    pub visitor_name: Option<String>,
    pub visitor_phone: Option<String>,
    pub last_message_at: DateTime<Utc>,
    pub last_message_from: Sender,
    pub operator_seen: bool,
    pub operator_joined: bool,
    pub operator_name: Option<String>,
    pub operator_typing: bool,
    pub system_message_sent: bool,
    pub operator_join_message_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// A freshly started conversation, as stored right after the visitor's first message.
    pub fn started(
        source_page: Option<String>,
        visitor_name: Option<String>,
        visitor_phone: Option<String>,
        business_hours: bool,
        now: DateTime<Utc>,
    ) -> Conversation {
        Conversation {
            id: Uuid::new_v4(),
            status: ConversationStatus::Open,
            business_hours,
            source_page,
            visitor_name,
            visitor_phone,
            last_message_at: now,
            last_message_from: Sender::User,
            operator_seen: false,
            operator_joined: false,
            operator_name: None,
            operator_typing: false,
            system_message_sent: false,
            operator_join_message_sent: false,
            created_at: now,
        }
    }
}

/// Partial update of a conversation row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ConversationPatch {
    pub status: Option<ConversationStatus>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_from: Option<Sender>,
    pub operator_seen: Option<bool>,
    pub operator_joined: Option<bool>,
    pub operator_name: Option<String>,
    pub operator_typing: Option<bool>,
    pub system_message_sent: Option<bool>,
    pub operator_join_message_sent: Option<bool>,
}

impl ConversationPatch {
    pub fn apply(self, conversation: &mut Conversation) {
        if let Some(status) = self.status {
            conversation.status = status;
        }
        if let Some(at) = self.last_message_at {
            conversation.last_message_at = at;
        }
        if let Some(from) = self.last_message_from {
            conversation.last_message_from = from;
        }
        if let Some(seen) = self.operator_seen {
            conversation.operator_seen = seen;
        }
        if let Some(joined) = self.operator_joined {
            conversation.operator_joined = joined;
        }
        if let Some(name) = self.operator_name {
            conversation.operator_name = Some(name);
        }
        if let Some(typing) = self.operator_typing {
            conversation.operator_typing = typing;
        }
        if let Some(sent) = self.system_message_sent {
            conversation.system_message_sent = sent;
        }
        if let Some(sent) = self.operator_join_message_sent {
            conversation.operator_join_message_sent = sent;
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: Uuid, sender: Sender, text: impl Into<String>) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}
