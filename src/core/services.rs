//! Implementations for the service the app needs.
//!

use crate::core::business_hours::is_business_hours;
use crate::core::errors::SupportError;
use crate::core::traits::{ConversationService, JoinOutcome, OperatorPresence, StartChat, StartOutcome};
use crate::infrastructure::entities::{
    Conversation, ConversationPatch, ConversationStatus, Message, Sender,
};
use crate::infrastructure::notifier::ConversationAlert;
use crate::infrastructure::traits::{ConversationRepository, Notifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di::{Ref, injectable};
use log::{debug, warn};
use uuid::Uuid;

/// Display name shown to visitors once an operator joins.
pub const OPERATOR_NAME: &str = "Nini";

pub const WELCOME_IN_HOURS: &str = "Thanks for reaching out 👋 Our team will reply shortly.";
pub const WELCOME_OUT_OF_HOURS: &str = "Thanks for your message 👋 We’re currently outside business hours. We’ll get back to you next business day.";
pub const OPERATOR_JOINED: &str = "👩‍💼 Nini joined the chat";
pub const CLOSED_BY_SUPPORT: &str = "🔒 This conversation has been closed by support.";
pub const CLOSED_FOR_INACTIVITY: &str = "⏱️ Conversation closed due to inactivity.";

#[injectable(ConversationService)]
pub struct LiveChatConversationService {
    repo: Ref<dyn ConversationRepository>,
    notifier: Ref<dyn Notifier>,
}

impl LiveChatConversationService {
    pub fn new(repo: Ref<dyn ConversationRepository>, notifier: Ref<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    async fn existing(&self, conversation_id: Uuid) -> Result<Conversation, SupportError> {
        self.repo
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| SupportError::State("Conversation not found".to_owned()))
    }

    async fn update_existing(
        &self,
        conversation_id: Uuid,
        patch: ConversationPatch,
    ) -> Result<(), SupportError> {
        if self.repo.update_conversation(conversation_id, patch).await? {
            Ok(())
        } else {
            Err(SupportError::State("Conversation not found".to_owned()))
        }
    }

    async fn system_message(&self, conversation_id: Uuid, text: &str) -> Result<Message, SupportError> {
        Ok(self
            .repo
            .create_message(Message::new(conversation_id, Sender::System, text))
            .await?)
    }

    /// Fire-and-forget; the caller never waits on the webhook.
    fn announce(&self, alert: ConversationAlert) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let conversation_id = alert.conversation_id;
            if let Err(e) = notifier.conversation_started(alert).await {
                warn!("failed to announce conversation {conversation_id}: {e}");
            }
        });
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl ConversationService for LiveChatConversationService {
    async fn start_conversation_at(
        &self,
        chat: StartChat,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome, SupportError> {
        if chat.message.trim().is_empty() {
            return Err(SupportError::Validation("message required".to_owned()));
        }

        let visitor_phone = non_blank(chat.visitor_phone);
        if let Some(phone) = &visitor_phone {
            // only `open` is checked; a visitor whose chat is `waiting` gets a second one
            if let Some(conversation_id) = self.repo.find_open_conversation_by_phone(phone).await? {
                return Ok(StartOutcome::Reused { conversation_id });
            }
        }

        let business_hours = is_business_hours(now);
        let visitor_name = non_blank(chat.visitor_name);

        let conversation = self
            .repo
            .create_conversation(Conversation::started(
                chat.page.clone(),
                visitor_name.clone(),
                visitor_phone.clone(),
                business_hours,
                now,
            ))
            .await?;

        // not transactional: a failure here leaves the conversation without messages
        self.repo
            .create_message(Message::new(conversation.id, Sender::User, chat.message.clone()))
            .await?;

        if !conversation.system_message_sent {
            let welcome = if business_hours {
                WELCOME_IN_HOURS
            } else {
                WELCOME_OUT_OF_HOURS
            };
            self.system_message(conversation.id, welcome).await?;
            self.repo
                .update_conversation(
                    conversation.id,
                    ConversationPatch {
                        system_message_sent: Some(true),
                        ..Default::default()
                    },
                )
                .await?;
        }

        self.announce(ConversationAlert {
            conversation_id: conversation.id,
            message: chat.message,
            page: chat.page,
            visitor_name,
            visitor_phone,
        });

        Ok(StartOutcome::Created {
            conversation_id: conversation.id,
            business_hours,
        })
    }

    async fn send_message(
        &self,
        conversation_id: Uuid,
        text: String,
        sender: Sender,
    ) -> Result<Message, SupportError> {
        if text.trim().is_empty() {
            return Err(SupportError::Validation(
                "conversationId & message required".to_owned(),
            ));
        }

        let conversation = self.existing(conversation_id).await?;
        if conversation.status == ConversationStatus::Closed {
            return Err(SupportError::State("Conversation is closed".to_owned()));
        }

        let message = self
            .repo
            .create_message(Message::new(conversation_id, sender, text))
            .await?;

        let status = if sender == Sender::User {
            ConversationStatus::Waiting
        } else {
            ConversationStatus::Open
        };

        self.update_existing(
            conversation_id,
            ConversationPatch {
                status: Some(status),
                last_message_at: Some(message.created_at),
                last_message_from: Some(sender),
                operator_seen: Some(sender == Sender::Operator),
                ..Default::default()
            },
        )
        .await?;

        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, SupportError> {
        Ok(self.repo.list_conversation_messages(conversation_id).await?)
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, SupportError> {
        Ok(self.repo.list_conversations().await?)
    }

    async fn operator_typing(&self, conversation_id: Uuid) -> Result<bool, SupportError> {
        Ok(self.existing(conversation_id).await?.operator_typing)
    }

    async fn operator_presence(&self, conversation_id: Uuid) -> OperatorPresence {
        match self.repo.get_conversation(conversation_id).await {
            Ok(Some(conversation)) => OperatorPresence {
                operator_joined: conversation.operator_joined,
                operator_name: conversation.operator_name,
                status: Some(conversation.status),
            },
            Ok(None) => OperatorPresence::default(),
            Err(e) => {
                debug!("presence lookup for {conversation_id} failed: {e}");
                OperatorPresence::default()
            }
        }
    }

    async fn mark_seen(&self, conversation_id: Uuid) -> Result<(), SupportError> {
        self.update_existing(
            conversation_id,
            ConversationPatch {
                operator_seen: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    async fn join(&self, conversation_id: Uuid) -> Result<JoinOutcome, SupportError> {
        // read-then-write: two concurrent joins may both pass this check
        let conversation = self.existing(conversation_id).await?;
        if conversation.operator_joined {
            return Ok(JoinOutcome::AlreadyJoined);
        }

        self.update_existing(
            conversation_id,
            ConversationPatch {
                operator_joined: Some(true),
                operator_name: Some(OPERATOR_NAME.to_owned()),
                ..Default::default()
            },
        )
        .await?;

        if !conversation.operator_join_message_sent {
            self.system_message(conversation_id, OPERATOR_JOINED).await?;
            self.update_existing(
                conversation_id,
                ConversationPatch {
                    operator_join_message_sent: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        }

        Ok(JoinOutcome::Joined)
    }

    async fn set_typing(&self, conversation_id: Uuid, typing: bool) -> Result<(), SupportError> {
        // closed conversations are not guarded here
        self.update_existing(
            conversation_id,
            ConversationPatch {
                operator_typing: Some(typing),
                ..Default::default()
            },
        )
        .await
    }

    async fn resolve(&self, conversation_id: Uuid) -> Result<(), SupportError> {
        self.update_existing(
            conversation_id,
            ConversationPatch {
                status: Some(ConversationStatus::Closed),
                operator_typing: Some(false),
                ..Default::default()
            },
        )
        .await?;

        self.system_message(conversation_id, CLOSED_BY_SUPPORT).await?;
        Ok(())
    }

    async fn close_inactive_conversations_at(
        &self,
        now: DateTime<Utc>,
        max_idle: chrono::Duration,
    ) -> usize {
        let cutoff = now - max_idle;

        let stale = match self.repo.list_inactive_open_conversations(cutoff).await {
            Ok(stale) => stale,
            Err(e) => {
                warn!("auto-close scan failed: {e}");
                return 0;
            }
        };

        let mut closed = 0;
        for conversation_id in stale {
            let patch = ConversationPatch {
                status: Some(ConversationStatus::Closed),
                operator_typing: Some(false),
                ..Default::default()
            };
            match self.repo.update_conversation(conversation_id, patch).await {
                Ok(true) => closed += 1,
                Ok(false) => debug!("conversation {conversation_id} vanished before auto-close"),
                Err(e) => warn!("failed to auto-close conversation {conversation_id}: {e}"),
            }

            if let Err(e) = self
                .repo
                .create_message(Message::new(
                    conversation_id,
                    Sender::System,
                    CLOSED_FOR_INACTIVITY,
                ))
                .await
            {
                warn!("failed to record auto-close of {conversation_id}: {e}");
            }
        }

        closed
    }
}
