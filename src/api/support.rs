//! Visitor widget endpoints

use crate::api::JsonBody;
use crate::api::support::schemas::{
    ConversationStatusResponse, OkResponse, SendMessage, StartChatRequest, StartChatResponse,
    TypingResponse,
};
use crate::core::errors::SupportError;
use crate::core::traits::ConversationService;
use crate::infrastructure::entities::Sender;
use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use std::str::FromStr;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/support/start", post(start_chat))
        .route("/support/send", post(send_message))
        .route("/support/typing/:id", get(operator_typing))
        .route("/support/status/:id", get(conversation_status))
        .route("/messages/:id", get(conversation_messages))
}

async fn start_chat(
    Inject(conversation_service): Inject<dyn ConversationService>,
    JsonBody(request): JsonBody<StartChatRequest>,
) -> Result<Json<StartChatResponse>, SupportError> {
    let outcome = conversation_service
        .start_conversation(request.try_into()?)
        .await?;

    Ok(Json(outcome.into()))
}

async fn send_message(
    Inject(conversation_service): Inject<dyn ConversationService>,
    JsonBody(request): JsonBody<SendMessage>,
) -> Result<Json<OkResponse>, SupportError> {
    let (Some(conversation_id), Some(message)) = (request.conversation_id, request.message) else {
        return Err(SupportError::Validation(
            "conversationId & message required".to_owned(),
        ));
    };

    let conversation_id = Uuid::from_str(&conversation_id)
        .map_err(|_| SupportError::Validation("invalid conversationId".to_owned()))?;

    // callers acting as the operator must say so explicitly
    let sender = match request.sender.as_deref() {
        None => Sender::User,
        Some(sender) => Sender::from_str(sender).map_err(SupportError::Validation)?,
    };

    conversation_service
        .send_message(conversation_id, message, sender)
        .await?;

    Ok(Json(OkResponse::ok()))
}

async fn conversation_messages(
    Inject(conversation_service): Inject<dyn ConversationService>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Vec<schemas::Message>>, SupportError> {
    let messages = conversation_service.list_messages(conversation_id).await?;

    Ok(Json(
        messages.into_iter().map(schemas::Message::from).collect(),
    ))
}

async fn operator_typing(
    Inject(conversation_service): Inject<dyn ConversationService>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<TypingResponse>, SupportError> {
    let typing = conversation_service.operator_typing(conversation_id).await?;
    Ok(Json(TypingResponse { typing }))
}

async fn conversation_status(
    Inject(conversation_service): Inject<dyn ConversationService>,
    Path(conversation_id): Path<Uuid>,
) -> Json<ConversationStatusResponse> {
    Json(
        conversation_service
            .operator_presence(conversation_id)
            .await
            .into(),
    )
}

pub mod schemas {
    use crate::core::errors::SupportError;
    use crate::core::traits::{OperatorPresence, StartChat, StartOutcome};
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::{ConversationStatus, Sender};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct StartChatRequest {
        pub message: Option<String>,
        pub page: Option<String>,
        pub visitor_name: Option<String>,
        pub visitor_phone: Option<String>,
    }

    impl TryFrom<StartChatRequest> for StartChat {
        type Error = SupportError;

        fn try_from(request: StartChatRequest) -> Result<Self, Self::Error> {
            let message = request
                .message
                .filter(|m| !m.trim().is_empty())
                .ok_or_else(|| SupportError::Validation("message required".to_owned()))?;

            Ok(StartChat {
                message,
                page: request.page,
                visitor_name: request.visitor_name,
                visitor_phone: request.visitor_phone,
            })
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct StartChatResponse {
        pub conversation_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub business_hours: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reused: Option<bool>,
    }

    impl From<StartOutcome> for StartChatResponse {
        fn from(outcome: StartOutcome) -> Self {
            match outcome {
                StartOutcome::Created {
                    conversation_id,
                    business_hours,
                } => StartChatResponse {
                    conversation_id,
                    business_hours: Some(business_hours),
                    reused: None,
                },
                StartOutcome::Reused { conversation_id } => StartChatResponse {
                    conversation_id,
                    business_hours: None,
                    reused: Some(true),
                },
            }
        }
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct SendMessage {
        pub conversation_id: Option<String>,
        pub message: Option<String>,
        pub sender: Option<String>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct OkResponse {
        pub ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub already_joined: Option<bool>,
    }

    impl OkResponse {
        pub fn ok() -> Self {
            OkResponse {
                ok: true,
                already_joined: None,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct Message {
        pub id: Uuid,
        pub sender: Sender,
        pub text: String,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                id: message.id,
                sender: message.sender,
                text: message.text,
                created_at: message.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct TypingResponse {
        pub typing: bool,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ConversationStatusResponse {
        pub operator_joined: bool,
        pub operator_name: Option<String>,
        pub status: Option<ConversationStatus>,
    }

    impl From<OperatorPresence> for ConversationStatusResponse {
        fn from(presence: OperatorPresence) -> Self {
            ConversationStatusResponse {
                operator_joined: presence.operator_joined,
                operator_name: presence.operator_name,
                status: presence.status,
            }
        }
    }
}
