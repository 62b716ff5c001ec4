//! Operator console endpoints

use crate::api::{JsonBody, OperatorAuth};
use crate::api::operator::schemas::{
    ConversationSummary, LoginRequest, LoginResponse, SeenResponse, TypingRequest,
};
use crate::api::support::schemas::OkResponse;
use crate::core::errors::SupportError;
use crate::core::traits::{ConversationService, JoinOutcome};
use crate::infrastructure::traits::IdentityProvider;
use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use log::info;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/operator/login", post(login))
        .route("/operator/conversations", get(list_conversations))
        .route("/operator/seen/:id", post(mark_seen))
        .route("/operator/join/:id", post(join))
        .route("/operator/typing/:id", post(set_typing))
        .route("/operator/resolve/:id", post(resolve))
}

async fn login(
    Inject(identity): Inject<dyn IdentityProvider>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, SupportError> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(SupportError::Validation(
            "Email and password required".to_owned(),
        ));
    };

    let session = identity.sign_in(&email, &password).await?;
    info!("operator {} signed in", session.user.id);

    Ok(Json(session.into()))
}

async fn list_conversations(
    Inject(conversation_service): Inject<dyn ConversationService>,
) -> Result<Json<Vec<ConversationSummary>>, SupportError> {
    let conversations = conversation_service.list_conversations().await?;

    Ok(Json(
        conversations
            .into_iter()
            .map(ConversationSummary::from)
            .collect(),
    ))
}

async fn mark_seen(
    Inject(conversation_service): Inject<dyn ConversationService>,
    OperatorAuth(_operator): OperatorAuth,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<SeenResponse>, SupportError> {
    conversation_service.mark_seen(conversation_id).await?;
    Ok(Json(SeenResponse { success: true }))
}

async fn join(
    Inject(conversation_service): Inject<dyn ConversationService>,
    OperatorAuth(operator): OperatorAuth,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<OkResponse>, SupportError> {
    let response = match conversation_service.join(conversation_id).await? {
        JoinOutcome::Joined => {
            info!("operator {} joined conversation {conversation_id}", operator.id);
            OkResponse::ok()
        }
        JoinOutcome::AlreadyJoined => OkResponse {
            ok: true,
            already_joined: Some(true),
        },
    };

    Ok(Json(response))
}

async fn set_typing(
    Inject(conversation_service): Inject<dyn ConversationService>,
    OperatorAuth(_operator): OperatorAuth,
    Path(conversation_id): Path<Uuid>,
    request: Option<Json<TypingRequest>>,
) -> Result<Json<OkResponse>, SupportError> {
    // anything other than an explicit `true` stops the indicator
    let typing = request.is_some_and(|Json(request)| request.typing == Some(true));
    conversation_service.set_typing(conversation_id, typing).await?;
    Ok(Json(OkResponse::ok()))
}

async fn resolve(
    Inject(conversation_service): Inject<dyn ConversationService>,
    OperatorAuth(operator): OperatorAuth,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<OkResponse>, SupportError> {
    conversation_service.resolve(conversation_id).await?;
    info!("operator {} resolved conversation {conversation_id}", operator.id);
    Ok(Json(OkResponse::ok()))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::{ConversationStatus, Sender};
    use crate::infrastructure::identity::{Operator, OperatorSession};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct LoginRequest {
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct LoginResponse {
        pub access_token: String,
        pub user: Operator,
    }

    impl From<OperatorSession> for LoginResponse {
        fn from(session: OperatorSession) -> Self {
            LoginResponse {
                access_token: session.access_token,
                user: session.user,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationSummary {
        pub id: Uuid,
        pub status: ConversationStatus,
        pub business_hours: bool,
        pub source_page: Option<String>,
        pub visitor_name: Option<String>,
        pub visitor_phone: Option<String>,
        pub last_message_at: DateTime<Utc>,
        pub last_message_from: Sender,
        pub operator_seen: bool,
    }

    impl From<entities::Conversation> for ConversationSummary {
        fn from(conversation: entities::Conversation) -> Self {
            ConversationSummary {
                id: conversation.id,
                status: conversation.status,
                business_hours: conversation.business_hours,
                source_page: conversation.source_page,
                visitor_name: conversation.visitor_name,
                visitor_phone: conversation.visitor_phone,
                last_message_at: conversation.last_message_at,
                last_message_from: conversation.last_message_from,
                operator_seen: conversation.operator_seen,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct SeenResponse {
        pub success: bool,
    }

    #[derive(Deserialize, Debug)]
    pub struct TypingRequest {
        pub typing: Option<bool>,
    }
}
