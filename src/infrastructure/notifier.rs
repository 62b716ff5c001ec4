//! Outbound chat webhook announcing new conversations

use crate::config::Settings;
use crate::infrastructure::errors::NotifyError;
use crate::infrastructure::traits::Notifier;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::debug;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ConversationAlert {
    pub conversation_id: Uuid,
    pub message: String,
    pub page: Option<String>,
    pub visitor_name: Option<String>,
    pub visitor_phone: Option<String>,
}

impl ConversationAlert {
    /// Text posted to the support team's chat room.
    pub fn render(&self, operator_inbox_url: &str) -> String {
        let display_name = match self.visitor_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => {
                let short_id: String = self.conversation_id.to_string().chars().take(8).collect();
                format!("Visitor #{short_id}")
            }
        };

        let phone_line = match self.visitor_phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => format!("📞 Phone: {phone}\n"),
            _ => String::new(),
        };

        format!(
            "📩 *New Support Chat Started*\n\n👤 {display_name}\n{phone_line}\n🗨️ Message:\n{message}\n\n🌐 Page:\n{page}\n\n🔗 Open conversation:\n{operator_inbox_url}#{id}",
            message = self.message,
            page = self.page.as_deref().unwrap_or("unknown"),
            id = self.conversation_id,
        )
    }
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    operator_inbox_url: String,
}

#[injectable(Notifier)]
impl WebhookNotifier {
    #[inject]
    pub fn create(settings: Ref<Settings>) -> WebhookNotifier {
        WebhookNotifier {
            client: reqwest::Client::new(),
            webhook_url: settings.webhook_url.clone(),
            operator_inbox_url: settings.operator_inbox_url.clone(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn conversation_started(&self, alert: ConversationAlert) -> Result<(), NotifyError> {
        let Some(webhook_url) = &self.webhook_url else {
            debug!("no webhook configured, skipping alert for {}", alert.conversation_id);
            return Ok(());
        };

        let response = self
            .client
            .post(webhook_url)
            .json(&json!({ "text": alert.render(&self.operator_inbox_url) }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status()));
        }
        Ok(())
    }
}
