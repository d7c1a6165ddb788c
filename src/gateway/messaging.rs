use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::api::models::{SendMessageRequest, SendMessageResponse};
use crate::config::MessagingConfig;
use crate::error::GatewayError;
use crate::gateway::GatewayState;

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

/// Relays plain-text messages to the WhatsApp Cloud API.
#[derive(Clone)]
pub struct MessagingGateway {
    http: HttpClient,
    config: Arc<MessagingConfig>,
}

impl MessagingGateway {
    pub fn new(http: HttpClient, config: MessagingConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/messages",
            self.config.graph_url.as_str().trim_end_matches('/'),
            self.config.phone_number_id
        )
    }

    // No dedup: every call produces one provider request.
    pub async fn send_text(&self, phone: &str, message: &str) -> Result<(), GatewayError> {
        let payload = TextMessage {
            messaging_product: "whatsapp",
            to: phone,
            kind: "text",
            text: TextBody { body: message },
        };
        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("send to {phone} failed: {e}");
                GatewayError::Internal
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        log::warn!("provider rejected message to {phone}: HTTP {status} {body}");
        Err(GatewayError::SendRejected)
    }
}

/// `POST /api/sendMessages`
pub async fn send_message(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<SendMessageResponse>, GatewayError> {
    let request: SendMessageRequest = serde_json::from_slice(&body).map_err(|e| {
        log::error!("unreadable send request: {e}");
        GatewayError::Internal
    })?;
    state
        .messaging
        .send_text(&request.phone, &request.message)
        .await?;
    Ok(Json(SendMessageResponse { success: true }))
}
