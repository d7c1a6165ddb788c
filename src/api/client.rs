use reqwest::Client as HttpClient;
use url::Url;

use crate::api::models::{Lead, SendMessageRequest};
use crate::error::ClientError;

/// Talks to the `/api/*` gateways on behalf of the UI.
#[derive(Clone)]
pub struct GatewayClient {
    http: HttpClient,
    base: Url,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::new(),
            base: Url::parse(&Self::base_api(base_url))?,
        })
    }

    fn base_api(base_url: &str) -> String {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.ends_with("/api") {
            format!("{}/", trimmed)
        } else {
            format!("{}/api/", trimmed)
        }
    }

    fn endpoint(&self, name: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(name)?)
    }

    /// Fetch the lead list from the CRM gateway. Any non-2xx is reported the same way.
    pub async fn leads(&self) -> Result<Vec<Lead>, ClientError> {
        let resp = self.http.get(self.endpoint("auth")?).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::LeadsUnavailable {
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json().await?)
    }

    pub async fn send_message(&self, phone: &str, message: &str) -> Result<(), ClientError> {
        let body = SendMessageRequest {
            phone: phone.to_string(),
            message: message.to_string(),
        };
        let resp = self
            .http
            .post(self.endpoint("sendMessages")?)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::SendRejected {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}
