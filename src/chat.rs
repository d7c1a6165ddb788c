use crate::api::client::GatewayClient;
use crate::api::models::Lead;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Operator,
    /// Never produced: replies are not received.
    Counterparty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: String,
}

/// What has to reach the messaging gateway after an optimistic append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub phone: String,
    pub text: String,
}

/// Transcript for the selected lead. Lives only as long as the selection.
#[derive(Debug, Default)]
pub struct ChatSession {
    lead: Option<Lead>,
    transcript: Vec<Message>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, lead: Lead) {
        self.lead = Some(lead);
        self.transcript.clear();
    }

    pub fn lead(&self) -> Option<&Lead> {
        self.lead.as_ref()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn compose(&mut self, input: &str) -> Option<OutgoingMessage> {
        self.compose_at(input, local_timestamp())
    }

    /// Appends `input` as an operator message and returns what to send.
    /// Blank input or no selected lead leaves the transcript untouched.
    pub fn compose_at(&mut self, input: &str, timestamp: String) -> Option<OutgoingMessage> {
        if input.trim().is_empty() {
            return None;
        }
        let phone = self.lead.as_ref()?.phone.clone();
        self.transcript.push(Message {
            sender: Sender::Operator,
            text: input.to_string(),
            timestamp,
        });
        Some(OutgoingMessage {
            phone,
            text: input.to_string(),
        })
    }
}

pub fn local_timestamp() -> String {
    chrono::Local::now().format("%-I:%M:%S %p").to_string()
}

/// Sends one message through the gateway. The transcript is not touched on failure.
pub async fn deliver(client: GatewayClient, outgoing: OutgoingMessage) -> Result<(), ClientError> {
    let result = client.send_message(&outgoing.phone, &outgoing.text).await;
    if let Err(err) = &result {
        log::error!("Error sending message to {}: {err}", outgoing.phone);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lead(id: &str, phone: &str) -> Lead {
        Lead {
            id: Some(id.into()),
            name: format!("Lead {id}"),
            email: None,
            phone: phone.into(),
            company: "Pentacloud".into(),
            address: "N/A".into(),
        }
    }

    #[test]
    fn compose_appends_operator_message() {
        let mut chat = ChatSession::new();
        chat.select(lead("1", "+15550001"));
        let out = chat.compose_at("Hello", "9:05:00 AM".into()).unwrap();
        assert_eq!(
            out,
            OutgoingMessage {
                phone: "+15550001".into(),
                text: "Hello".into()
            }
        );
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.transcript()[0].sender, Sender::Operator);
        assert_eq!(chat.transcript()[0].timestamp, "9:05:00 AM");
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut chat = ChatSession::new();
        chat.select(lead("1", "+1"));
        assert!(chat.compose("").is_none());
        assert!(chat.compose("  \t\n").is_none());
        assert!(chat.transcript().is_empty());
    }

    #[test]
    fn no_lead_no_message() {
        let mut chat = ChatSession::new();
        assert!(chat.compose("hi").is_none());
        assert!(chat.transcript().is_empty());
    }

    #[test]
    fn selecting_another_lead_resets_transcript() {
        let mut chat = ChatSession::new();
        chat.select(lead("1", "+1"));
        chat.compose("one");
        chat.compose("two");
        assert_eq!(chat.transcript().len(), 2);
        chat.select(lead("2", "+2"));
        assert!(chat.transcript().is_empty());
        assert_eq!(chat.lead().and_then(|l| l.id.as_deref()), Some("2"));
    }

    #[test]
    fn timestamp_looks_like_a_clock() {
        let ts = local_timestamp();
        assert!(ts.ends_with("AM") || ts.ends_with("PM"), "{ts}");
        assert_eq!(ts.matches(':').count(), 2);
    }

    #[tokio::test]
    async fn whitespace_send_never_calls_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = GatewayClient::new(&server.uri()).unwrap();

        let mut chat = ChatSession::new();
        chat.select(lead("1", "+1"));
        if let Some(out) = chat.compose("   ") {
            deliver(client, out).await.unwrap();
        }
        assert!(chat.transcript().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_keeps_optimistic_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let client = GatewayClient::new(&server.uri()).unwrap();

        let mut chat = ChatSession::new();
        chat.select(lead("1", "+1"));
        let out = chat.compose("are you there?").unwrap();
        let err = deliver(client, out).await.unwrap_err();
        assert!(matches!(err, ClientError::SendRejected { status: 500 }));
        assert_eq!(chat.transcript().len(), 1);
    }
}
