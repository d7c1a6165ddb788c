use serde::{Deserialize, Serialize};

/// Placeholder used for every lead field the CRM did not fill in.
pub const NOT_AVAILABLE: &str = "N/A";

/// Flat projection of a CRM lead as served by `GET /api/auth`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Lead {
    /// Left out of the JSON when the CRM row has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    pub company: String,
    pub address: String,
}

impl Lead {
    pub fn email_label(&self) -> &str {
        self.email.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SendMessageResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
