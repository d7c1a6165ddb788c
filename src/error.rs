use std::net::SocketAddr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::models::ErrorBody;

/// Raised while turning settings into gateway configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid listen address {value:?}: {reason}")]
    InvalidListen { value: String, reason: String },
    #[error("invalid url for {key}: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Failures of a single gateway request. Each maps to an HTTP status and JSON body.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Authentication failed")]
    UpstreamAuth { details: String },
    #[error("Failed to fetch leads")]
    UpstreamRequest { details: String },
    #[error("Server error")]
    Unexpected { details: String },
    #[error("Failed to send message")]
    SendRejected,
    #[error("Internal error")]
    Internal,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamAuth { .. } => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let details = match self {
            GatewayError::UpstreamAuth { details }
            | GatewayError::UpstreamRequest { details }
            | GatewayError::Unexpected { details } => Some(details.clone()),
            GatewayError::SendRejected | GatewayError::Internal => None,
        };
        ErrorBody {
            error: self.to_string(),
            details,
        }
    }
}

/// Transport and decoding failures while talking to Salesforce.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Unexpected {
            details: err.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Errors seen by the UI when talking to the gateways.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid gateway url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Failed to fetch leads")]
    LeadsUnavailable { status: u16 },
    #[error("Failed to send message")]
    SendRejected { status: u16 },
}

/// Errors that stop the gateway server from running.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("gateway server failure: {0}")]
    Io(#[from] std::io::Error),
}
