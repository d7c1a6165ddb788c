use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v22.0";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// Everything read from `whatzapp.toml` and the environment, before validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub salesforce: SalesforceSettings,
    #[serde(default)]
    pub whatsapp: WhatsAppSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SalesforceSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub security_token: Option<String>,
    pub login_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WhatsAppSettings {
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub graph_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Where the UI reaches the gateways. Defaults to the listen address.
    pub url: Option<String>,
    /// Run the gateways inside the desktop app process.
    #[serde(default = "default_embedded")]
    pub embedded: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            url: None,
            embedded: default_embedded(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_embedded() -> bool {
    true
}

impl Settings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("whatzapp.toml"))
    }

    /// Reads the settings file (if any) and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match Self::toml_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let unreadable = |reason: String| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        toml::from_str(&text).map_err(|e| unreadable(e.to_string()))
    }

    /// Overwrites fields with values from `lookup`, keyed by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        };
        let sf = &mut self.salesforce;
        set(&mut sf.client_id, "SF_CLIENT_ID");
        set(&mut sf.client_secret, "SF_CLIENT_SECRET");
        set(&mut sf.username, "SF_USERNAME");
        set(&mut sf.password, "SF_PASSWORD");
        set(&mut sf.security_token, "SF_SECURITY_TOKEN");
        set(&mut sf.login_url, "SF_LOGIN_URL");

        let wa = &mut self.whatsapp;
        set(&mut wa.access_token, "WHATSAPP_ACCESS_TOKEN");
        set(&mut wa.phone_number_id, "WHATSAPP_PHONE_NUMBER_ID");
        set(&mut wa.graph_url, "WHATSAPP_GRAPH_URL");

        set(&mut self.gateway.url, "WHATZAPP_GATEWAY_URL");
        if let Some(listen) = lookup("WHATZAPP_LISTEN") {
            self.gateway.listen = listen;
        }
        if let Some(embedded) = lookup("WHATZAPP_EMBEDDED") {
            self.gateway.embedded = !matches!(embedded.trim(), "0" | "false" | "no" | "off");
        }
    }

    /// Base URL the UI uses for `/api/*` calls.
    pub fn gateway_url(&self) -> String {
        match &self.gateway.url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => format!("http://{}", self.gateway.listen),
        }
    }
}

fn required(value: &Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn base_url(value: &Option<String>, default: &str, key: &'static str) -> Result<Url, ConfigError> {
    let raw = value.as_deref().filter(|v| !v.is_empty()).unwrap_or(default);
    let raw = raw.trim_end_matches('/');
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        key,
        reason: e.to_string(),
    })
}

/// Validated credentials for the Salesforce password grant.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub security_token: String,
    pub login_url: Url,
}

impl CrmConfig {
    pub fn from_settings(sf: &SalesforceSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: required(&sf.client_id, "SF_CLIENT_ID")?,
            client_secret: required(&sf.client_secret, "SF_CLIENT_SECRET")?,
            username: required(&sf.username, "SF_USERNAME")?,
            password: required(&sf.password, "SF_PASSWORD")?,
            security_token: required(&sf.security_token, "SF_SECURITY_TOKEN")?,
            login_url: base_url(&sf.login_url, DEFAULT_LOGIN_URL, "SF_LOGIN_URL")?,
        })
    }
}

/// WhatsApp credentials. Either may be empty: the provider rejects such
/// sends, so the lead browser still works without them.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub access_token: String,
    pub phone_number_id: String,
    pub graph_url: Url,
}

impl MessagingConfig {
    pub fn from_settings(wa: &WhatsAppSettings) -> Result<Self, ConfigError> {
        let optional = |value: &Option<String>, key: &str| {
            let value = value.clone().unwrap_or_default();
            if value.is_empty() {
                log::warn!("{key} is not set; outgoing messages will be rejected");
            }
            value
        };
        Ok(Self {
            access_token: optional(&wa.access_token, "WHATSAPP_ACCESS_TOKEN"),
            phone_number_id: optional(&wa.phone_number_id, "WHATSAPP_PHONE_NUMBER_ID"),
            graph_url: base_url(&wa.graph_url, DEFAULT_GRAPH_URL, "WHATSAPP_GRAPH_URL")?,
        })
    }
}

/// Configuration for both gateways, validated once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub crm: CrmConfig,
    pub messaging: MessagingConfig,
    pub listen: SocketAddr,
}

impl GatewayConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let listen: SocketAddr = settings
            .gateway
            .listen
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidListen {
                value: settings.gateway.listen.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            crm: CrmConfig::from_settings(&settings.salesforce)?,
            messaging: MessagingConfig::from_settings(&settings.whatsapp)?,
            listen,
        })
    }
}
