//! Salesforce side of the gateway: password-grant login, then a single SOQL
//! query whose records are flattened into [`Lead`]s.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::api::models::{Lead, NOT_AVAILABLE};
use crate::config::CrmConfig;
use crate::error::GatewayError;
use crate::gateway::GatewayState;

pub const API_VERSION: &str = "v59.0";

pub const LEADS_QUERY: &str = "SELECT Id, Name, Email, Phone, Company, Street, City, State, \
PostalCode, Country FROM Lead WHERE Company LIKE '%Pentacloud%' ORDER BY Name ASC";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    records: Vec<LeadRecord>,
}

/// A Lead row as returned by the query endpoint. Any field may be absent or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LeadRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn or_placeholder(value: &Option<String>) -> String {
    present(value).unwrap_or(NOT_AVAILABLE).to_string()
}

/// Street, then "city, state, zip" from whichever parts exist, then country.
pub fn format_address(record: &LeadRecord) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(street) = present(&record.street) {
        parts.push(street.to_string());
    }
    let city_state_zip: Vec<&str> = [&record.city, &record.state, &record.postal_code]
        .into_iter()
        .filter_map(present)
        .collect();
    if !city_state_zip.is_empty() {
        parts.push(city_state_zip.join(", "));
    }
    if let Some(country) = present(&record.country) {
        parts.push(country.to_string());
    }
    if parts.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}

impl From<LeadRecord> for Lead {
    fn from(record: LeadRecord) -> Self {
        Lead {
            address: format_address(&record),
            id: present(&record.id).map(str::to_string),
            name: or_placeholder(&record.name),
            email: Some(or_placeholder(&record.email)),
            phone: or_placeholder(&record.phone),
            company: or_placeholder(&record.company),
        }
    }
}

#[derive(Clone)]
pub struct CrmGateway {
    http: HttpClient,
    config: Arc<CrmConfig>,
}

impl CrmGateway {
    pub fn new(http: HttpClient, config: CrmConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    /// Logs in and runs the lead query. Nothing is cached between calls.
    pub async fn fetch_leads(&self) -> Result<Vec<Lead>, GatewayError> {
        let token = self.authenticate().await?;
        let records = self.query_leads(&token).await?;
        Ok(records.into_iter().map(Lead::from).collect())
    }

    async fn authenticate(&self) -> Result<TokenResponse, GatewayError> {
        let cfg = &self.config;
        let endpoint = format!(
            "{}/services/oauth2/token",
            cfg.login_url.as_str().trim_end_matches('/')
        );
        let password = format!("{}{}", cfg.password, cfg.security_token);
        let form = [
            ("grant_type", "password"),
            ("client_id", cfg.client_id.as_str()),
            ("client_secret", cfg.client_secret.as_str()),
            ("username", cfg.username.as_str()),
            ("password", password.as_str()),
        ];

        let resp = self.http.post(&endpoint).form(&form).send().await?;
        if !resp.status().is_success() {
            let details = resp.text().await?;
            return Err(GatewayError::UpstreamAuth { details });
        }
        Ok(resp.json::<TokenResponse>().await?)
    }

    async fn query_leads(&self, token: &TokenResponse) -> Result<Vec<LeadRecord>, GatewayError> {
        let endpoint = format!(
            "{}/services/data/{API_VERSION}/query/",
            token.instance_url.trim_end_matches('/')
        );
        let resp = self
            .http
            .get(&endpoint)
            .query(&[("q", LEADS_QUERY)])
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            let details = resp.text().await?;
            return Err(GatewayError::UpstreamRequest { details });
        }
        let body: QueryResponse = resp.json().await?;
        Ok(body.records)
    }
}

/// `GET /api/auth`
pub async fn leads(State(state): State<GatewayState>) -> Result<Json<Vec<Lead>>, GatewayError> {
    match state.crm.fetch_leads().await {
        Ok(leads) => {
            log::info!("fetched {} leads", leads.len());
            Ok(Json(leads))
        }
        Err(err) => {
            log::error!("{err}: {}", err.body().details.unwrap_or_default());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SalesforceSettings;
    use crate::error::ConfigError;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(login_url: &str) -> SalesforceSettings {
        SalesforceSettings {
            client_id: Some("cid".into()),
            client_secret: Some("csecret".into()),
            username: Some("svc@example.com".into()),
            password: Some("hunter2".into()),
            security_token: Some("SECTOK".into()),
            login_url: Some(login_url.into()),
        }
    }

    fn gateway(server: &MockServer) -> CrmGateway {
        let cfg = CrmConfig::from_settings(&settings(&server.uri())).unwrap();
        CrmGateway::new(HttpClient::new(), cfg)
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("password=hunter2SECTOK"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc123",
                "instance_url": server.uri(),
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    fn record(fields: serde_json::Value) -> LeadRecord {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn full_address_is_joined_in_order() {
        let r = record(json!({
            "Street": "1 Main St",
            "City": "Springfield",
            "State": "IL",
            "PostalCode": "62704",
            "Country": "USA",
        }));
        assert_eq!(format_address(&r), "1 Main St, Springfield, IL, 62704, USA");
    }

    #[test]
    fn partial_and_empty_addresses() {
        assert_eq!(format_address(&record(json!({ "Country": "USA" }))), "USA");
        assert_eq!(format_address(&record(json!({}))), "N/A");
        let r = record(json!({ "City": "Springfield", "PostalCode": "62704", "State": null }));
        assert_eq!(format_address(&r), "Springfield, 62704");
    }

    #[test]
    fn missing_fields_become_placeholder() {
        let lead = Lead::from(record(json!({ "Id": "00Q1", "Name": "", "Phone": null })));
        assert_eq!(lead.id.as_deref(), Some("00Q1"));
        assert_eq!(lead.name, "N/A");
        assert_eq!(lead.email.as_deref(), Some("N/A"));
        assert_eq!(lead.phone, "N/A");
        assert_eq!(lead.company, "N/A");
        assert_eq!(lead.address, "N/A");
    }

    #[tokio::test]
    async fn fetches_and_maps_leads() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/services/data/{API_VERSION}/query/")))
            .and(query_param("q", LEADS_QUERY))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 2,
                "done": true,
                "records": [
                    {
                        "attributes": { "type": "Lead" },
                        "Id": "00Q1",
                        "Name": "Acme Corp",
                        "Email": "ops@acme.test",
                        "Phone": "+15550001",
                        "Company": "Pentacloud Acme",
                        "Street": "1 Main St",
                        "City": "Springfield",
                        "State": "IL",
                        "PostalCode": "62704",
                        "Country": "USA"
                    },
                    { "Id": "00Q2", "Name": "Bare Lead", "Company": "Pentacloud" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let leads = gateway(&server).fetch_leads().await.unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].address, "1 Main St, Springfield, IL, 62704, USA");
        assert_eq!(leads[0].email.as_deref(), Some("ops@acme.test"));
        assert_eq!(leads[1].phone, "N/A");
        assert_eq!(leads[1].address, "N/A");
    }

    #[test]
    fn lead_without_id_omits_the_key() {
        let lead = Lead::from(record(json!({ "Name": "Anon" })));
        assert!(lead.id.is_none());
        let value = serde_json::to_value(&lead).unwrap();
        assert!(value.get("Id").is_none());
        assert_eq!(value["Name"], "Anon");
    }

    #[tokio::test]
    async fn rejected_login_keeps_upstream_body() {
        let server = MockServer::start().await;
        let upstream = r#"{"error":"invalid_grant","error_description":"authentication failure"}"#;
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(upstream))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_leads().await.unwrap_err();
        match &err {
            GatewayError::UpstreamAuth { details } => assert_eq!(details, upstream),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn failed_query_is_upstream_request_error() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/services/data/{API_VERSION}/query/")))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"[{"errorCode":"MALFORMED_QUERY"}]"#),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_leads().await.unwrap_err();
        let body = err.body();
        assert_eq!(body.error, "Failed to fetch leads");
        assert_eq!(body.details.as_deref(), Some(r#"[{"errorCode":"MALFORMED_QUERY"}]"#));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn garbled_token_response_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_leads().await.unwrap_err();
        assert!(matches!(err, GatewayError::Unexpected { .. }));
        assert_eq!(err.body().error, "Server error");
    }

    #[tokio::test]
    async fn query_without_records_is_unexpected() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/services/data/{API_VERSION}/query/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
            .expect(1)
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_leads().await.unwrap_err();
        assert!(matches!(err, GatewayError::Unexpected { .. }));
        assert_eq!(err.body().error, "Server error");
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn missing_secret_never_reaches_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for strip in 0..5 {
            let mut sf = settings(&server.uri());
            let slot = match strip {
                0 => &mut sf.client_id,
                1 => &mut sf.client_secret,
                2 => &mut sf.username,
                3 => &mut sf.password,
                _ => &mut sf.security_token,
            };
            *slot = None;
            let err = CrmConfig::from_settings(&sf).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(_)));
        }

        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
