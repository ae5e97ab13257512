//! Blocking HTTP client for the dashboard service API.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::Serialize;
use serde_json::value::RawValue;

use grafwatch_core::config::GrafanaConfig;

use crate::error::{api_err, ApiError};

/// Calls the dispatcher and the readiness gate need from the service.
pub trait GrafanaApi: Send + Sync {
    /// Create or overwrite a dashboard from its JSON model.
    fn push_dashboard(&self, payload: &str) -> Result<(), ApiError>;

    /// Create a datasource from its JSON definition, sent unchanged.
    fn push_datasource(&self, payload: &str) -> Result<(), ApiError>;

    /// `Ok` once the service reports itself healthy.
    fn health(&self) -> Result<(), ApiError>;
}

#[derive(Serialize)]
struct DashboardEnvelope<'a> {
    dashboard: &'a RawValue,
    overwrite: bool,
}

/// Build the dashboard POST body, embedding `payload` verbatim.
pub fn dashboard_body(payload: &str) -> Result<String, ApiError> {
    let dashboard: &RawValue = serde_json::from_str(payload)?;
    Ok(serde_json::to_string(&DashboardEnvelope {
        dashboard,
        overwrite: true,
    })?)
}

/// `ureq`-backed [`GrafanaApi`] using HTTP basic authentication.
pub struct GrafanaClient {
    agent: ureq::Agent,
    authorization: String,
    dashboard_url: String,
    datasource_url: String,
    health_url: String,
}

impl GrafanaClient {
    pub fn new(config: &GrafanaConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .build();
        let credentials = format!("{}:{}", config.username, config.password);
        Self {
            agent,
            authorization: format!("Basic {}", BASE64_STANDARD.encode(credentials)),
            dashboard_url: config.dashboard_url(),
            datasource_url: config.datasource_url(),
            health_url: config.health_url(),
        }
    }

    fn post(&self, url: &str, body: &str) -> Result<(), ApiError> {
        let response = self
            .agent
            .post(url)
            .set("Authorization", &self.authorization)
            .set("Content-Type", "application/json")
            .send_string(body)
            .map_err(|err| api_err(url, err))?;
        ensure_success(url, response.status())
    }
}

impl GrafanaApi for GrafanaClient {
    fn push_dashboard(&self, payload: &str) -> Result<(), ApiError> {
        let body = dashboard_body(payload)?;
        self.post(&self.dashboard_url, &body)
    }

    fn push_datasource(&self, payload: &str) -> Result<(), ApiError> {
        serde_json::from_str::<&RawValue>(payload)?;
        self.post(&self.datasource_url, payload)
    }

    fn health(&self) -> Result<(), ApiError> {
        let response = self
            .agent
            .get(&self.health_url)
            .call()
            .map_err(|err| api_err(&self.health_url, err))?;
        ensure_success(&self.health_url, response.status())
    }
}

// ureq already turns 4xx/5xx into errors; this catches unfollowed 1xx/3xx.
fn ensure_success(url: &str, status: u16) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ApiError::Status {
            url: url.to_string(),
            status,
        })
    }
}
