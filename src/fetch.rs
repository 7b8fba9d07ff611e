//! Remote fetch of an entry's references
//!
//! Calls the management API's "references of an entry" endpoint and returns
//! the raw response body, ready for [`EntityGraph::from_json_str`]. A timeout
//! or a response the API refuses to build (too many links) surfaces as
//! [`Error::TreeTooComplex`].
//!
//! [`EntityGraph::from_json_str`]: crate::graph::EntityGraph::from_json_str

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::core::config::ApiConfig;
use crate::core::error::{Error, Result};

/// Upper bound the API accepts for `include`
pub const MAX_INCLUDE: u8 = 10;

pub struct ReferencesClient {
    http: reqwest::Client,
    config: ApiConfig,
    space_id: String,
    token: String,
}

impl ReferencesClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let space_id = config.space_id.clone().ok_or_else(|| Error::ConfigError {
            message: "api.space_id is not configured".to_string(),
        })?;
        let token = config.resolved_token()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("reftree/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            space_id,
            token,
        })
    }

    /// `{base}/spaces/{space}/environments/{env}/entries/{id}/references?include=n`
    pub fn references_url(&self, entry_id: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{}/spaces/{}/environments/{}/entries/{}/references",
            base,
            urlencoding::encode(&self.space_id),
            urlencoding::encode(&self.config.environment_id),
            urlencoding::encode(entry_id),
        ))?;
        let include = self.config.include.clamp(1, MAX_INCLUDE);
        url.query_pairs_mut()
            .append_pair("include", &include.to_string());
        Ok(url)
    }

    /// Fetch the references response body for `entry_id`
    pub async fn fetch_references(&self, entry_id: &str) -> Result<String> {
        let url = self.references_url(entry_id)?;
        debug!(%url, "Fetching references");

        let request = self.http.get(url).bearer_auth(&self.token).send();
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let response = match tokio::time::timeout(timeout, request).await {
            Ok(response) => response?,
            Err(_) => {
                warn!(entry_id, timeout_secs = self.config.timeout_secs, "References request timed out");
                return Err(Error::TreeTooComplex);
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response.text().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

fn classify_failure(status: StatusCode, body: &str) -> Error {
    // The API answers oversized link graphs with a 400 mentioning the response size
    if (status == StatusCode::BAD_REQUEST && body.contains("ResponseSizeTooBig"))
        || status == StatusCode::PAYLOAD_TOO_LARGE
    {
        return Error::TreeTooComplex;
    }
    Error::Fetch {
        message: format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or("")),
    }
}
