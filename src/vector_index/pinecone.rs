//! Pinecone REST client.

use super::{SearchMatch, VectorIndex};
use crate::config::{PineconeSettings, PINECONE_API_KEY_VAR};
use crate::error::{Result, VidqaError};
use crate::openai::{http_client, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Request body for `POST /query`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

/// Response from `POST /query`.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<SearchMatch>,
}

/// Request body for `POST /vectors/delete`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    delete_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

/// Response from `GET /indexes/{name}` on the control plane.
#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

/// Client for a hosted Pinecone index.
pub struct PineconeIndex {
    client: Client,
    api_key: String,
    settings: PineconeSettings,
    host: OnceCell<String>,
}

impl PineconeIndex {
    /// Create a client with an explicit API key.
    pub fn new(api_key: &str, settings: &PineconeSettings) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(VidqaError::Config(format!("{} is empty", PINECONE_API_KEY_VAR)));
        }
        if settings.index_name.trim().is_empty() {
            return Err(VidqaError::Config("pinecone.index_name is not set".to_string()));
        }

        let host = OnceCell::new_with(settings.index_host.as_deref().map(normalize_host));

        Ok(Self {
            client: http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            api_key: api_key.to_string(),
            settings: settings.clone(),
            host,
        })
    }

    /// Create a client reading the API key from `PINECONE_API_KEY`.
    pub fn from_env(settings: &PineconeSettings) -> Result<Self> {
        let api_key = std::env::var(PINECONE_API_KEY_VAR)
            .map_err(|_| VidqaError::Config(format!("{} not set", PINECONE_API_KEY_VAR)))?;
        Self::new(&api_key, settings)
    }

    /// Name of the index this client targets.
    pub fn index_name(&self) -> &str {
        &self.settings.index_name
    }

    /// Data-plane base URL, resolved from the control plane on first use.
    pub async fn host(&self) -> Result<&str> {
        self.host
            .get_or_try_init(|| self.describe_host())
            .await
            .map(String::as_str)
    }

    #[instrument(skip(self), fields(index = %self.settings.index_name))]
    async fn describe_host(&self) -> Result<String> {
        let url = format!(
            "{}/indexes/{}",
            self.settings.control_plane_url.trim_end_matches('/'),
            self.settings.index_name
        );

        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.settings.api_version)
            .send()
            .await
            .map_err(|e| VidqaError::Search(format!("Failed to describe index: {}", e)))?;

        let response = check_status(response, "describe index").await?;
        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| VidqaError::Search(format!("Malformed describe response: {}", e)))?;

        let host = normalize_host(&described.host);
        info!("Resolved index host {}", host);
        Ok(host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, vector), fields(index = %self.settings.index_name, dims = vector.len()))]
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<SearchMatch>> {
        if top_k == 0 {
            return Err(VidqaError::InvalidInput("top_k must be at least 1".to_string()));
        }

        let host = self.host().await?;
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata,
            include_values: false,
            namespace: self.settings.namespace.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/query", host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.settings.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| VidqaError::Search(format!("Query request failed: {}", e)))?;

        let response = check_status(response, "query").await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| VidqaError::Search(format!("Malformed query response: {}", e)))?;

        debug!("Index returned {} matches", parsed.matches.len());
        Ok(parsed.matches)
    }

    #[instrument(skip(self), fields(index = %self.settings.index_name))]
    async fn delete_all(&self) -> Result<()> {
        let host = self.host().await?;
        let body = DeleteRequest {
            delete_all: true,
            namespace: self.settings.namespace.as_deref(),
        };

        warn!("Deleting all vectors from index {}", self.settings.index_name);

        let response = self
            .client
            .post(format!("{}/vectors/delete", host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.settings.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| VidqaError::Search(format!("Delete request failed: {}", e)))?;

        check_status(response, "delete").await?;
        info!("All vectors deleted from {}", self.settings.index_name);
        Ok(())
    }
}

/// Turn a non-success status into a search error carrying the response body.
async fn check_status(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(VidqaError::Search(format!(
        "{} failed with status {}: {}",
        operation,
        status,
        body.trim()
    )))
}

/// Hosts come back from the control plane without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
