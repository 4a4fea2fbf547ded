//! `reqwest` implementation of the block source and sink.

use std::time::Duration;

use async_trait::async_trait;
use eqfix_blocks::{BlockPage, BlockUpdate};
use eqfix_core::{BlockSink, BlockSource, SinkError, SourceError};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Connection settings, read from the `[notion]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    pub base_url: String,
    pub notion_version: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Error body returned by the Notion API.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Authenticated client for the blocks endpoints.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    /// Build a client that sends `token` as a bearer token on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// underlying HTTP client cannot be built.
    pub fn new(token: &str, config: &NotionConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|e| {
            Error::InvalidHeader {
                header: "Authorization",
                message: e.to_string(),
            }
        })?;
        auth.set_sensitive(true);

        let version = HeaderValue::from_str(&config.notion_version).map_err(|e| {
            Error::InvalidHeader {
                header: "Notion-Version",
                message: e.to_string(),
            }
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", version);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn children_url(&self, parent_id: &str) -> String {
        format!("{}/v1/blocks/{}/children", self.base_url, parent_id)
    }

    fn block_url(&self, block_id: &str) -> String {
        format!("{}/v1/blocks/{}", self.base_url, block_id)
    }
}

/// Turn an error response body into a short message, preferring the API's
/// `code: message` form over the raw body.
fn api_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError {
            code: Some(code),
            message: Some(message),
        }) => format!("{code}: {message}"),
        Ok(ApiError {
            message: Some(message),
            ..
        }) => message,
        _ => body.trim().to_string(),
    }
}

async fn error_message(response: Response) -> String {
    match response.text().await {
        Ok(body) => api_message(&body),
        Err(e) => e.to_string(),
    }
}

/// Map a failed write status onto the sink's failure classes.
pub fn classify_write_failure(status: StatusCode, message: String) -> SinkError {
    if status == StatusCode::CONFLICT {
        SinkError::Conflict { message }
    } else {
        SinkError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl BlockSource for NotionClient {
    async fn list_children(
        &self,
        parent_id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> std::result::Result<BlockPage, SourceError> {
        let mut request = self
            .http
            .get(self.children_url(parent_id))
            .query(&[("page_size", page_size.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }

        let response = request.send().await.map_err(|e| SourceError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        let page: BlockPage = response.json().await.map_err(|e| SourceError::Decode {
            message: e.to_string(),
        })?;
        debug!(parent_id, results = page.results.len(), "Listed children");
        Ok(page)
    }
}

#[async_trait]
impl BlockSink for NotionClient {
    async fn update_block(
        &self,
        block_id: &str,
        update: &BlockUpdate,
    ) -> std::result::Result<(), SinkError> {
        let response = self
            .http
            .patch(self.block_url(block_id))
            .json(update)
            .send()
            .await
            .map_err(|e| SinkError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(classify_write_failure(status, error_message(response).await))
    }
}
