//! HTTP pinning service client.
//!
//! Speaks the NFT.storage-style `POST /store` API: a `multipart/form-data`
//! request with a `meta` part (the metadata object as JSON) and an `image`
//! part (the payload), answered by
//!
//! ```json
//! { "ok": true, "value": { "ipnft": "bafy...", "url": "ipfs://bafy.../metadata.json" } }
//! ```
//!
//! or `{ "ok": false, "error": { "name": "...", "message": "..." } }`.

use async_trait::async_trait;
use pin_types::ContentAddress;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::ContentError;
use crate::store::{ContentStore, Submission};

/// Default pinning service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.nft.storage";

/// Longest response body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// HTTP store configuration.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the pinning service.
    pub endpoint: String,
    /// Bearer token, if the service requires one.
    pub api_token: Option<String>,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            api_token: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoreResponse {
    ok: bool,
    value: Option<StoreValue>,
    error: Option<StoreErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StoreValue {
    url: String,
}

#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    name: Option<String>,
    message: Option<String>,
}

impl StoreErrorBody {
    fn describe(&self) -> String {
        match (&self.name, &self.message) {
            (Some(name), Some(message)) => format!("{name}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(name), None) => name.clone(),
            (None, None) => "unknown error".into(),
        }
    }
}

/// Client for an HTTP pinning service.
#[derive(Debug, Clone)]
pub struct HttpStore {
    config: HttpStoreConfig,
    http: reqwest::Client,
}

impl HttpStore {
    /// Create a new HTTP store client.
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Get the base URL.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Build the URL of the store endpoint.
    pub fn store_url(&self) -> String {
        format!("{}/store", self.config.endpoint.trim_end_matches('/'))
    }

    fn form(submission: &Submission) -> Result<Form, ContentError> {
        let meta = serde_json::to_string(&submission.metadata)
            .map_err(|e| ContentError::InvalidSubmission(e.to_string()))?;
        let image = Part::bytes(submission.payload.clone())
            .file_name(submission.file_name.clone())
            .mime_str(&submission.media_type)
            .map_err(|e| ContentError::InvalidSubmission(e.to_string()))?;

        Ok(Form::new().text("meta", meta).part("image", image))
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn store(&self, submission: &Submission) -> Result<ContentAddress, ContentError> {
        let url = self.store_url();
        tracing::debug!(
            asset = %submission.name,
            bytes = submission.payload.len(),
            "POST {}",
            url
        );

        let mut request = self.http.post(&url).multipart(Self::form(submission)?);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Http {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let body: StoreResponse = response.json().await?;
        if !body.ok {
            let reason = body
                .error
                .as_ref()
                .map(StoreErrorBody::describe)
                .unwrap_or_else(|| "ok: false".into());
            return Err(ContentError::Rejected(reason));
        }

        let value = body
            .value
            .ok_or_else(|| ContentError::InvalidResponse("missing value".into()))?;
        ContentAddress::new(value.url).map_err(|e| ContentError::InvalidResponse(e.to_string()))
    }
}
