//! HTTP client for the remote file API

use crate::api::types::{
    ConversionRequest, ConversionResponse, ErrorBody, MergeRequest, MergeResponse, SplitRequest,
    SplitResponse,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const MERGES_PATH: &str = "/merges";
pub const SPLITS_PATH: &str = "/splits";
pub const CONVERSIONS_PATH: &str = "/conversions";

/// Client shared by every flow.
///
/// Cloning is cheap: the underlying connection pool and configuration are
/// reference counted and never mutated after construction.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Fail early on a bad base address instead of on the first request
        config.endpoint("/")?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(Error::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Merge
    // ------------------------------------------------------------------------

    pub async fn merge(&self, request: &MergeRequest) -> Result<MergeResponse> {
        self.post_json(MERGES_PATH, request).await
    }

    pub async fn list_merges(&self) -> Result<Vec<MergeResponse>> {
        self.get_json(MERGES_PATH).await
    }

    pub async fn get_merge(&self, id: u64) -> Result<MergeResponse> {
        self.get_json(&format!("{}/{}", MERGES_PATH, id)).await
    }

    // ------------------------------------------------------------------------
    // Split
    // ------------------------------------------------------------------------

    pub async fn split(&self, request: &SplitRequest) -> Result<SplitResponse> {
        self.post_json(SPLITS_PATH, request).await
    }

    pub async fn list_splits(&self) -> Result<Vec<SplitResponse>> {
        self.get_json(SPLITS_PATH).await
    }

    pub async fn get_split(&self, id: u64) -> Result<SplitResponse> {
        self.get_json(&format!("{}/{}", SPLITS_PATH, id)).await
    }

    // ------------------------------------------------------------------------
    // Conversion
    // ------------------------------------------------------------------------

    pub async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResponse> {
        self.post_json(CONVERSIONS_PATH, request).await
    }

    pub async fn list_conversions(&self) -> Result<Vec<ConversionResponse>> {
        self.get_json(CONVERSIONS_PATH).await
    }

    pub async fn get_conversion(&self, id: u64) -> Result<ConversionResponse> {
        self.get_json(&format!("{}/{}", CONVERSIONS_PATH, id)).await
    }

    // ------------------------------------------------------------------------
    // Raw access
    // ------------------------------------------------------------------------

    /// POST an arbitrary JSON body to `path` and return the JSON answer
    /// untouched. Used by the passthrough endpoint.
    pub async fn forward(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.post_json(path, body).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path)?;
        let payload = serde_json::to_vec(body)?;
        tracing::debug!(%url, bytes = payload.len(), "POST");

        let response = self.http.post(url).body(payload).send().await?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%url, "GET");

        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message);
            tracing::warn!(status = status.as_u16(), ?message, "remote API error");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
