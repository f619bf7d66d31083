//! Local passthrough to the remote file API
//!
//! `POST /api/merge`, `/api/split` and `/api/convert` forward their JSON body
//! unmodified to the matching remote collection. Remote failures keep their
//! status code and are reduced to a `{message}` body; anything that goes
//! wrong locally is a 500.

use crate::api::{ApiClient, ErrorBody, CONVERSIONS_PATH, MERGES_PATH, SPLITS_PATH};
use crate::config::ClientConfig;
use crate::error::Error;
use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::net::SocketAddr;
use thiserror::Error as ThisError;
use tower_http::trace::TraceLayer;

pub const INTERNAL_ERROR: &str = "Internal server error";

/// Configuration for the passthrough server
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Address to listen on (default: 127.0.0.1:3000)
    pub bind_addr: SocketAddr,
    /// Remote API the requests are forwarded to
    pub client: ClientConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            client: ClientConfig::default(),
        }
    }
}

#[derive(Clone)]
struct ProxyState {
    client: ApiClient,
}

/// Passthrough failures, as seen by the browser
#[derive(ThisError, Debug)]
pub enum ProxyError {
    #[error("Remote returned {status}: {message}")]
    Remote { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    fn from_api(err: Error, generic: &str) -> Self {
        match &err {
            Error::Api { status, .. } => match StatusCode::from_u16(*status) {
                Ok(status) => ProxyError::Remote {
                    status,
                    message: err.display_message(generic),
                },
                Err(_) => ProxyError::Internal(err.to_string()),
            },
            _ => ProxyError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ProxyError::Remote { status, message } => (status, message),
            ProxyError::Internal(detail) => {
                tracing::error!(%detail, "passthrough failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
        };

        let body = ErrorBody {
            message: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the passthrough router around an existing client
pub fn router(client: ApiClient) -> Router {
    Router::new()
        .route("/api/merge", post(handle_merge))
        .route("/api/split", post(handle_split))
        .route("/api/convert", post(handle_convert))
        .layer(TraceLayer::new_for_http())
        .with_state(ProxyState { client })
}

/// Handler: POST /api/merge
async fn handle_merge(State(state): State<ProxyState>, body: Bytes) -> Response {
    forward(&state.client, MERGES_PATH, "Failed to merge files", &body).await
}

/// Handler: POST /api/split
async fn handle_split(State(state): State<ProxyState>, body: Bytes) -> Response {
    forward(&state.client, SPLITS_PATH, "Failed to split PDF", &body).await
}

/// Handler: POST /api/convert
async fn handle_convert(State(state): State<ProxyState>, body: Bytes) -> Response {
    forward(&state.client, CONVERSIONS_PATH, "Failed to convert file", &body).await
}

async fn forward(client: &ApiClient, path: &str, generic: &str, body: &[u8]) -> Response {
    let payload: serde_json::Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => return ProxyError::Internal(format!("invalid request body: {}", e)).into_response(),
    };

    tracing::info!(path, "forwarding request");
    match client.forward(path, &payload).await {
        Ok(data) => Json(data).into_response(),
        Err(e) => ProxyError::from_api(e, generic).into_response(),
    }
}

/// Run the passthrough until the process is stopped
pub async fn run_proxy(config: ProxyConfig) -> Result<()> {
    let client = ApiClient::new(config.client.clone())?;
    let app = router(client);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        remote = %config.client.base_url,
        "passthrough listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_config_default() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_remote_error_keeps_status() {
        let err = ProxyError::from_api(
            Error::Api {
                status: 404,
                message: None,
            },
            "Failed to merge files",
        );
        match err {
            ProxyError::Remote { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Failed to merge files");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_remote_error_is_internal() {
        let err = ProxyError::from_api(
            serde_json::from_str::<u8>("x").unwrap_err().into(),
            "Failed to merge files",
        );
        assert!(matches!(err, ProxyError::Internal(_)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
