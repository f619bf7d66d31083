//! Error types for the file API console

use thiserror::Error;

/// Result type alias for the file API console
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the file API console
#[derive(Error, Debug)]
pub enum Error {
    /// Remote API answered with a non-success status
    #[error("Remote API returned {status}")]
    Api {
        status: u16,
        /// `message` field of the error body, when the body carried one
        message: Option<String>,
    },

    /// HTTP request error (connection refused, DNS, TLS, body decode)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configured base address is not an absolute URL
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl Error {
    /// Text shown to the user for a failed operation.
    ///
    /// A message supplied by the remote error body is trusted and returned
    /// verbatim. Every other failure collapses to `generic`.
    pub fn display_message(&self, generic: &str) -> String {
        match self {
            Error::Api {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => generic.to_string(),
        }
    }

    /// HTTP status of a remote failure, if the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_message_prefers_remote_message() {
        let err = Error::Api {
            status: 400,
            message: Some("files must be PDFs".to_string()),
        };
        assert_eq!(err.display_message("Failed to merge files"), "files must be PDFs");
    }

    #[test]
    fn test_display_message_falls_back_to_generic() {
        let err = Error::Api {
            status: 502,
            message: None,
        };
        assert_eq!(err.display_message("Failed to merge files"), "Failed to merge files");

        let err = Error::Api {
            status: 500,
            message: Some(String::new()),
        };
        assert_eq!(err.display_message("Failed to split PDF"), "Failed to split PDF");
    }

    #[test]
    fn test_display_message_serialization_is_generic() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.display_message("Failed to convert file"), "Failed to convert file");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 404,
            message: Some("not found".to_string()),
        };
        assert_eq!(err.to_string(), "Remote API returned 404");
        assert_eq!(err.status(), Some(404));

        let err = Error::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Remote API returned 500");
    }
}
