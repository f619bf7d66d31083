//! Downloadable artifact links
//!
//! Every URL rendered as openable or downloadable is re-checked right before
//! use. The check only asks for a well-formed absolute URL; the `.pdf` rule of
//! the forms does not apply here.

use crate::form::url::{display_name, is_valid_url};
use serde::Serialize;
use std::collections::BTreeMap;

pub const INVALID_URL_FORMAT: &str = "Invalid URL format";

/// Most errors a board keeps; the lowest key is evicted past this
pub const MAX_ARTIFACT_ERRORS: usize = 256;

/// What the user asked to do with an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactAction {
    Open,
    Download,
}

/// A link that passed the check and may be followed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactLink {
    pub key: String,
    pub url: String,
    pub name: String,
    pub action: ArtifactAction,
}

/// Per-artifact error messages, keyed by artifact.
///
/// Each key holds at most one error; errors for different keys never affect
/// each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactBoard {
    errors: BTreeMap<String, String>,
}

impl ArtifactBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `url` before following it.
    ///
    /// On success the key's previous error is cleared and the link returned.
    /// On failure the error is recorded and `None` returned; the caller must
    /// not navigate or download.
    pub fn resolve(&mut self, key: &str, url: &str, action: ArtifactAction) -> Option<ArtifactLink> {
        if !is_valid_url(url) {
            tracing::debug!(key, url, "artifact link rejected");
            if !self.errors.contains_key(key) && self.errors.len() >= MAX_ARTIFACT_ERRORS {
                if let Some((evicted, _)) = self.errors.pop_first() {
                    tracing::debug!(key = %evicted, "artifact error evicted");
                }
            }
            self.errors
                .insert(key.to_string(), INVALID_URL_FORMAT.to_string());
            return None;
        }

        self.errors.remove(key);
        Some(ArtifactLink {
            key: key.to_string(),
            url: url.to_string(),
            name: display_name(url).to_string(),
            action,
        })
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Drop the error recorded for `key`. Returns whether there was one.
    pub fn dismiss(&mut self, key: &str) -> bool {
        self.errors.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Key of an artifact inside a rendered collection, e.g. `merges/0/input/1`
pub fn artifact_key(collection: &str, item: usize, role: &str, part: Option<usize>) -> String {
    match part {
        Some(part) => format!("{}/{}/{}/{}", collection, item, role, part),
        None => format!("{}/{}/{}", collection, item, role),
    }
}

/// Artifact as rendered in a result or listing view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactView {
    pub key: String,
    pub name: String,
    pub url: String,
    /// Set when the URL would be refused if followed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactView {
    pub fn new(key: String, url: &str) -> Self {
        let error = (!is_valid_url(url)).then(|| INVALID_URL_FORMAT.to_string());
        Self {
            key,
            name: display_name(url).to_string(),
            url: url.to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_records_one_error() {
        let mut board = ArtifactBoard::new();
        assert_eq!(board.resolve("merges/0/output", "not a url", ArtifactAction::Download), None);
        assert_eq!(board.resolve("merges/0/output", "still bad", ArtifactAction::Open), None);

        assert_eq!(board.len(), 1);
        assert_eq!(board.error("merges/0/output"), Some("Invalid URL format"));
    }

    #[test]
    fn test_valid_url_any_extension_passes() {
        let mut board = ArtifactBoard::new();
        let link = board
            .resolve("conversions/2/output", "https://h/out/image.png", ArtifactAction::Open)
            .unwrap();
        assert_eq!(link.name, "image.png");
        assert_eq!(link.action, ArtifactAction::Open);
        assert!(board.is_empty());
    }

    #[test]
    fn test_success_clears_only_its_own_error() {
        let mut board = ArtifactBoard::new();
        board.resolve("a", "bad", ArtifactAction::Open);
        board.resolve("b", "bad", ArtifactAction::Open);
        assert!(board.resolve("a", "https://h/a.pdf", ArtifactAction::Open).is_some());

        assert_eq!(board.error("a"), None);
        assert_eq!(board.error("b"), Some(INVALID_URL_FORMAT));
        assert!(board.dismiss("b"));
        assert!(!board.dismiss("b"));
        assert!(board.is_empty());
    }

    #[test]
    fn test_board_keeps_bounded_number_of_errors() {
        let mut board = ArtifactBoard::new();
        for i in 0..MAX_ARTIFACT_ERRORS {
            board.resolve(&format!("conversions/{:03}/output", i), "bad", ArtifactAction::Open);
        }
        assert_eq!(board.len(), MAX_ARTIFACT_ERRORS);

        // Re-recording an existing key evicts nothing
        board.resolve("conversions/100/output", "still bad", ArtifactAction::Open);
        assert_eq!(board.error("conversions/000/output"), Some(INVALID_URL_FORMAT));

        board.resolve("merges/0/output", "bad", ArtifactAction::Download);
        assert_eq!(board.len(), MAX_ARTIFACT_ERRORS);
        assert_eq!(board.error("conversions/000/output"), None);
        assert_eq!(board.error("merges/0/output"), Some(INVALID_URL_FORMAT));
    }

    #[test]
    fn test_artifact_key() {
        assert_eq!(artifact_key("merges", 0, "input", Some(1)), "merges/0/input/1");
        assert_eq!(artifact_key("splits", 3, "source", None), "splits/3/source");
    }

    #[test]
    fn test_artifact_view_flags_invalid_url() {
        let view = ArtifactView::new("k".into(), "relative/part.pdf");
        assert_eq!(view.name, "part.pdf");
        assert_eq!(view.error.as_deref(), Some(INVALID_URL_FORMAT));
        assert_eq!(ArtifactView::new("k".into(), "https://h/p.pdf").error, None);
    }
}
