//! Listing pages: the full remote collection for one flow
//!
//! A listing is fetched once per visit and rendered as-is: no filtering,
//! paging or re-sorting beyond the order the remote returned.

use super::artifact::{artifact_key, ArtifactView};
use crate::api::{ConversionResponse, MergeResponse, SplitResponse};
use crate::error::Result;
use serde::Serialize;

/// Remote record that can be shown on a listing page
pub trait Listed {
    /// Rendered form of one record
    type View: Serialize;

    /// Collection segment, also used as the artifact key prefix
    const COLLECTION: &'static str;
    const LOADING: &'static str;
    const FETCH_FAILED: &'static str;
    const EMPTY_TITLE: &'static str;
    const EMPTY_MESSAGE: &'static str;

    fn render(&self, index: usize) -> Self::View;
}

/// View state of a listing page
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Loading,
    Loaded(Vec<T>),
    Failed(String),
}

impl<T: Listed> Listing<T> {
    /// Settle a fetch outcome. An empty collection is a normal result, not an
    /// error.
    pub fn settle(outcome: Result<Vec<T>>) -> Self {
        match outcome {
            Ok(items) => Listing::Loaded(items),
            Err(e) => {
                tracing::warn!(error = %e, collection = T::COLLECTION, "listing fetch failed");
                Listing::Failed(e.display_message(T::FETCH_FAILED))
            }
        }
    }

    pub fn render(&self) -> ListingPage<T::View> {
        match self {
            Listing::Loading => ListingPage {
                state: ListingState::Loading,
                title: None,
                message: Some(T::LOADING.to_string()),
                items: Vec::new(),
            },
            Listing::Failed(message) => ListingPage {
                state: ListingState::Error,
                title: Some("Error".to_string()),
                message: Some(message.clone()),
                items: Vec::new(),
            },
            Listing::Loaded(items) if items.is_empty() => ListingPage {
                state: ListingState::Empty,
                title: Some(T::EMPTY_TITLE.to_string()),
                message: Some(T::EMPTY_MESSAGE.to_string()),
                items: Vec::new(),
            },
            Listing::Loaded(items) => ListingPage {
                state: ListingState::Items,
                title: None,
                message: None,
                items: items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| item.render(index))
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingState {
    Loading,
    Empty,
    Items,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingPage<V> {
    pub state: ListingState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub items: Vec<V>,
}

// ============================================================================
// Merges
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeView {
    pub title: String,
    pub inputs: Vec<ArtifactView>,
    pub merged_file: ArtifactView,
}

impl Listed for MergeResponse {
    type View = MergeView;

    const COLLECTION: &'static str = "merges";
    const LOADING: &'static str = "Loading merged files...";
    const FETCH_FAILED: &'static str = "Failed to fetch merged files";
    const EMPTY_TITLE: &'static str = "No merged files";
    const EMPTY_MESSAGE: &'static str = "You haven't merged any files yet.";

    fn render(&self, index: usize) -> MergeView {
        MergeView {
            title: format!("Merged File {}", index + 1),
            inputs: self
                .files
                .iter()
                .enumerate()
                .map(|(i, url)| {
                    ArtifactView::new(artifact_key(Self::COLLECTION, index, "input", Some(i)), url)
                })
                .collect(),
            merged_file: ArtifactView::new(
                artifact_key(Self::COLLECTION, index, "output", None),
                &self.merged_file,
            ),
        }
    }
}

// ============================================================================
// Splits
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitPartView {
    pub label: String,
    #[serde(flatten)]
    pub artifact: ArtifactView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitView {
    pub title: String,
    pub id: u64,
    pub source: ArtifactView,
    pub parts: Vec<SplitPartView>,
}

/// `Part N (Pages a-b)`, or just `Part N` when the range is missing
pub fn part_label(part: usize, range: Option<(u32, u32)>) -> String {
    match range {
        Some((start, end)) => format!("Part {} (Pages {}-{})", part, start, end),
        None => format!("Part {}", part),
    }
}

impl Listed for SplitResponse {
    type View = SplitView;

    const COLLECTION: &'static str = "splits";
    const LOADING: &'static str = "Loading split files...";
    const FETCH_FAILED: &'static str = "Failed to fetch split files";
    const EMPTY_TITLE: &'static str = "No split files";
    const EMPTY_MESSAGE: &'static str = "You haven't split any files yet.";

    fn render(&self, index: usize) -> SplitView {
        SplitView {
            title: format!("Split Operation {}", index + 1),
            id: self.id,
            source: ArtifactView::new(
                artifact_key(Self::COLLECTION, index, "source", None),
                &self.file_name,
            ),
            parts: self
                .split_files
                .iter()
                .enumerate()
                .map(|(i, url)| SplitPartView {
                    label: part_label(i + 1, self.page_ranges.get(i).copied()),
                    artifact: ArtifactView::new(
                        artifact_key(Self::COLLECTION, index, "part", Some(i)),
                        url,
                    ),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionView {
    pub title: String,
    pub original: ArtifactView,
    pub converted: ArtifactView,
}

/// `PDF to PNG`
pub fn conversion_summary(file_type: &str, target_type: &str) -> String {
    format!(
        "{} to {}",
        file_type.to_uppercase(),
        target_type.to_uppercase()
    )
}

impl Listed for ConversionResponse {
    type View = ConversionView;

    const COLLECTION: &'static str = "conversions";
    const LOADING: &'static str = "Loading conversions...";
    const FETCH_FAILED: &'static str = "Failed to fetch conversions";
    const EMPTY_TITLE: &'static str = "No conversions";
    const EMPTY_MESSAGE: &'static str = "You haven't converted any files yet.";

    fn render(&self, index: usize) -> ConversionView {
        ConversionView {
            title: format!(
                "Conversion {}: {}",
                index + 1,
                conversion_summary(&self.file_type, &self.target_type)
            ),
            original: ArtifactView::new(
                artifact_key(Self::COLLECTION, index, "source", None),
                &self.file_url,
            ),
            converted: ArtifactView::new(
                artifact_key(Self::COLLECTION, index, "output", None),
                &self.output_file_url,
            ),
        }
    }
}
