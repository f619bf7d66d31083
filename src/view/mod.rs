//! Rendering of results and listings

pub mod artifact;
pub mod listing;

pub use artifact::{
    artifact_key, ArtifactAction, ArtifactBoard, ArtifactLink, ArtifactView, MAX_ARTIFACT_ERRORS,
};
pub use listing::{
    conversion_summary, part_label, ConversionView, Listed, Listing, ListingPage, ListingState,
    MergeView, SplitPartView, SplitView,
};
