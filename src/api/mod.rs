//! Remote file API: wire types and the shared HTTP client

pub mod client;
pub mod types;

pub use client::{ApiClient, CONVERSIONS_PATH, MERGES_PATH, SPLITS_PATH};
pub use types::{
    ConversionOptions, ConversionRequest, ConversionResponse, ErrorBody, MergeRequest,
    MergeResponse, SplitRequest, SplitResponse,
};
