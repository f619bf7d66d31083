//! File API Console Library
//!
//! This crate drives a remote file-processing API through three flows:
//! - merge: combine several PDFs into one
//! - split: cut one PDF into page ranges
//! - convert: change a file between pdf, png, jpg and webp
//!
//! The flows are exposed as MCP tools (`server`) and, for browser callers, as
//! a same-origin JSON passthrough (`proxy`).

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod proxy;
pub mod server;
pub mod view;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use proxy::{run_proxy, ProxyConfig};
pub use server::{
    run_server, run_server_with_config, FileApiServer, ServerConfig, SubmissionResult,
    SubmissionStatus,
};
