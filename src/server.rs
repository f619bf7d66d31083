//! MCP Server implementation using rmcp
//!
//! Each flow keeps one live form. A submission tool loads the supplied fields
//! into that form, submits it, and, when the form dispatches a request, sends
//! it to the remote API and feeds the outcome back. The form's lock is never
//! held across the remote call, so a second submission arriving meanwhile
//! sees the in-flight flag and is turned away.

use crate::api::{ApiClient, ConversionOptions, ConversionResponse, MergeResponse, SplitResponse};
use crate::config::ClientConfig;
use crate::form::split::RangeInput;
use crate::form::{
    available_targets, ConversionEvent, ConversionForm, Form, MergeEvent, MergeForm, SplitEvent,
    SplitForm, ValidationError, FORMAT_COMPATIBILITY,
};
use crate::view::{conversion_summary, ArtifactAction, ArtifactBoard, Listed, Listing};
use anyhow::Result;
use parking_lot::Mutex;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

pub const SUBMISSION_IN_PROGRESS: &str = "A submission is already in progress";

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Remote API every flow talks to
    pub client: ClientConfig,
}

/// File API console MCP server
#[derive(Clone)]
pub struct FileApiServer {
    client: ApiClient,
    merge: Arc<Mutex<MergeForm>>,
    split: Arc<Mutex<SplitForm>>,
    conversion: Arc<Mutex<ConversionForm>>,
    artifacts: Arc<Mutex<ArtifactBoard>>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool parameters
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergeFilesParams {
    /// Source PDF URLs, in merge order (at least two)
    pub sources: Vec<String>,
    /// URL the merged PDF is written to
    pub merged_file: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PageRangeParam {
    /// First page, 1-based
    pub start: i64,
    /// Last page, inclusive
    pub end: i64,
    /// Destination URL; generated from the source URL when omitted
    #[serde(default)]
    pub output_url: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SplitPdfParams {
    /// URL of the PDF to split
    pub file_url: String,
    /// Page ranges, one output file each (at least two)
    pub ranges: Vec<PageRangeParam>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConvertFileParams {
    /// URL of the file to convert
    pub file_url: String,
    /// Source format (pdf, png, jpg, webp); inferred from the URL when omitted
    #[serde(default)]
    pub file_type: Option<String>,
    /// Target format; must be compatible with the source format
    pub target_type: String,
    /// URL the converted file is written to
    pub output_file_url: String,
    /// Output quality, 1-100
    #[serde(default)]
    pub quality: Option<u8>,
    /// Keep document metadata in the output
    #[serde(default)]
    pub preserve_metadata: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetByIdParams {
    /// Record id assigned by the remote API
    pub id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SupportedFormatsParams {
    /// Only list targets for this source format
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenArtifactParams {
    /// Artifact key as rendered in a result or listing (e.g. "merges/0/output")
    pub key: String,
    /// URL of the artifact
    pub url: String,
    /// Download instead of open
    #[serde(default)]
    pub download: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DismissArtifactParams {
    /// Artifact key whose error should be cleared
    pub key: String,
}

// ============================================================================
// Tool results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Remote call succeeded
    Succeeded,
    /// Rejected locally; nothing was sent
    Invalid,
    /// Remote call failed
    Failed,
    /// Another submission of the same flow is outstanding
    Busy,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResult<V> {
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<V>,
}

/// How far a submission got
#[derive(Debug)]
enum Driven<F> {
    Busy,
    Rejected(F),
    Settled(F),
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl FileApiServer {
    /// Create a server against the default remote API
    pub fn new() -> crate::error::Result<Self> {
        Self::with_config(ServerConfig::default())
    }

    /// Create a server with full configuration
    pub fn with_config(config: ServerConfig) -> crate::error::Result<Self> {
        Ok(Self::with_client(ApiClient::new(config.client)?))
    }

    /// Create a server around an existing client
    pub fn with_client(client: ApiClient) -> Self {
        Self {
            client,
            merge: Arc::new(Mutex::new(MergeForm::default())),
            split: Arc::new(Mutex::new(SplitForm::default())),
            conversion: Arc::new(Mutex::new(ConversionForm::default())),
            artifacts: Arc::new(Mutex::new(ArtifactBoard::new())),
            tool_router: Self::tool_router(),
        }
    }

    /// Merge PDFs through the remote API
    #[tool(
        description = "Merge two or more PDFs, given by URL, into one PDF written to merged_file. Every URL must be absolute and end with .pdf. Validation errors are returned per field and nothing is sent until the form is valid."
    )]
    async fn merge_files(&self, Parameters(params): Parameters<MergeFilesParams>) -> String {
        let result = self.process_merge_files(params).await;
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Split one PDF into page ranges
    #[tool(
        description = "Split a PDF, given by URL, into one output file per page range. Ranges are 1-based and inclusive, and at least two are required. Output URLs default to <source dir>/<source name>_part_<n>.pdf."
    )]
    async fn split_pdf(&self, Parameters(params): Parameters<SplitPdfParams>) -> String {
        let result = self.process_split_pdf(params).await;
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Convert one file to another format
    #[tool(
        description = "Convert a file between pdf, png, jpg and webp. The source format is inferred from the URL extension when file_type is omitted. Use supported_formats to see which targets a source allows."
    )]
    async fn convert_file(&self, Parameters(params): Parameters<ConvertFileParams>) -> String {
        let result = self.process_convert_file(params).await;
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// List every merge known to the remote API
    #[tool(description = "List every merge recorded by the remote API, in the order it returns them.")]
    async fn list_merges(&self) -> String {
        let listing = Listing::settle(self.client.list_merges().await);
        serde_json::to_string_pretty(&listing.render()).unwrap_or_default()
    }

    /// List every split known to the remote API
    #[tool(description = "List every split recorded by the remote API, in the order it returns them.")]
    async fn list_splits(&self) -> String {
        let listing = Listing::settle(self.client.list_splits().await);
        serde_json::to_string_pretty(&listing.render()).unwrap_or_default()
    }

    /// List every conversion known to the remote API
    #[tool(
        description = "List every conversion recorded by the remote API, in the order it returns them."
    )]
    async fn list_conversions(&self) -> String {
        let listing = Listing::settle(self.client.list_conversions().await);
        serde_json::to_string_pretty(&listing.render()).unwrap_or_default()
    }

    /// Fetch one merge by id
    #[tool(description = "Fetch one merge record by id.")]
    async fn get_merge(&self, Parameters(params): Parameters<GetByIdParams>) -> String {
        let generic = format!("Failed to fetch merge with ID {}", params.id);
        render_record(self.client.get_merge(params.id).await, &generic)
    }

    /// Fetch one split by id
    #[tool(description = "Fetch one split record by id.")]
    async fn get_split(&self, Parameters(params): Parameters<GetByIdParams>) -> String {
        let generic = format!("Failed to fetch split with ID {}", params.id);
        render_record(self.client.get_split(params.id).await, &generic)
    }

    /// Fetch one conversion by id
    #[tool(description = "Fetch one conversion record by id.")]
    async fn get_conversion(&self, Parameters(params): Parameters<GetByIdParams>) -> String {
        let generic = format!("Failed to fetch conversion with ID {}", params.id);
        render_record(self.client.get_conversion(params.id).await, &generic)
    }

    /// Conversion compatibility table
    #[tool(
        description = "List the supported conversion formats. With file_type, only the targets that source format can be converted to."
    )]
    async fn supported_formats(
        &self,
        Parameters(params): Parameters<SupportedFormatsParams>,
    ) -> String {
        let response = match params.file_type {
            Some(tag) => {
                let tag = tag.to_lowercase();
                let targets = available_targets(&tag);
                serde_json::json!({ "file_type": tag, "targets": targets })
            }
            None => {
                let formats: serde_json::Map<String, serde_json::Value> = FORMAT_COMPATIBILITY
                    .iter()
                    .map(|(source, targets)| (source.to_string(), serde_json::json!(targets)))
                    .collect();
                serde_json::json!({ "formats": formats })
            }
        };
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }

    /// Check an artifact link before following it
    #[tool(
        description = "Check a result or listing artifact URL before opening or downloading it. Returns the link when the URL is well formed, otherwise an error recorded against that artifact key."
    )]
    async fn open_artifact(&self, Parameters(params): Parameters<OpenArtifactParams>) -> String {
        let action = if params.download {
            ArtifactAction::Download
        } else {
            ArtifactAction::Open
        };

        let response = {
            let mut board = self.artifacts.lock();
            match board.resolve(&params.key, &params.url, action) {
                Some(link) => serde_json::json!({ "link": link }),
                None => serde_json::json!({
                    "key": &params.key,
                    "error": board.error(&params.key),
                }),
            }
        };
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }

    #[tool(description = "Dismiss the error recorded against an artifact key by open_artifact.")]
    async fn dismiss_artifact(
        &self,
        Parameters(params): Parameters<DismissArtifactParams>,
    ) -> String {
        let dismissed = self.artifacts.lock().dismiss(&params.key);
        let response = serde_json::json!({ "key": params.key, "dismissed": dismissed });
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }
}

impl FileApiServer {
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn process_merge_files(
        &self,
        params: MergeFilesParams,
    ) -> SubmissionResult<crate::view::MergeView> {
        let load = MergeEvent::Load {
            files: params.sources,
            merged_file: params.merged_file,
        };
        let client = self.client.clone();
        let driven = drive(&*self.merge, load, |request| async move {
            client.merge(&request).await
        })
        .await;

        summarize(driven, |response: &MergeResponse| {
            (
                "Your files have been successfully merged.".to_string(),
                response.render(0),
            )
        })
    }

    pub async fn process_split_pdf(
        &self,
        params: SplitPdfParams,
    ) -> SubmissionResult<crate::view::SplitView> {
        let load = SplitEvent::Load {
            file_url: params.file_url,
            ranges: params
                .ranges
                .into_iter()
                .map(|range| RangeInput {
                    start: range.start.to_string(),
                    end: range.end.to_string(),
                    output_url: range.output_url,
                })
                .collect(),
        };
        let client = self.client.clone();
        let driven = drive(&*self.split, load, |request| async move {
            client.split(&request).await
        })
        .await;

        summarize(driven, |response: &SplitResponse| {
            (
                format!(
                    "Your file has been successfully split into {} parts.",
                    response.split_files.len()
                ),
                response.render(0),
            )
        })
    }

    pub async fn process_convert_file(
        &self,
        params: ConvertFileParams,
    ) -> SubmissionResult<crate::view::ConversionView> {
        let load = ConversionEvent::Load {
            file_url: params.file_url,
            file_type: params.file_type.map(|tag| tag.to_lowercase()),
            target_type: params.target_type.to_lowercase(),
            output_file_url: params.output_file_url,
            options: Some(ConversionOptions {
                quality: params.quality,
                preserve_metadata: params.preserve_metadata,
            }),
        };
        let client = self.client.clone();
        let driven = drive(&*self.conversion, load, |request| async move {
            client.convert(&request).await
        })
        .await;

        summarize(driven, |response: &ConversionResponse| {
            (
                format!(
                    "Your file has been successfully converted from {}.",
                    conversion_summary(&response.file_type, &response.target_type)
                ),
                response.render(0),
            )
        })
    }
}

/// Load, submit, dispatch and complete one form.
///
/// The lock is released before `send` is awaited and re-taken to apply the
/// completion. If the returned future is dropped mid-send, the form is left
/// idle again.
async fn drive<F, S, Fut>(slot: &Mutex<F>, load: F::Event, send: S) -> Driven<F>
where
    F: Form,
    S: FnOnce(F::Request) -> Fut,
    Fut: Future<Output = crate::error::Result<F::Response>>,
{
    let request = {
        let mut guard = slot.lock();
        if guard.feedback().in_flight {
            tracing::debug!("submission refused, another one is in flight");
            return Driven::Busy;
        }

        let form = std::mem::take(&mut *guard).apply(load).state;
        let step = form.apply(F::submit_event());
        *guard = step.state;
        match step.dispatch {
            Some(request) => request,
            None => return Driven::Rejected(F::clone(&guard)),
        }
    };

    let pending = InFlight {
        slot,
        armed: true,
    };
    let outcome = send(request).await;
    pending.disarm();

    let mut guard = slot.lock();
    let form = std::mem::take(&mut *guard);
    *guard = form.apply(F::completed_event(outcome)).state;
    Driven::Settled(F::clone(&guard))
}

/// Clears the busy flag when a dispatched submission is dropped or panics
/// before its completion is applied.
struct InFlight<'a, F: Form> {
    slot: &'a Mutex<F>,
    armed: bool,
}

impl<F: Form> InFlight<'_, F> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<F: Form> Drop for InFlight<'_, F> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("submission abandoned before completion, releasing the form");
            self.slot.lock().feedback_mut().finish();
        }
    }
}

fn summarize<F, V>(
    driven: Driven<F>,
    render: impl FnOnce(&F::Response) -> (String, V),
) -> SubmissionResult<V>
where
    F: Form,
{
    match driven {
        Driven::Busy => SubmissionResult {
            status: SubmissionStatus::Busy,
            message: Some(SUBMISSION_IN_PROGRESS.to_string()),
            error: None,
            field_errors: Vec::new(),
            result: None,
        },
        Driven::Rejected(form) => SubmissionResult {
            status: SubmissionStatus::Invalid,
            message: None,
            error: form.feedback().error.clone(),
            field_errors: form.feedback().field_errors.clone(),
            result: None,
        },
        Driven::Settled(form) => match (form.result(), &form.feedback().error) {
            (Some(response), None) => {
                let (message, view) = render(response);
                SubmissionResult {
                    status: SubmissionStatus::Succeeded,
                    message: Some(message),
                    error: None,
                    field_errors: Vec::new(),
                    result: Some(view),
                }
            }
            (_, error) => SubmissionResult {
                status: SubmissionStatus::Failed,
                message: None,
                error: error.clone(),
                field_errors: Vec::new(),
                result: None,
            },
        },
    }
}

fn render_record<T: Listed>(outcome: crate::error::Result<T>, generic: &str) -> String {
    let response = match outcome {
        Ok(record) => serde_json::json!({ "item": record.render(0) }),
        Err(e) => {
            tracing::warn!(error = %e, collection = T::COLLECTION, "record fetch failed");
            serde_json::json!({ "error": e.display_message(generic) })
        }
    };
    serde_json::to_string_pretty(&response).unwrap_or_default()
}

#[tool_handler]
impl ServerHandler for FileApiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "File API console: merge and split PDFs and convert files between pdf, png, jpg \
                 and webp through a remote file API. Inputs and outputs are URLs. Listing tools \
                 show past operations."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server against the default remote API
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig::default()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    tracing::info!(remote = %config.client.base_url, "using remote file API");
    let server = FileApiServer::with_config(config)?;

    tracing::info!("File API console ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
