//! Conversion form: one file converted to a compatible format

use super::formats::{available_targets, infer_format, is_compatible, is_supported_source};
use super::{Feedback, Form, Step};
use crate::api::{ConversionOptions, ConversionRequest, ConversionResponse};
use serde::{Deserialize, Serialize};

/// Shown when the remote call fails without a message of its own
pub const CONVERSION_FAILED: &str = "Failed to convert file";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionForm {
    pub file_url: String,
    /// Source format tag; empty until inferred or selected
    pub file_type: String,
    /// Target format tag; always empty or compatible with `file_type`
    pub target_type: String,
    pub output_file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ConversionOptions>,
    pub feedback: Feedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConversionResponse>,
}

#[derive(Debug)]
pub enum ConversionEvent {
    SetFileUrl(String),
    SelectFileType(String),
    SelectTargetType(String),
    SetOutputUrl(String),
    SetOptions(Option<ConversionOptions>),
    Load {
        file_url: String,
        file_type: Option<String>,
        target_type: String,
        output_file_url: String,
        options: Option<ConversionOptions>,
    },
    Submit,
    Completed(crate::error::Result<ConversionResponse>),
}

impl ConversionForm {
    pub fn update(mut self, event: ConversionEvent) -> Step<Self, ConversionRequest> {
        match event {
            ConversionEvent::SetFileUrl(url) => {
                match infer_format(&url) {
                    Some(tag) => self.file_type = tag.to_string(),
                    None => tracing::debug!(%url, "no format inferred from extension"),
                }
                self.target_type.clear();
                self.file_url = url;
                self.result = None;
                self.feedback.error = None;
            }
            ConversionEvent::SelectFileType(tag) => {
                // Only tags from the compatibility table are offered
                if is_supported_source(&tag) {
                    if !is_compatible(&tag, &self.target_type) {
                        self.target_type.clear();
                    }
                    self.file_type = tag;
                }
            }
            ConversionEvent::SelectTargetType(tag) => {
                if is_compatible(&self.file_type, &tag) {
                    self.target_type = tag;
                }
            }
            ConversionEvent::SetOutputUrl(url) => self.output_file_url = url,
            ConversionEvent::SetOptions(options) => {
                self.options = options.filter(|o| !o.is_empty());
            }
            ConversionEvent::Load {
                file_url,
                file_type,
                target_type,
                output_file_url,
                options,
            } => {
                self = self.update(ConversionEvent::SetFileUrl(file_url)).state;
                if let Some(tag) = file_type {
                    self = self.update(ConversionEvent::SelectFileType(tag)).state;
                }
                self = self.update(ConversionEvent::SelectTargetType(target_type)).state;
                self = self.update(ConversionEvent::SetOutputUrl(output_file_url)).state;
                self = self.update(ConversionEvent::SetOptions(options)).state;
            }
            ConversionEvent::Submit => return self.submit(),
            ConversionEvent::Completed(outcome) => {
                self.feedback.finish();
                match outcome {
                    Ok(response) => self.result = Some(response),
                    Err(e) => {
                        tracing::warn!(error = %e, "conversion failed");
                        self.feedback.fail(e.display_message(CONVERSION_FAILED));
                    }
                }
            }
        }
        Step::stay(self)
    }

    fn submit(mut self) -> Step<Self, ConversionRequest> {
        if self.feedback.in_flight {
            return Step::stay(self);
        }

        if let Some(message) = validate_conversion(&self) {
            self.feedback.fail(message);
            return Step::stay(self);
        }

        self.feedback.begin();
        let request = self.request();
        Step::send(self, request)
    }

    /// Targets currently offered for selection
    pub fn available_targets(&self) -> &'static [&'static str] {
        available_targets(&self.file_type)
    }

    pub fn request(&self) -> ConversionRequest {
        ConversionRequest {
            file_type: self.file_type.clone(),
            file_url: self.file_url.clone(),
            target_type: self.target_type.clone(),
            output_file_url: self.output_file_url.clone(),
            options: self.options.clone(),
        }
    }
}

/// First missing field, checked in display order. Only one message is ever
/// shown at a time.
pub fn validate_conversion(form: &ConversionForm) -> Option<&'static str> {
    if form.file_url.is_empty() {
        Some("Please enter a file URL to convert")
    } else if form.file_type.is_empty() {
        Some("Please select input file type")
    } else if form.target_type.is_empty() {
        Some("Please select an output format")
    } else if form.output_file_url.is_empty() {
        Some("Please enter the output file URL")
    } else {
        None
    }
}

impl Form for ConversionForm {
    type Event = ConversionEvent;
    type Request = ConversionRequest;
    type Response = ConversionResponse;

    fn apply(self, event: ConversionEvent) -> Step<Self, ConversionRequest> {
        self.update(event)
    }

    fn submit_event() -> ConversionEvent {
        ConversionEvent::Submit
    }

    fn completed_event(outcome: crate::error::Result<ConversionResponse>) -> ConversionEvent {
        ConversionEvent::Completed(outcome)
    }

    fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    fn feedback_mut(&mut self) -> &mut Feedback {
        &mut self.feedback
    }

    fn result(&self) -> Option<&ConversionResponse> {
        self.result.as_ref()
    }
}
