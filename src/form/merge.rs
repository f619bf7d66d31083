//! Merge form: two or more source PDFs into one destination

use super::url::is_valid_pdf_url;
use super::{Feedback, FieldId, Form, RowId, Step, ValidationError};
use crate::api::{MergeRequest, MergeResponse};
use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Shown when the remote call fails without a message of its own
pub const MERGE_FAILED: &str = "Failed to merge files";

pub const MIN_MERGE_INPUTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRow {
    pub id: RowId,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeForm {
    pub inputs: Vec<MergeRow>,
    pub merged_file: String,
    pub feedback: Feedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MergeResponse>,
    next_row: u64,
}

#[derive(Debug)]
pub enum MergeEvent {
    SetInput { row: RowId, url: String },
    SetMergedFile(String),
    AddInput,
    RemoveInput(RowId),
    /// Replace every field at once, padding to the minimum row count
    Load {
        files: Vec<String>,
        merged_file: String,
    },
    Submit,
    Completed(crate::error::Result<MergeResponse>),
}

impl Default for MergeForm {
    fn default() -> Self {
        let mut form = Self {
            inputs: Vec::new(),
            merged_file: String::new(),
            feedback: Feedback::default(),
            result: None,
            next_row: 0,
        };
        for _ in 0..MIN_MERGE_INPUTS {
            form.push_row(String::new());
        }
        form
    }
}

impl MergeForm {
    pub fn update(mut self, event: MergeEvent) -> Step<Self, MergeRequest> {
        match event {
            MergeEvent::SetInput { row, url } => {
                if let Some(input) = self.inputs.iter_mut().find(|r| r.id == row) {
                    input.url = url;
                    self.feedback.clear_field(FieldId::MergeInput(row));
                }
            }
            MergeEvent::SetMergedFile(url) => {
                self.merged_file = url;
                self.feedback.clear_field(FieldId::MergedFile);
            }
            MergeEvent::AddInput => {
                self.push_row(String::new());
            }
            MergeEvent::RemoveInput(row) => {
                if self.inputs.len() <= MIN_MERGE_INPUTS {
                    self.feedback.fail("You need at least two files to merge");
                } else if let Some(pos) = self.inputs.iter().position(|r| r.id == row) {
                    self.inputs.remove(pos);
                    self.feedback.clear_field(FieldId::MergeInput(row));
                }
            }
            MergeEvent::Load { files, merged_file } => {
                self.inputs.clear();
                for url in files {
                    self.push_row(url);
                }
                while self.inputs.len() < MIN_MERGE_INPUTS {
                    self.push_row(String::new());
                }
                self.merged_file = merged_file;
                self.feedback.field_errors.clear();
                self.feedback.error = None;
                self.result = None;
            }
            MergeEvent::Submit => return self.submit(),
            MergeEvent::Completed(outcome) => {
                self.feedback.finish();
                match outcome {
                    Ok(response) => self.result = Some(response),
                    Err(e) => {
                        tracing::warn!(error = %e, "merge failed");
                        self.feedback.fail(e.display_message(MERGE_FAILED));
                    }
                }
            }
        }
        Step::stay(self)
    }

    fn submit(mut self) -> Step<Self, MergeRequest> {
        if self.feedback.in_flight {
            return Step::stay(self);
        }

        let errors = validate_merge(&self.inputs, &self.merged_file);
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "merge form rejected");
            self.feedback.field_errors = errors;
            return Step::stay(self);
        }

        self.feedback.field_errors.clear();
        self.feedback.begin();
        let request = self.request();
        Step::send(self, request)
    }

    /// Request body built from the current contents, without validation
    pub fn request(&self) -> MergeRequest {
        MergeRequest {
            files: self.inputs.iter().map(|r| r.url.clone()).collect(),
            merged_file: self.merged_file.clone(),
        }
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.inputs.iter().map(|r| r.id).collect()
    }

    fn push_row(&mut self, url: String) {
        let id = RowId(self.next_row);
        self.next_row += 1;
        self.inputs.push(MergeRow { id, url });
    }
}

/// Check every merge rule and report all violations together
pub fn validate_merge(inputs: &[MergeRow], merged_file: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, row) in inputs.iter().enumerate() {
        let n = index + 1;
        let field = FieldId::MergeInput(row.id);
        if row.url.is_empty() {
            errors.push(ValidationError::new(field, format!("Input URL {} is required", n)));
        } else if !is_valid_pdf_url(&row.url) {
            errors.push(ValidationError::new(
                field,
                format!("Invalid PDF URL for input {}. URL must end with .pdf", n),
            ));
        }
    }

    if merged_file.is_empty() {
        errors.push(ValidationError::new(
            FieldId::MergedFile,
            "Merged file URL is required",
        ));
    } else if !is_valid_pdf_url(merged_file) {
        errors.push(ValidationError::new(
            FieldId::MergedFile,
            "Invalid PDF URL for merged file. URL must end with .pdf",
        ));
    }

    errors
}

impl From<Error> for MergeEvent {
    fn from(err: Error) -> Self {
        MergeEvent::Completed(Err(err))
    }
}

impl Form for MergeForm {
    type Event = MergeEvent;
    type Request = MergeRequest;
    type Response = MergeResponse;

    fn apply(self, event: MergeEvent) -> Step<Self, MergeRequest> {
        self.update(event)
    }

    fn submit_event() -> MergeEvent {
        MergeEvent::Submit
    }

    fn completed_event(outcome: crate::error::Result<MergeResponse>) -> MergeEvent {
        MergeEvent::Completed(outcome)
    }

    fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    fn feedback_mut(&mut self) -> &mut Feedback {
        &mut self.feedback
    }

    fn result(&self) -> Option<&MergeResponse> {
        self.result.as_ref()
    }
}
