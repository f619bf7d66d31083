//! Split form: one source PDF cut into page ranges

use super::url::is_valid_pdf_url;
use super::{Feedback, FieldId, Form, RowId, Step, ValidationError};
use crate::api::{SplitRequest, SplitResponse};
use serde::{Deserialize, Serialize};

/// Shown when the remote call fails without a message of its own
pub const SPLIT_FAILED: &str = "Failed to split PDF";

pub const MIN_PAGE_RANGES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRangeRow {
    pub id: RowId,
    pub start: u32,
    pub end: u32,
    pub output_url: String,
}

/// One row as supplied in bulk by [`SplitEvent::Load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeInput {
    /// Raw start page as typed
    pub start: String,
    /// Raw end page as typed
    pub end: String,
    /// Destination; generated from the source URL when `None`
    pub output_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitForm {
    pub file_url: String,
    pub ranges: Vec<PageRangeRow>,
    pub feedback: Feedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SplitResponse>,
    next_row: u64,
}

#[derive(Debug)]
pub enum SplitEvent {
    SetFileUrl(String),
    SetStart { row: RowId, raw: String },
    SetEnd { row: RowId, raw: String },
    SetOutputUrl { row: RowId, url: String },
    AddRange,
    RemoveRange(RowId),
    Load {
        file_url: String,
        ranges: Vec<RangeInput>,
    },
    Submit,
    Completed(crate::error::Result<SplitResponse>),
}

impl Default for SplitForm {
    fn default() -> Self {
        let mut form = Self {
            file_url: String::new(),
            ranges: Vec::new(),
            feedback: Feedback::default(),
            result: None,
            next_row: 0,
        };
        for _ in 0..MIN_PAGE_RANGES {
            form.push_range();
        }
        form
    }
}

impl SplitForm {
    pub fn update(mut self, event: SplitEvent) -> Step<Self, SplitRequest> {
        match event {
            SplitEvent::SetFileUrl(url) => self.set_file_url(url),
            SplitEvent::SetStart { row, raw } => {
                if let Some(page) = parse_page_number(&raw) {
                    if let Some(range) = self.row_mut(row) {
                        range.start = page;
                        self.feedback.clear_field(FieldId::PageRange(row));
                    }
                }
            }
            SplitEvent::SetEnd { row, raw } => {
                if let Some(page) = parse_page_number(&raw) {
                    if let Some(range) = self.row_mut(row) {
                        range.end = page;
                        self.feedback.clear_field(FieldId::PageRange(row));
                    }
                }
            }
            SplitEvent::SetOutputUrl { row, url } => {
                if let Some(range) = self.row_mut(row) {
                    range.output_url = url;
                    self.feedback.clear_field(FieldId::SplitOutput(row));
                }
            }
            SplitEvent::AddRange => self.push_range(),
            SplitEvent::RemoveRange(row) => {
                if self.ranges.len() <= MIN_PAGE_RANGES {
                    self.feedback.fail("You need at least two page ranges");
                } else if let Some(pos) = self.ranges.iter().position(|r| r.id == row) {
                    self.ranges.remove(pos);
                    self.feedback.clear_field(FieldId::PageRange(row));
                    self.feedback.clear_field(FieldId::SplitOutput(row));
                }
            }
            SplitEvent::Load { file_url, ranges } => {
                self.ranges.clear();
                self.feedback.field_errors.clear();
                self.file_url = String::new();
                for input in ranges {
                    self.push_range();
                    let id = self.ranges[self.ranges.len() - 1].id;
                    self = self.update(SplitEvent::SetStart { row: id, raw: input.start }).state;
                    self = self.update(SplitEvent::SetEnd { row: id, raw: input.end }).state;
                    if let Some(url) = input.output_url {
                        self = self.update(SplitEvent::SetOutputUrl { row: id, url }).state;
                    }
                }
                while self.ranges.len() < MIN_PAGE_RANGES {
                    self.push_range();
                }
                // Explicit destinations win over generated ones
                let explicit: Vec<(RowId, String)> = self
                    .ranges
                    .iter()
                    .filter(|r| !r.output_url.is_empty())
                    .map(|r| (r.id, r.output_url.clone()))
                    .collect();
                self.set_file_url(file_url);
                for (id, url) in explicit {
                    if let Some(range) = self.row_mut(id) {
                        range.output_url = url;
                    }
                }
            }
            SplitEvent::Submit => return self.submit(),
            SplitEvent::Completed(outcome) => {
                self.feedback.finish();
                match outcome {
                    Ok(response) => self.result = Some(response),
                    Err(e) => {
                        tracing::warn!(error = %e, "split failed");
                        self.feedback.fail(e.display_message(SPLIT_FAILED));
                    }
                }
            }
        }
        Step::stay(self)
    }

    fn submit(mut self) -> Step<Self, SplitRequest> {
        if self.feedback.in_flight {
            return Step::stay(self);
        }

        let errors = validate_split(&self.file_url, &self.ranges);
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "split form rejected");
            self.feedback.field_errors = errors;
            return Step::stay(self);
        }

        self.feedback.field_errors.clear();
        self.feedback.begin();
        let request = self.request();
        Step::send(self, request)
    }

    pub fn request(&self) -> SplitRequest {
        SplitRequest {
            file_name: self.file_url.clone(),
            page_ranges: self.ranges.iter().map(|r| (r.start, r.end)).collect(),
            split_files: self.ranges.iter().map(|r| r.output_url.clone()).collect(),
        }
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.ranges.iter().map(|r| r.id).collect()
    }

    fn set_file_url(&mut self, url: String) {
        if !url.is_empty() {
            for (index, range) in self.ranges.iter_mut().enumerate() {
                range.output_url = generate_split_url(&url, index + 1);
                self.feedback.clear_field(FieldId::SplitOutput(range.id));
            }
        }
        self.file_url = url;
        self.feedback.clear_field(FieldId::SplitSource);
        self.feedback.error = None;
        self.result = None;
    }

    fn push_range(&mut self) {
        let start = self
            .ranges
            .last()
            .map(|r| r.end.saturating_add(1))
            .unwrap_or(1);
        let output_url = if self.file_url.is_empty() {
            String::new()
        } else {
            generate_split_url(&self.file_url, self.ranges.len() + 1)
        };
        let id = RowId(self.next_row);
        self.next_row += 1;
        self.ranges.push(PageRangeRow {
            id,
            start,
            end: start.saturating_add(1),
            output_url,
        });
    }

    fn row_mut(&mut self, row: RowId) -> Option<&mut PageRangeRow> {
        self.ranges.iter_mut().find(|r| r.id == row)
    }
}

/// Input filter for page number fields: positive integers only.
///
/// Anything else is dropped before it reaches the form and is never reported
/// as a validation error.
pub fn parse_page_number(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|page| *page > 0)
}

/// Destination suggested for part `part` (1-based) of `source`:
/// `<dir>/<stem>_part_<part>.pdf`
pub fn generate_split_url(source: &str, part: usize) -> String {
    let (dir, last) = match source.rfind('/') {
        Some(pos) => (&source[..pos], &source[pos + 1..]),
        None => ("", source),
    };
    let stem = last.split('.').next().filter(|s| !s.is_empty()).unwrap_or("file");
    format!("{}/{}_part_{}.pdf", dir, stem, part)
}

/// Check every split rule and report all violations together
pub fn validate_split(file_url: &str, ranges: &[PageRangeRow]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if file_url.is_empty() {
        errors.push(ValidationError::new(FieldId::SplitSource, "File URL is required"));
    } else if !is_valid_pdf_url(file_url) {
        errors.push(ValidationError::new(
            FieldId::SplitSource,
            "Invalid PDF URL for file. URL must end with .pdf",
        ));
    }

    for (index, range) in ranges.iter().enumerate() {
        let n = index + 1;
        if range.start > range.end {
            errors.push(ValidationError::new(
                FieldId::PageRange(range.id),
                format!(
                    "Invalid page range: {}-{}. Start page must be less than or equal to end page.",
                    range.start, range.end
                ),
            ));
        }

        let output = FieldId::SplitOutput(range.id);
        if range.output_url.is_empty() {
            errors.push(ValidationError::new(
                output,
                format!("Output URL is required for range {}", n),
            ));
        } else if !is_valid_pdf_url(&range.output_url) {
            errors.push(ValidationError::new(
                output,
                format!("Invalid PDF URL for range {}. URL must end with .pdf", n),
            ));
        }
    }

    errors
}

impl Form for SplitForm {
    type Event = SplitEvent;
    type Request = SplitRequest;
    type Response = SplitResponse;

    fn apply(self, event: SplitEvent) -> Step<Self, SplitRequest> {
        self.update(event)
    }

    fn submit_event() -> SplitEvent {
        SplitEvent::Submit
    }

    fn completed_event(outcome: crate::error::Result<SplitResponse>) -> SplitEvent {
        SplitEvent::Completed(outcome)
    }

    fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    fn feedback_mut(&mut self) -> &mut Feedback {
        &mut self.feedback
    }

    fn result(&self) -> Option<&SplitResponse> {
        self.result.as_ref()
    }
}
