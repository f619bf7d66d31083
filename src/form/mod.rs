//! Form state for the merge, split and conversion flows
//!
//! Each flow owns a serializable state struct. Every user action is an event,
//! and `update(state, event)` returns the next state plus, at most, one request
//! to dispatch. Nothing here performs I/O; the caller sends the request and
//! feeds the outcome back as a completion event.
//!
//! Two correctness layers are kept apart:
//! - input filters (e.g. page numbers) silently refuse bad keystrokes and never
//!   produce an error;
//! - validators run on submit and report every violated rule at once.

pub mod conversion;
pub mod formats;
pub mod merge;
pub mod split;
pub mod url;

pub use conversion::{ConversionEvent, ConversionForm};
pub use formats::{available_targets, infer_format, is_supported_source, FORMAT_COMPATIBILITY};
pub use merge::{MergeEvent, MergeForm, MergeRow};
pub use split::{PageRangeRow, SplitEvent, SplitForm};

use serde::{Deserialize, Serialize};

/// Stable identifier of a dynamic form row.
///
/// Validation errors reference rows by id, so removing or inserting rows
/// never re-targets an existing error at a different input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

/// Input a validation error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "row", rename_all = "snake_case")]
pub enum FieldId {
    /// One merge source row
    MergeInput(RowId),
    /// Merge destination
    MergedFile,
    /// Split source
    SplitSource,
    /// Start/end pair of one split row
    PageRange(RowId),
    /// Destination URL of one split row
    SplitOutput(RowId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(flatten)]
    pub field: FieldId,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: FieldId, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Submission feedback shared by every form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Set while a submission is outstanding; gates further submissions
    pub in_flight: bool,
    /// Top-level error: a failed precondition or a failed remote call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-field errors from the last validation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<ValidationError>,
}

impl Feedback {
    /// Message attached to `field`, if any
    pub fn field_error(&self, field: FieldId) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Drop errors for a field the user just edited
    pub fn clear_field(&mut self, field: FieldId) {
        self.field_errors.retain(|e| e.field != field);
    }

    /// Replace the top-level error
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Mark a submission as dispatched. Returns `false` when one is already
    /// outstanding.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.error = None;
        true
    }

    /// Clear the busy flag. Runs on every completion, successful or not.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }
}

/// Common surface of the three flow forms, used by callers that drive a
/// submission end to end without knowing which flow they hold.
pub trait Form: Clone + Default {
    type Event;
    type Request;
    type Response;

    fn apply(self, event: Self::Event) -> Step<Self, Self::Request>;
    fn submit_event() -> Self::Event;
    fn completed_event(outcome: crate::error::Result<Self::Response>) -> Self::Event;
    fn feedback(&self) -> &Feedback;
    fn feedback_mut(&mut self) -> &mut Feedback;
    fn result(&self) -> Option<&Self::Response>;
}

/// Result of one state transition
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S, R> {
    pub state: S,
    /// Request to send, when the event was an accepted submission
    pub dispatch: Option<R>,
}

impl<S, R> Step<S, R> {
    pub fn stay(state: S) -> Self {
        Self {
            state,
            dispatch: None,
        }
    }

    pub fn send(state: S, request: R) -> Self {
        Self {
            state,
            dispatch: Some(request),
        }
    }
}
