//! Wire types exchanged with the remote file API

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Merge
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MergeRequest {
    /// Source file URLs, merged in this order
    pub files: Vec<String>,
    /// Destination URL for the merged file
    pub merged_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MergeResponse {
    pub files: Vec<String>,
    pub merged_file: String,
}

// ============================================================================
// Split
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SplitRequest {
    /// Source PDF URL
    pub file_name: String,
    /// Inclusive `[start, end]` page ranges, one per output file
    pub page_ranges: Vec<(u32, u32)>,
    /// Destination URL for each range, same order as `page_ranges`
    pub split_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SplitResponse {
    pub id: u64,
    pub file_name: String,
    pub page_ranges: Vec<(u32, u32)>,
    pub split_files: Vec<String>,
}

// ============================================================================
// Conversion
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConversionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(
        default,
        rename = "preserveMetadata",
        skip_serializing_if = "Option::is_none"
    )]
    pub preserve_metadata: Option<bool>,
}

impl ConversionOptions {
    pub fn is_empty(&self) -> bool {
        self.quality.is_none() && self.preserve_metadata.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConversionRequest {
    pub file_type: String,
    pub file_url: String,
    pub target_type: String,
    pub output_file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ConversionOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConversionResponse {
    pub file_type: String,
    pub file_url: String,
    pub output_file_url: String,
    pub target_type: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Error body used by the remote API and by the local passthrough
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_request_wire_shape() {
        let request = MergeRequest {
            files: vec!["https://a.io/a.pdf".into(), "https://a.io/b.pdf".into()],
            merged_file: "https://a.io/c.pdf".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "files": ["https://a.io/a.pdf", "https://a.io/b.pdf"],
                "merged_file": "https://a.io/c.pdf"
            })
        );
    }

    #[test]
    fn test_split_request_ranges_are_pairs() {
        let request = SplitRequest {
            file_name: "https://a.io/doc.pdf".into(),
            page_ranges: vec![(1, 2), (3, 4)],
            split_files: vec!["https://a.io/1.pdf".into(), "https://a.io/2.pdf".into()],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["page_ranges"], serde_json::json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn test_split_response_deserialization() {
        let json = r#"{
            "id": 12,
            "file_name": "https://a.io/doc.pdf",
            "page_ranges": [[1, 3]],
            "split_files": ["https://a.io/doc_part_1.pdf"]
        }"#;
        let response: SplitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id, 12);
        assert_eq!(response.page_ranges, vec![(1, 3)]);
    }

    #[test]
    fn test_conversion_options_omitted_when_absent() {
        let request = ConversionRequest {
            file_type: "pdf".into(),
            file_url: "https://a.io/doc.pdf".into(),
            target_type: "png".into(),
            output_file_url: "https://a.io/doc.png".into(),
            options: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("options").is_none());
    }

    #[test]
    fn test_conversion_options_camel_case() {
        let options = ConversionOptions {
            quality: Some(80),
            preserve_metadata: Some(true),
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            serde_json::json!({"quality": 80, "preserveMetadata": true})
        );
        assert!(!options.is_empty());
        assert!(ConversionOptions::default().is_empty());
    }

    #[test]
    fn test_error_body_tolerates_missing_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "x"}"#).unwrap();
        assert_eq!(body.message, None);
        let body: ErrorBody = serde_json::from_str(r#"{"message": "bad"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("bad"));
    }
}
