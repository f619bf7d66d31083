//! Static format compatibility table

/// Source format tag and the target tags it may be converted to
pub const FORMAT_COMPATIBILITY: &[(&str, &[&str])] = &[
    ("pdf", &["png", "jpg"]),
    ("png", &["pdf", "jpg"]),
    ("jpg", &["pdf", "png"]),
    ("webp", &["pdf", "png", "jpg"]),
];

/// Targets offered for `source`; empty for unknown tags
pub fn available_targets(source: &str) -> &'static [&'static str] {
    FORMAT_COMPATIBILITY
        .iter()
        .find(|(tag, _)| *tag == source)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn is_supported_source(tag: &str) -> bool {
    FORMAT_COMPATIBILITY.iter().any(|(t, _)| *t == tag)
}

pub fn is_compatible(source: &str, target: &str) -> bool {
    available_targets(source).contains(&target)
}

/// Format tag derived from the text after the last `.` of `url`, lowercased.
/// `None` when that extension is not a known source format.
pub fn infer_format(url: &str) -> Option<&'static str> {
    let extension = url.rsplit('.').next()?.to_ascii_lowercase();
    FORMAT_COMPATIBILITY
        .iter()
        .map(|(tag, _)| *tag)
        .find(|tag| *tag == extension)
}
