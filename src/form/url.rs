//! URL shape checks used by every form and by artifact links
//!
//! None of these functions fail: malformed input is simply `false`.

use url::Url;

/// Suffix every merge and split URL must carry
pub const PDF_SUFFIX: &str = ".pdf";

/// Whether `input` parses as an absolute URL
pub fn is_valid_url(input: &str) -> bool {
    Url::parse(input).is_ok()
}

/// Whether `input` is an absolute URL whose path ends with `suffix`,
/// compared case-insensitively. Query and fragment are ignored.
pub fn has_required_suffix(input: &str, suffix: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => url
            .path()
            .to_ascii_lowercase()
            .ends_with(&suffix.to_ascii_lowercase()),
        Err(_) => false,
    }
}

pub fn is_valid_pdf_url(input: &str) -> bool {
    has_required_suffix(input, PDF_SUFFIX)
}

/// Last path segment of a URL-ish string, as shown next to a link
pub fn display_name(input: &str) -> &str {
    input.rsplit('/').next().unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://files.example.com/a.pdf", true)]
    #[case("http://localhost:8080/x", true)]
    #[case("ftp://host/file.txt", true)]
    #[case("a.pdf", false)]
    #[case("", false)]
    #[case("   ", false)]
    #[case("//host/a.pdf", false)]
    #[case("http://", false)]
    fn test_is_valid_url(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_url(input), expected);
    }

    #[rstest]
    #[case("https://files.example.com/a.pdf", true)]
    #[case("https://files.example.com/A.PDF", true)]
    #[case("https://files.example.com/a.pdf?download=1", true)]
    #[case("https://files.example.com/a.pdf#page=2", true)]
    #[case("https://files.example.com/a.png", false)]
    #[case("https://files.example.com/?name=a.pdf", false)]
    #[case("https://files.example.com/a.pdf/", false)]
    #[case("a.pdf", false)]
    #[case("not a url.pdf", false)]
    fn test_is_valid_pdf_url(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_pdf_url(input), expected);
    }

    #[test]
    fn test_suffix_is_case_insensitive_both_ways() {
        assert!(has_required_suffix("https://h/x.WEBP", ".webp"));
        assert!(has_required_suffix("https://h/x.webp", ".WEBP"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("https://h/dir/report.pdf"), "report.pdf");
        assert_eq!(display_name("report.pdf"), "report.pdf");
        assert_eq!(display_name("https://h/dir/"), "");
    }
}
