//! Draft validation and normalization.
//!
//! # Responsibility
//! - Decide whether a draft may be admitted as a node.
//! - Convert an accepted draft into a `NormalizedNode`.
//!
//! # Invariants
//! - Every rule is evaluated; all violations are reported together.
//! - Validation is pure: the draft is never modified.
//! - Blank slots are pruned silently; they are never an error.

use crate::model::draft::Draft;
use crate::model::node::{Detail, NormalizedNode};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

// scheme://[userinfo@]host[:port][path]; the host must start and end alphanumeric.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:[^\s/?#@]*@)?[A-Za-z0-9](?:[A-Za-z0-9.\-]*[A-Za-z0-9])?(?::\d+)?(?:[/?#]\S*)?$",
    )
    .expect("valid url regex")
});
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// One rule violation found in a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationIssue {
    /// Title is blank after trim.
    MissingTitle,
    /// Tag input yields no token.
    MissingTags,
    /// Year input is present but not an integer.
    InvalidYear,
    /// Link slot at this position is not a plausible URL.
    InvalidLink(usize),
    /// Detail slot at this position has a key or a value, but not both.
    IncompleteDetail(usize),
    /// Color input is present but not `#RRGGBB`.
    InvalidColor,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "title is required"),
            Self::MissingTags => write!(f, "at least one tag is required"),
            Self::InvalidYear => write!(f, "year must be a whole number"),
            Self::InvalidLink(index) => {
                write!(f, "link #{} must be a URL with scheme and host", index + 1)
            }
            Self::IncompleteDetail(index) => {
                write!(f, "detail #{} needs both a key and a value", index + 1)
            }
            Self::InvalidColor => write!(f, "color must be a hex value like #1d4ed8"),
        }
    }
}

/// Non-empty set of issues reported by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn contains(&self, issue: ValidationIssue) -> bool {
        self.issues.contains(&issue)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Stable machine-readable codes, useful for logs (no user input).
    pub fn codes(&self) -> Vec<&'static str> {
        self.issues
            .iter()
            .map(|issue| match issue {
                ValidationIssue::MissingTitle => "missing_title",
                ValidationIssue::MissingTags => "missing_tags",
                ValidationIssue::InvalidYear => "invalid_year",
                ValidationIssue::InvalidLink(_) => "invalid_link",
                ValidationIssue::IncompleteDetail(_) => "incomplete_detail",
                ValidationIssue::InvalidColor => "invalid_color",
            })
            .collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Validates a draft and returns its normalized node payload.
///
/// # Errors
/// - Returns every violated rule at once when the draft is not admissible.
pub fn validate(draft: &Draft) -> Result<NormalizedNode, ValidationErrors> {
    let mut issues = Vec::new();

    let title = draft.title.trim();
    if title.is_empty() {
        issues.push(ValidationIssue::MissingTitle);
    }

    let tags = parse_tags(&draft.tags);
    if tags.is_empty() {
        issues.push(ValidationIssue::MissingTags);
    }

    let year = match parse_year(&draft.year) {
        Ok(year) => year,
        Err(issue) => {
            issues.push(issue);
            None
        }
    };

    let color = optional_text(&draft.color);
    if let Some(value) = color.as_deref() {
        if !HEX_COLOR_RE.is_match(value) {
            issues.push(ValidationIssue::InvalidColor);
        }
    }

    let mut links = Vec::new();
    for (index, slot) in draft.links().iter().enumerate() {
        let url = slot.url.trim();
        if url.is_empty() {
            continue;
        }
        if is_plausible_url(url) {
            links.push(url.to_string());
        } else {
            issues.push(ValidationIssue::InvalidLink(index));
        }
    }

    let mut details = Vec::new();
    for (index, slot) in draft.details().iter().enumerate() {
        let key = slot.key.trim();
        let value = slot.value.trim();
        match (key.is_empty(), value.is_empty()) {
            (true, true) => {}
            (false, false) => details.push(Detail::new(key, value)),
            _ => issues.push(ValidationIssue::IncompleteDetail(index)),
        }
    }

    if !issues.is_empty() {
        return Err(ValidationErrors { issues });
    }

    Ok(NormalizedNode {
        title: title.to_string(),
        author: optional_text(&draft.author),
        year,
        tags,
        links,
        details,
        abstract_text: optional_text(&draft.abstract_text),
        notes: optional_text(&draft.notes),
        color,
    })
}

/// Splits comma-separated tag input into trimmed, non-empty, unique tokens.
pub fn parse_tags(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns whether a value has a scheme and a host.
pub fn is_plausible_url(value: &str) -> bool {
    URL_RE.is_match(value)
}

fn parse_year(input: &str) -> Result<Option<i32>, ValidationIssue> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| ValidationIssue::InvalidYear)
}

fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{is_plausible_url, parse_tags, parse_year, ValidationIssue};

    #[test]
    fn url_requires_scheme_and_host() {
        assert!(is_plausible_url("https://example.com"));
        assert!(is_plausible_url("http://example.com/path?q=1#frag"));
        assert!(is_plausible_url("ftp://files.example.org"));
        assert!(!is_plausible_url("example.com"));
        assert!(!is_plausible_url("https://"));
        assert!(!is_plausible_url("https:// spaced.example"));
        assert!(!is_plausible_url("not a url"));
    }

    #[test]
    fn url_without_a_real_host_is_rejected() {
        for value in ["https://:8080", "https://@", "https://:", "https://..", "https://-/x"] {
            assert!(!is_plausible_url(value), "{value} should be rejected");
        }
        assert!(is_plausible_url("https://user@example.com:8443/path"));
        assert!(is_plausible_url("http://localhost:3000"));
        assert!(is_plausible_url("https://a.b"));
    }

    #[test]
    fn tags_are_trimmed_deduplicated_and_case_sensitive() {
        let tags = parse_tags(" AN1101, theory,,AN1101 , an1101 ");
        let collected: Vec<&str> = tags.iter().map(String::as_str).collect();
        assert_eq!(collected, vec!["AN1101", "an1101", "theory"]);
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn year_is_optional_but_never_coerced() {
        assert_eq!(parse_year("   "), Ok(None));
        assert_eq!(parse_year(" 1967 "), Ok(Some(1967)));
        assert_eq!(parse_year("nineteen"), Err(ValidationIssue::InvalidYear));
        assert_eq!(parse_year("19.5"), Err(ValidationIssue::InvalidYear));
    }
}
