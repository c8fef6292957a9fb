//! Project URL classification.
//!
//! A run can start from either a GitHub repository URL or a Summer of
//! Making project page. Anything else is rejected locally before any
//! request reaches the gateway.

use crate::error::AnalysisError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static GITHUB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)/?$").unwrap()
});

static SOM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://summer\.hackclub\.com/projects/([0-9]+)/?$").unwrap());

/// Shown for input that is neither a GitHub repo nor a SoM project.
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid GitHub repository URL \
     (https://github.com/owner/repo) or Summer of Making project URL \
     (https://summer.hackclub.com/projects/123)";

/// Coarse classification of raw user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    GitHub,
    Som,
    Invalid,
}

/// Classify a string without building a [`SourceUrl`].
pub fn classify(input: &str) -> UrlKind {
    let input = input.trim();
    if GITHUB_REGEX.is_match(input) {
        UrlKind::GitHub
    } else if SOM_REGEX
        .captures(input)
        .is_some_and(|caps| caps[1].parse::<u64>().is_ok())
    {
        UrlKind::Som
    } else {
        UrlKind::Invalid
    }
}

/// User-facing validation message for the given input.
///
/// Empty input is "no error yet" and returns `None`, same as a valid URL.
pub fn validation_message(input: &str) -> Option<&'static str> {
    if input.trim().is_empty() {
        return None;
    }
    match classify(input) {
        UrlKind::Invalid => Some(INVALID_URL_MESSAGE),
        _ => None,
    }
}

/// A validated analysis source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUrl {
    /// `https://github.com/<owner>/<repo>`
    GitHub {
        url: String,
        owner: String,
        repo: String,
    },
    /// `https://summer.hackclub.com/projects/<id>`
    Som { url: String, project_id: u64 },
}

impl SourceUrl {
    /// The URL exactly as it is sent to the gateway.
    pub fn as_str(&self) -> &str {
        match self {
            SourceUrl::GitHub { url, .. } | SourceUrl::Som { url, .. } => url,
        }
    }

    pub fn is_som(&self) -> bool {
        matches!(self, SourceUrl::Som { .. })
    }
}

impl FromStr for SourceUrl {
    type Err = AnalysisError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        // Strip the trailing slash so the gateway always sees the canonical form.
        let url = trimmed.trim_end_matches('/').to_string();

        if let Some(caps) = GITHUB_REGEX.captures(trimmed) {
            return Ok(SourceUrl::GitHub {
                owner: caps[1].to_string(),
                repo: caps[2].to_string(),
                url,
            });
        }

        if let Some(caps) = SOM_REGEX.captures(trimmed) {
            if let Ok(project_id) = caps[1].parse::<u64>() {
                return Ok(SourceUrl::Som { url, project_id });
            }
        }

        let reason = if trimmed.is_empty() {
            "no URL given".to_string()
        } else {
            INVALID_URL_MESSAGE.to_string()
        };
        Err(AnalysisError::InvalidUrl {
            input: input.to_string(),
            reason,
        })
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
