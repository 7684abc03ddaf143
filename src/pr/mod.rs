pub mod diff;
pub mod types;

pub use types::{CommitFile, CommitRef, LineRecord, PullRequestRef};

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("Invalid repository (expected owner/repo or https://github.com/owner/repo): {0}")]
    InvalidRepo(String),
}

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    /// Browser link to the repository.
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parse a repository reference.
///
/// Accepts `owner/repo` or a github.com URL whose first two path segments
/// are the owner and repository (e.g. `https://github.com/rails/rails/pulls`).
pub fn parse_repo(input: &str) -> Result<RepoId, PrError> {
    let invalid = || PrError::InvalidRepo(input.to_string());
    let input = input.trim();

    let segments: Vec<String> = if input.contains("://") {
        let parsed = reqwest::Url::parse(input).map_err(|_| invalid())?;
        if parsed.host_str() != Some("github.com") {
            return Err(invalid());
        }
        parsed
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|segment| !segment.is_empty())
            .take(2)
            .map(str::to_string)
            .collect()
    } else {
        let parts: Vec<String> = input.split('/').map(str::to_string).collect();
        if parts.len() != 2 {
            return Err(invalid());
        }
        parts
    };

    match segments.as_slice() {
        [owner, repo] if is_valid_name(owner) && is_valid_name(repo) => Ok(RepoId {
            owner: owner.clone(),
            repo: repo.trim_end_matches(".git").to_string(),
        }),
        _ => Err(invalid()),
    }
}

fn is_valid_name(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_slash_repo() {
        let repo = parse_repo("rails/rails").unwrap();
        assert_eq!(repo.owner, "rails");
        assert_eq!(repo.repo, "rails");
        assert_eq!(repo.to_string(), "rails/rails");
        assert_eq!(repo.html_url(), "https://github.com/rails/rails");
    }

    #[test]
    fn test_parse_repo_url() {
        let repo = parse_repo("https://github.com/rust-lang/cargo/pulls").unwrap();
        assert_eq!(repo.owner, "rust-lang");
        assert_eq!(repo.repo, "cargo");

        let repo = parse_repo("https://github.com/org/tool.git").unwrap();
        assert_eq!(repo.repo, "tool");
    }

    #[test]
    fn test_parse_invalid_repo() {
        assert!(parse_repo("").is_err());
        assert!(parse_repo("rails").is_err());
        assert!(parse_repo("a/b/c").is_err());
        assert!(parse_repo("https://example.com/org/repo").is_err());
        assert!(parse_repo("https://github.com/org").is_err());
        assert!(parse_repo("org/re po").is_err());
    }
}
