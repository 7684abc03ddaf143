pub mod fixture;
pub mod github;

pub use fixture::FixtureSource;
pub use github::GitHubSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::pr::{CommitFile, CommitRef, PullRequestRef};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Where pull requests, their commits and per-commit file changes come from.
///
/// Every call is a single blocking point in the scan. Callers decide what a
/// failure means; the audit engine logs it and carries on with no data.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// One page of pull requests, 1-based.
    async fn list_pull_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestRef>, SourceError>;

    /// Commits of a pull request, oldest first.
    async fn list_commits(&self, pr_number: u64) -> Result<Vec<CommitRef>, SourceError>;

    /// Files changed by a single commit, with their patches.
    async fn commit_files(&self, sha: &str) -> Result<Vec<CommitFile>, SourceError>;
}
