use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::{ChangeSource, SourceError};
use crate::pr::{CommitFile, CommitRef, PullRequestRef};

/// In-memory change source for `--mock` runs and tests.
///
/// Pull requests are served in insertion order and paged the same way the
/// GitHub listing is. Individual pages, pull requests or commits can be
/// marked as failing.
#[derive(Debug, Default)]
pub struct FixtureSource {
    pulls: Vec<PullRequestRef>,
    commits: HashMap<u64, Vec<CommitRef>>,
    files: HashMap<String, Vec<CommitFile>>,
    failing_pages: HashSet<u32>,
    failing_pulls: HashSet<u64>,
    failing_commits: HashSet<String>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pull request made of `commits`, each given as a sha and the files it changed.
    pub fn with_pull_request(
        mut self,
        number: u64,
        html_url: &str,
        commits: Vec<(&str, Vec<CommitFile>)>,
    ) -> Self {
        self.pulls.push(PullRequestRef {
            number,
            html_url: html_url.to_string(),
        });
        let refs = commits
            .into_iter()
            .map(|(sha, files)| {
                self.files.insert(sha.to_string(), files);
                CommitRef {
                    sha: sha.to_string(),
                }
            })
            .collect();
        self.commits.insert(number, refs);
        self
    }

    #[cfg(test)]
    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    #[cfg(test)]
    pub fn failing_pull_request(mut self, number: u64) -> Self {
        self.failing_pulls.insert(number);
        self
    }

    #[cfg(test)]
    pub fn failing_commit(mut self, sha: &str) -> Self {
        self.failing_commits.insert(sha.to_string());
        self
    }
}

#[async_trait]
impl ChangeSource for FixtureSource {
    async fn list_pull_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestRef>, SourceError> {
        if self.failing_pages.contains(&page) {
            return Err(SourceError::Unavailable(format!("pull request page {}", page)));
        }
        let per_page = per_page.max(1) as usize;
        let start = (page.max(1) as usize - 1) * per_page;
        Ok(self
            .pulls
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn list_commits(&self, pr_number: u64) -> Result<Vec<CommitRef>, SourceError> {
        if self.failing_pulls.contains(&pr_number) {
            return Err(SourceError::Unavailable(format!(
                "commits of pull request #{}",
                pr_number
            )));
        }
        Ok(self.commits.get(&pr_number).cloned().unwrap_or_default())
    }

    async fn commit_files(&self, sha: &str) -> Result<Vec<CommitFile>, SourceError> {
        if self.failing_commits.contains(sha) {
            return Err(SourceError::Unavailable(format!("commit {}", sha)));
        }
        Ok(self.files.get(sha).cloned().unwrap_or_default())
    }
}
