use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ChangeSource, SourceError};
use crate::pr::{CommitFile, CommitRef, PullRequestRef, RepoId};

/// GitHub caps `per_page` at 100 on every listing endpoint.
pub const MAX_PER_PAGE: u32 = 100;

/// The commit detail endpoint returns changed files 300 at a time.
const COMMIT_FILES_PER_PAGE: usize = 300;

const USER_AGENT: &str = "pr-row-audit";

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Deserialize)]
struct CommitDetailResponse {
    #[serde(default)]
    files: Vec<FileResponse>,
}

#[derive(Deserialize)]
struct FileResponse {
    filename: String,
    blob_url: String,
    patch: Option<String>,
}

/// Reads pull requests and commits from the GitHub REST API.
pub struct GitHubSource {
    http: reqwest::Client,
    api_url: String,
    repo: RepoId,
    state: String,
    token: Option<String>,
}

impl GitHubSource {
    /// Build a source for `repo`. Without a token requests are anonymous and
    /// subject to GitHub's much lower unauthenticated rate limit.
    pub fn new(
        repo: RepoId,
        api_url: &str,
        state: &str,
        token: Option<String>,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo,
            state: state.to_string(),
            token,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.repo.owner, self.repo.repo, path
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// A page holding exactly `page_size` entries may be followed by another.
fn is_full_page(len: usize, page_size: usize) -> bool {
    len >= page_size
}

#[async_trait]
impl ChangeSource for GitHubSource {
    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn list_pull_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestRef>, SourceError> {
        let url = self.repo_url("pulls");
        let pulls: Vec<PullResponse> = self
            .get_json(
                &url,
                &[
                    ("state", self.state.clone()),
                    ("page", page.to_string()),
                    ("per_page", per_page.min(MAX_PER_PAGE).to_string()),
                ],
            )
            .await?;
        debug!(count = pulls.len(), "received pull request page");

        Ok(pulls
            .into_iter()
            .map(|p| PullRequestRef {
                number: p.number,
                html_url: p.html_url,
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn list_commits(&self, pr_number: u64) -> Result<Vec<CommitRef>, SourceError> {
        let url = self.repo_url(&format!("pulls/{}/commits", pr_number));
        let mut commits = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<CommitResponse> = self
                .get_json(
                    &url,
                    &[
                        ("page", page.to_string()),
                        ("per_page", MAX_PER_PAGE.to_string()),
                    ],
                )
                .await?;
            let more = is_full_page(batch.len(), MAX_PER_PAGE as usize);
            commits.extend(batch.into_iter().map(|c| CommitRef { sha: c.sha }));
            if !more {
                break;
            }
            page += 1;
        }
        debug!(count = commits.len(), "received pull request commits");
        Ok(commits)
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn commit_files(&self, sha: &str) -> Result<Vec<CommitFile>, SourceError> {
        let url = self.repo_url(&format!("commits/{}", sha));
        let mut files = Vec::new();
        let mut page = 1u32;
        loop {
            let detail: CommitDetailResponse =
                self.get_json(&url, &[("page", page.to_string())]).await?;
            let more = is_full_page(detail.files.len(), COMMIT_FILES_PER_PAGE);
            files.extend(detail.files.into_iter().map(|f| CommitFile {
                filename: f.filename,
                blob_url: f.blob_url,
                patch: f.patch,
            }));
            if !more {
                break;
            }
            debug!(page, "commit has more files, fetching next page");
            page += 1;
        }
        debug!(files = files.len(), "received commit detail");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> GitHubSource {
        let repo = crate::pr::parse_repo("rails/rails").unwrap();
        GitHubSource::new(repo, "https://api.github.com/", "open", None).unwrap()
    }

    #[test]
    fn test_repo_url_strips_trailing_slash() {
        assert_eq!(
            source().repo_url("pulls/42/commits"),
            "https://api.github.com/repos/rails/rails/pulls/42/commits"
        );
    }

    #[test]
    fn test_commit_detail_without_patch() {
        let json = r#"{
            "sha": "abc",
            "files": [
                {"filename": "logo.png", "blob_url": "https://github.com/o/r/blob/abc/logo.png"},
                {"filename": "app.rb", "blob_url": "https://github.com/o/r/blob/abc/app.rb", "patch": "@@ -1,0 +1,1 @@\n+x"}
            ]
        }"#;
        let detail: CommitDetailResponse = serde_json::from_str(json).unwrap();
        assert_eq!(detail.files.len(), 2);
        assert!(detail.files[0].patch.is_none());
        assert_eq!(detail.files[1].patch.as_deref(), Some("@@ -1,0 +1,1 @@\n+x"));
    }

    #[test]
    fn test_full_commit_file_page_continues() {
        assert!(is_full_page(COMMIT_FILES_PER_PAGE, COMMIT_FILES_PER_PAGE));
        assert!(!is_full_page(COMMIT_FILES_PER_PAGE - 1, COMMIT_FILES_PER_PAGE));
        assert!(!is_full_page(0, COMMIT_FILES_PER_PAGE));
        assert!(is_full_page(100, MAX_PER_PAGE as usize));
    }

    #[test]
    fn test_commit_detail_without_files() {
        let detail: CommitDetailResponse = serde_json::from_str(r#"{"sha": "abc"}"#).unwrap();
        assert!(detail.files.is_empty());
    }
}
