use tracing::{debug, instrument, warn};

use super::types::TouchRecord;
use crate::pr::diff::parse_patch;
use crate::pr::{CommitFile, PullRequestRef};
use crate::source::ChangeSource;

/// Files changed by one commit. A failed fetch is logged and yields no files.
pub async fn commit_files(source: &dyn ChangeSource, sha: &str) -> Vec<CommitFile> {
    match source.commit_files(sha).await {
        Ok(files) => files,
        Err(e) => {
            warn!(commit = %sha, error = %e, "failed to fetch commit, skipping its files");
            Vec::new()
        }
    }
}

/// Collect one touch record per commit x file of a pull request, in the
/// order commits and files are listed.
#[instrument(skip(source, pr), fields(pr = pr.number))]
pub async fn collect_touches(source: &dyn ChangeSource, pr: &PullRequestRef) -> Vec<TouchRecord> {
    let commits = match source.list_commits(pr.number).await {
        Ok(commits) => commits,
        Err(e) => {
            warn!(error = %e, "failed to list pull request commits, skipping pull request");
            return Vec::new();
        }
    };

    let mut touches = Vec::new();
    for commit in &commits {
        for file in commit_files(source, &commit.sha).await {
            let changed_lines = parse_patch(file.patch.as_deref());
            touches.push(TouchRecord {
                pr_link: pr.html_url.clone(),
                commit_id: commit.sha.clone(),
                filename: file.filename,
                file_link: file.blob_url,
                changed_lines,
            });
        }
    }
    debug!(commits = commits.len(), touches = touches.len(), "collected touches");
    touches
}
