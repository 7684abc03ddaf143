use serde::Serialize;

/// A pull request and one of the row ranges more than one of its commits touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnomalyLink {
    pub pull_request_link: String,
    /// Link to the rows at one of the offending commits, e.g. `.../app.rb#L10,11`
    pub line_url: String,
}

/// Per pull request summary of what was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestFindings {
    pub number: u64,
    pub link: String,
    /// Groups with known rows
    pub row_groups: usize,
    /// Files changed by several commits without a parseable patch (binary or oversized)
    pub file_level_files: Vec<String>,
}

/// Complete result of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Repository in `owner/repo` form
    pub repository: String,
    /// Browser link to the repository
    pub repository_url: String,
    /// Pull requests the scan processed
    pub pull_requests_scanned: usize,
    /// Only pull requests with at least one anomaly group
    pub pull_requests: Vec<PullRequestFindings>,
    /// One entry per offending commit x row range, across all pull requests
    pub anomalies: Vec<AnomalyLink>,
}

impl Report {
    /// True when the scan completed and no pull request had rows (or files)
    /// touched by more than one commit.
    pub fn is_clean(&self) -> bool {
        self.pull_requests.is_empty()
    }

    /// Row links belonging to one pull request.
    pub fn links_for<'a>(&'a self, pull_request_link: &'a str) -> impl Iterator<Item = &'a AnomalyLink> + 'a {
        self.anomalies
            .iter()
            .filter(move |a| a.pull_request_link == pull_request_link)
    }
}
