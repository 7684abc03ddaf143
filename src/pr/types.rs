use serde::Serialize;

/// An added line discovered while walking a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    /// Raw patch line, including its leading `+`
    pub content: String,
    /// 1-based line number in the post-change file
    pub number: u64,
    /// 0-based index of the line inside the patch text
    pub position: usize,
}

/// A pull request as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// PR number (e.g., 42)
    pub number: u64,
    /// Browser link to the PR
    pub html_url: String,
}

/// A commit belonging to a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    pub sha: String,
}

/// One file changed by a commit.
/// `patch` is None for binary files and diffs too large for the API to inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFile {
    /// File path (e.g., "app/models/user.rb")
    pub filename: String,
    /// Link to the file at this commit, used as the base for row links
    pub blob_url: String,
    /// Raw unified diff hunks for this file
    pub patch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_record_serializes_fields() {
        let record = LineRecord {
            content: "+puts 1".to_string(),
            number: 10,
            position: 3,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["number"], 10);
        assert_eq!(json["position"], 3);
        assert_eq!(json["content"], "+puts 1");
    }
}
