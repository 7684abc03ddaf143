use crate::pr::{LineRecord, PullRequestRef};

/// One file changed by one commit of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchRecord {
    /// Link to the owning pull request
    pub pr_link: String,
    /// Commit that produced this file change
    pub commit_id: String,
    /// Path of the changed file
    pub filename: String,
    /// Link to the file at this commit
    pub file_link: String,
    /// Lines the commit added; empty for binary or oversized diffs
    pub changed_lines: Vec<LineRecord>,
}

impl TouchRecord {
    /// Post-change line numbers this record touched, ascending and de-duplicated.
    pub fn touched_rows(&self) -> Vec<u64> {
        let mut rows: Vec<u64> = self.changed_lines.iter().map(|l| l.number).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    pub fn key(&self) -> TouchKey {
        TouchKey {
            filename: self.filename.clone(),
            rows: self.touched_rows(),
        }
    }
}

/// Grouping key for touch records: a file plus the exact set of rows touched.
/// `rows` is empty when the file had no parseable patch, so the key is the
/// filename alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TouchKey {
    pub filename: String,
    pub rows: Vec<u64>,
}

impl TouchKey {
    pub fn is_file_level(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Touch records of one pull request sharing the same key, at least two of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyGroup {
    members: Vec<TouchRecord>,
}

impl AnomalyGroup {
    /// Returns None unless there are at least two members.
    pub fn new(members: Vec<TouchRecord>) -> Option<Self> {
        (members.len() > 1).then_some(Self { members })
    }

    pub fn members(&self) -> &[TouchRecord] {
        &self.members
    }

    pub fn key(&self) -> TouchKey {
        self.members[0].key()
    }
}

/// Settings for one scan of a repository's pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// Pull requests requested per listing page
    pub per_page: u32,
    /// Upper bound on pull requests scanned
    pub total: u32,
}

/// Anomalies found in a single pull request.
#[derive(Debug, Clone)]
pub struct PullRequestAudit {
    pub pull_request: PullRequestRef,
    /// Number of commit x file records collected
    pub touches: usize,
    pub anomalies: Vec<AnomalyGroup>,
}

/// Result of a full scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub pull_requests_scanned: usize,
    pub audits: Vec<PullRequestAudit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(numbers: &[u64]) -> TouchRecord {
        TouchRecord {
            pr_link: "https://github.com/o/r/pull/1".to_string(),
            commit_id: "abc".to_string(),
            filename: "foo.rb".to_string(),
            file_link: "https://github.com/o/r/blob/abc/foo.rb".to_string(),
            changed_lines: numbers
                .iter()
                .enumerate()
                .map(|(position, &number)| LineRecord {
                    content: "+x".to_string(),
                    number,
                    position,
                })
                .collect(),
        }
    }

    #[test]
    fn test_touched_rows_sorted_and_unique() {
        assert_eq!(touch(&[6, 5, 5]).touched_rows(), vec![5, 6]);
        assert!(touch(&[]).touched_rows().is_empty());
    }

    #[test]
    fn test_key_ignores_order_and_duplicates() {
        assert_eq!(touch(&[5, 6]).key(), touch(&[6, 5, 6]).key());
        assert_ne!(touch(&[5]).key(), touch(&[5, 6]).key());
        assert!(touch(&[]).key().is_file_level());
    }

    #[test]
    fn test_group_requires_two_members() {
        assert!(AnomalyGroup::new(vec![]).is_none());
        assert!(AnomalyGroup::new(vec![touch(&[1])]).is_none());
        let group = AnomalyGroup::new(vec![touch(&[1]), touch(&[1])]).unwrap();
        assert_eq!(group.members().len(), 2);
        assert_eq!(group.key().rows, vec![1]);
    }
}
