use std::collections::HashMap;

use super::types::{AnomalyGroup, TouchKey, TouchRecord};

/// Group one pull request's touch records by file and touched rows, keeping
/// only the groups that more than one commit contributed to.
///
/// Groups come out in the order their key was first seen and members keep
/// their collection order.
pub fn find_anomalies(touches: &[TouchRecord]) -> Vec<AnomalyGroup> {
    let mut index: HashMap<TouchKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<TouchRecord>> = Vec::new();

    for touch in touches {
        let slot = *index.entry(touch.key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(touch.clone());
    }

    groups.into_iter().filter_map(AnomalyGroup::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::LineRecord;

    fn touch(commit: &str, filename: &str, numbers: &[u64]) -> TouchRecord {
        TouchRecord {
            pr_link: "https://github.com/o/r/pull/42".to_string(),
            commit_id: commit.to_string(),
            filename: filename.to_string(),
            file_link: format!("https://github.com/o/r/blob/{}/{}", commit, filename),
            changed_lines: numbers
                .iter()
                .enumerate()
                .map(|(position, &number)| LineRecord {
                    content: "+line".to_string(),
                    number,
                    position,
                })
                .collect(),
        }
    }

    #[test]
    fn test_same_rows_in_any_order_collapse() {
        let touches = vec![
            touch("a", "foo.rb", &[5, 6]),
            touch("b", "foo.rb", &[6, 5, 5]),
        ];
        let groups = find_anomalies(&touches);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members().len(), 2);
        assert_eq!(groups[0].key().rows, vec![5, 6]);
    }

    #[test]
    fn test_single_touches_are_dropped() {
        let touches = vec![
            touch("a", "foo.rb", &[1]),
            touch("b", "foo.rb", &[2]),
            touch("c", "bar.rb", &[1]),
        ];
        assert!(find_anomalies(&touches).is_empty());
    }

    #[test]
    fn test_file_level_group_for_missing_patches() {
        let touches = vec![
            touch("a", "logo.png", &[]),
            touch("b", "logo.png", &[]),
            touch("b", "app.rb", &[3]),
        ];
        let groups = find_anomalies(&touches);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].key().is_file_level());
        assert_eq!(groups[0].key().filename, "logo.png");
    }

    #[test]
    fn test_filename_delimiters_do_not_collide() {
        // "a#L1" with no rows must not meet "a" touching row 1
        let touches = vec![touch("x", "a#L1", &[]), touch("y", "a", &[1])];
        assert!(find_anomalies(&touches).is_empty());
    }

    #[test]
    fn test_grouping_is_stable() {
        let touches = vec![
            touch("a", "z.rb", &[1]),
            touch("a", "y.rb", &[2]),
            touch("b", "y.rb", &[2]),
            touch("c", "z.rb", &[1]),
            touch("d", "y.rb", &[2]),
        ];
        let groups = find_anomalies(&touches);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key().filename, "z.rb");
        let commits: Vec<&str> = groups[1]
            .members()
            .iter()
            .map(|t| t.commit_id.as_str())
            .collect();
        assert_eq!(commits, vec!["a", "b", "d"]);
    }
}
