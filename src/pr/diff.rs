use super::types::LineRecord;

const NO_NEWLINE_MARKER: char = '\\';

/// Ranges announced by a hunk header: `@@ -{old_start},{old_count} +{new_start},{new_count} @@`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkRange {
    new_start: u64,
    old_count: u64,
    new_count: u64,
}

/// Shape of a single patch line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    HunkHeader(HunkRange),
    NoNewline,
    FileHeader,
    Added,
    Removed,
    Context,
    Malformed,
}

/// Running position inside the post-change file while walking a patch.
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    line_number: u64,
    old_remaining: u64,
    new_remaining: u64,
}

impl Cursor {
    fn in_hunk(&self) -> bool {
        self.old_remaining > 0 || self.new_remaining > 0
    }
}

/// Parse one file's patch into the lines it adds to the post-change file.
///
/// The input is the `patch` field GitHub returns per changed file: hunks only,
/// though full `git diff` output with `---`/`+++` file headers is accepted too.
///
/// Line numbers are seeded by each hunk header's `+{new_start}` and advance on
/// added and context lines. Removed lines, the `\ No newline at end of file`
/// marker and file headers leave the counter alone. Unrecognized lines never
/// abort parsing.
///
/// A missing patch (binary file, or one too large to inline) yields no lines.
pub fn parse_patch(patch: Option<&str>) -> Vec<LineRecord> {
    let Some(patch) = patch else {
        return Vec::new();
    };

    let (_, records) = patch.lines().enumerate().fold(
        (Cursor::default(), Vec::new()),
        |(mut cursor, mut records), (position, line)| {
            match classify(line, &cursor) {
                LineKind::HunkHeader(range) => {
                    cursor = Cursor {
                        line_number: range.new_start,
                        old_remaining: range.old_count,
                        new_remaining: range.new_count,
                    };
                }
                LineKind::Added => {
                    records.push(LineRecord {
                        content: line.to_string(),
                        number: cursor.line_number,
                        position,
                    });
                    cursor.line_number = cursor.line_number.saturating_add(1);
                    cursor.new_remaining = cursor.new_remaining.saturating_sub(1);
                }
                LineKind::Removed => {
                    cursor.old_remaining = cursor.old_remaining.saturating_sub(1);
                }
                LineKind::Context => {
                    cursor.line_number = cursor.line_number.saturating_add(1);
                    cursor.old_remaining = cursor.old_remaining.saturating_sub(1);
                    cursor.new_remaining = cursor.new_remaining.saturating_sub(1);
                }
                LineKind::NoNewline | LineKind::FileHeader | LineKind::Malformed => {}
            }
            (cursor, records)
        },
    );

    records
}

fn classify(line: &str, cursor: &Cursor) -> LineKind {
    if line.starts_with("@@") {
        return match parse_hunk_header(line) {
            Some(range) => LineKind::HunkHeader(range),
            None => LineKind::Malformed,
        };
    }
    if line.starts_with(NO_NEWLINE_MARKER) {
        return LineKind::NoNewline;
    }
    // `---`/`+++` only name files between hunks; inside a hunk body they are
    // ordinary removals/additions of lines starting with `--`/`++`.
    if !cursor.in_hunk() && (line.starts_with("+++") || line.starts_with("---")) {
        return LineKind::FileHeader;
    }
    if line.starts_with('+') {
        LineKind::Added
    } else if line.starts_with('-') {
        LineKind::Removed
    } else {
        LineKind::Context
    }
}

fn parse_hunk_header(line: &str) -> Option<HunkRange> {
    let header = line.strip_prefix("@@")?;
    let (ranges, _section) = header.split_once("@@")?;
    let mut parts = ranges.split_whitespace();
    let old_part = parts.next()?;
    let new_part = parts.next()?;

    let (_, old_count) = parse_range(old_part, '-')?;
    let (new_start, new_count) = parse_range(new_part, '+')?;

    Some(HunkRange {
        new_start,
        old_count,
        new_count,
    })
}

fn parse_range(part: &str, prefix: char) -> Option<(u64, u64)> {
    let range = part.strip_prefix(prefix)?;
    let (start_str, count_str) = match range.split_once(',') {
        Some((start, count)) => (start, count),
        None => (range, "1"),
    };
    let start = start_str.parse::<u64>().ok()?;
    let count = count_str.parse::<u64>().ok()?;
    Some((start, count))
}
