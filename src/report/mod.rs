pub mod types;

pub use types::{AnomalyLink, PullRequestFindings, Report};

use crate::audit::{AnomalyGroup, ScanOutcome};
use crate::pr::RepoId;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Row links for every member of a group that has known rows, e.g.
/// `https://github.com/o/r/blob/abc/foo.rb#L5,6`. File-level members yield nothing.
pub fn anomaly_links(group: &AnomalyGroup) -> Vec<AnomalyLink> {
    group
        .members()
        .iter()
        .filter(|touch| !touch.changed_lines.is_empty())
        .map(|touch| {
            let rows: Vec<String> = touch.touched_rows().iter().map(u64::to_string).collect();
            AnomalyLink {
                pull_request_link: touch.pr_link.clone(),
                line_url: format!("{}#L{}", touch.file_link, rows.join(",")),
            }
        })
        .collect()
}

/// Flatten every pull request's anomaly groups into a Report.
pub fn build(repo: &RepoId, outcome: &ScanOutcome) -> Report {
    let mut pull_requests = Vec::new();
    let mut anomalies = Vec::new();

    for audit in outcome.audits.iter().filter(|a| !a.anomalies.is_empty()) {
        let (file_level, row_level): (Vec<&AnomalyGroup>, Vec<&AnomalyGroup>) = audit
            .anomalies
            .iter()
            .partition(|group| group.key().is_file_level());

        for group in &row_level {
            anomalies.extend(anomaly_links(group));
        }
        pull_requests.push(PullRequestFindings {
            number: audit.pull_request.number,
            link: audit.pull_request.html_url.clone(),
            row_groups: row_level.len(),
            file_level_files: file_level.iter().map(|g| g.key().filename).collect(),
        });
    }

    Report {
        repository: repo.to_string(),
        repository_url: repo.html_url(),
        pull_requests_scanned: outcome.pull_requests_scanned,
        pull_requests,
        anomalies,
    }
}

/// Output the report to terminal (default) or to a file.
/// A path ending in `.json` gets the full report as JSON, anything else markdown.
#[instrument(skip(report), fields(repo = %report.repository, anomalies = report.anomalies.len()))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
            debug!(path = %path.display(), "writing JSON report to file");
            write_json_report(report, path)
        }
        Some(path) => {
            debug!(path = %path.display(), "writing markdown report to file");
            write_markdown_report(report, path)
        }
    }
}

/// Repository: https://github.com/rails/rails
/// Pull requests processed: 100
///
/// ═══ PR #42 ═══ https://github.com/rails/rails/pull/42
///   • https://github.com/rails/rails/blob/abc/app.rb#L10
///   • logo.png (no patch, file level only)
///
/// ═══ Anomalous pull requests: 1 | Row links: 1 ═══
fn print_terminal_report(report: &Report) {
    println!();
    println!("Repository: {}", report.repository_url);
    println!("Pull requests processed: {}", report.pull_requests_scanned);
    println!();

    if report.is_clean() {
        println!(
            "{}",
            format!("There are no anomalous pull requests in {}", report.repository)
                .green()
                .bold()
        );
        println!();
        return;
    }

    for pr in &report.pull_requests {
        println!("═══ {} ═══ {}", format!("PR #{}", pr.number).red().bold(), pr.link);
        for link in report.links_for(&pr.link) {
            println!("  • {}", link.line_url);
        }
        for file in &pr.file_level_files {
            println!("  • {} {}", file, "(no patch, file level only)".yellow());
        }
        println!();
    }

    println!(
        "═══ Anomalous pull requests: {} | Row links: {} ═══",
        report.pull_requests.len().to_string().red().bold(),
        report.anomalies.len()
    );
    println!();
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str(&format!("# Row audit: {}\n\n", report.repository));
    md.push_str(&format!(
        "**Repository:** {} | **Pull requests processed:** {}\n\n",
        report.repository_url, report.pull_requests_scanned
    ));

    if report.is_clean() {
        md.push_str(&format!(
            "There are no anomalous pull requests in {}.\n",
            report.repository
        ));
    } else {
        for pr in &report.pull_requests {
            md.push_str(&format!("## [PR #{}]({})\n\n", pr.number, pr.link));
            for link in report.links_for(&pr.link) {
                md.push_str(&format!("- {}\n", link.line_url));
            }
            for file in &pr.file_level_files {
                md.push_str(&format!("- `{}` (no patch, file level only)\n", file));
            }
            md.push('\n');
        }
        md.push_str(&format!(
            "## Anomalous pull requests: {}\n",
            report.pull_requests.len()
        ));
    }

    std::fs::write(path, md)?;
    Ok(())
}

fn write_json_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
