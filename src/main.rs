mod audit;
mod config;
mod pr;
mod report;
mod source;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use crate::pr::{CommitFile, RepoId};
use crate::source::{ChangeSource, FixtureSource, GitHubSource};

/// PR Row Audit: lists pull requests where a row of a file was touched by
/// more than one commit, with links to the offending rows.
#[derive(Parser, Debug)]
#[command(name = "pr-row-audit", version, about)]
struct Cli {
    /// Repository to scan (e.g., rails/rails or https://github.com/rails/rails)
    ///
    /// Falls back to `scan.repository` in .pr-row-audit.toml. Not required when --mock is used.
    repository: Option<String>,

    /// Pull request state to scan: open, closed or all
    #[arg(long)]
    state: Option<String>,

    /// Pull requests per listing page (at most 100)
    #[arg(long)]
    per_page: Option<u32>,

    /// Maximum number of pull requests to scan
    #[arg(long)]
    total: Option<u32>,

    /// Optional output file path; `.json` writes JSON, anything else markdown
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scan a built-in mock repository for demo purposes (no GitHub access needed)
    #[arg(long)]
    r#mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = config::Config::load()?;
    if let Some(state) = cli.state {
        config.scan.state = state;
    }
    if let Some(per_page) = cli.per_page {
        config.scan.per_page = per_page;
    }
    if let Some(total) = cli.total {
        config.scan.total = total;
    }
    let settings = config.scan.settings();

    let (repo, source): (RepoId, Box<dyn ChangeSource>) = if cli.r#mock {
        info!("using mock repository for demo");
        (
            pr::parse_repo("octo/demo")?,
            Box::new(build_mock_source()) as Box<dyn ChangeSource>,
        )
    } else {
        let repository = cli
            .repository
            .or_else(|| config.scan.repository.clone())
            .ok_or(
                "Repository is required unless --mock is used. Usage: pr-row-audit <owner/repo> or pr-row-audit --mock",
            )?;
        let repo = pr::parse_repo(&repository)?;
        debug!(owner = %repo.owner, repo = %repo.repo, "parsed repository");

        let source = GitHubSource::new(
            repo.clone(),
            &config.github.api_url,
            &config.scan.state,
            config.github_token(),
        )?;
        (repo, Box::new(source) as Box<dyn ChangeSource>)
    };

    let _main_span = info_span!("row_audit", repo = %repo).entered();
    info!(url = %repo.html_url(), per_page = settings.per_page, total = settings.total, "scanning pull requests");
    let outcome = audit::scan(source.as_ref(), &settings).await;
    info!(scanned = outcome.pull_requests_scanned, "scan complete");

    info!("generating report");
    let built_report = report::build(&repo, &outcome);
    report::output(&built_report, cli.output.as_deref())?;
    info!(anomalies = built_report.anomalies.len(), clean = built_report.is_clean(), "done");

    Ok(())
}

/// Build a mock source from the embedded fixture patches.
/// PR #42 rewrites the same rows of user.rb in two commits and swaps a logo
/// twice; PR #43 is clean.
fn build_mock_source() -> FixtureSource {
    let file = |sha: &str, filename: &str, patch: Option<&str>| CommitFile {
        filename: filename.to_string(),
        blob_url: format!("https://github.com/octo/demo/blob/{}/{}", sha, filename),
        patch: patch.map(str::to_string),
    };
    let first = include_str!("../tests/fixtures/user_first.patch");
    let second = include_str!("../tests/fixtures/user_second.patch");
    let greeter = include_str!("../tests/fixtures/new_file.patch");

    FixtureSource::new()
        .with_pull_request(
            42,
            "https://github.com/octo/demo/pull/42",
            vec![
                (
                    "a1b2c3d",
                    vec![
                        file("a1b2c3d", "app/models/user.rb", Some(first)),
                        file("a1b2c3d", "public/logo.png", None),
                    ],
                ),
                (
                    "e4f5a6b",
                    vec![
                        file("e4f5a6b", "app/models/user.rb", Some(second)),
                        file("e4f5a6b", "public/logo.png", None),
                    ],
                ),
            ],
        )
        .with_pull_request(
            43,
            "https://github.com/octo/demo/pull/43",
            vec![("0c9d8e7", vec![file("0c9d8e7", "lib/greeter.rb", Some(greeter))])],
        )
}
