pub mod aggregate;
pub mod collector;
pub mod types;

pub use aggregate::find_anomalies;
pub use collector::collect_touches;
pub use types::{AnomalyGroup, PullRequestAudit, ScanOutcome, ScanSettings};

use tracing::{debug, info, warn};

use crate::pr::PullRequestRef;
use crate::source::ChangeSource;

/// List up to `settings.total` pull requests, one page at a time.
///
/// A page that fails to load is logged and skipped; a short page means the
/// listing is exhausted.
pub async fn list_pull_requests(
    source: &dyn ChangeSource,
    settings: &ScanSettings,
) -> Vec<PullRequestRef> {
    let per_page = settings.per_page.max(1);
    let pages = settings.total.div_ceil(per_page);
    info!(pages, per_page, "listing pull requests");

    let mut pulls = Vec::new();
    for page in 1..=pages {
        match source.list_pull_requests(page, per_page).await {
            Ok(batch) => {
                let short_page = batch.len() < per_page as usize;
                debug!(page, count = batch.len(), "listed pull request page");
                pulls.extend(batch);
                if short_page {
                    break;
                }
            }
            Err(e) => {
                warn!(page, error = %e, "failed to list pull requests, skipping page");
            }
        }
    }
    pulls.truncate(settings.total as usize);
    pulls
}

/// Scan pull requests one at a time and record where more than one commit
/// touched the same rows of a file.
pub async fn scan(source: &dyn ChangeSource, settings: &ScanSettings) -> ScanOutcome {
    let pulls = list_pull_requests(source, settings).await;
    info!(count = pulls.len(), "pull requests to be processed");

    let mut audits = Vec::with_capacity(pulls.len());
    for pr in &pulls {
        let touches = collect_touches(source, pr).await;
        let anomalies = find_anomalies(&touches);
        if !anomalies.is_empty() {
            info!(pr = pr.number, groups = anomalies.len(), "found rows touched by multiple commits");
        }
        audits.push(PullRequestAudit {
            pull_request: pr.clone(),
            touches: touches.len(),
            anomalies,
        });
    }

    ScanOutcome {
        pull_requests_scanned: pulls.len(),
        audits,
    }
}
