//! The bounded unique-sampling collection loop.
//!
//! For one source: repeatedly sample a candidate, check it against the
//! catalog, accept or discard, within an attempt budget. The loop is a
//! best-effort sampler, not a guaranteed-cardinality generator; callers
//! must tolerate fewer than `target` accepted items. Acceptance is
//! persisted immediately, so a crash mid-loop leaves a valid partial
//! result with no orphaned or duplicate entries.

use tracing::{info, warn};

use crate::models::SiteRecord;
use crate::repository::SiteStore;
use crate::scrapers::SourceAdapter;

/// What one source's loop produced.
#[derive(Debug)]
pub struct CollectOutcome {
    pub accepted: Vec<SiteRecord>,
    pub attempts: usize,
}

impl CollectOutcome {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

/// Run the bounded-retry loop for one source.
///
/// Per-candidate failures are logged and count against the budget; the
/// loop itself cannot fail. Exhausting the budget is normal termination.
pub async fn collect_source(
    adapter: &mut dyn SourceAdapter,
    store: &dyn SiteStore,
    target: usize,
    max_attempts: usize,
) -> CollectOutcome {
    let tag = adapter.tag();
    let mut accepted: Vec<SiteRecord> = Vec::new();
    let mut attempts = 0usize;

    while accepted.len() < target && attempts < max_attempts {
        attempts += 1;
        info!(
            "Finding site {}/{} from {} (attempt {}/{})",
            accepted.len() + 1,
            target,
            tag.as_str(),
            attempts,
            max_attempts
        );

        let candidate = match adapter.fetch_one().await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => continue,
            Err(e) => {
                warn!("Error sampling {}: {}", tag.as_str(), e);
                continue;
            }
        };

        match store.exists(&candidate.url) {
            Ok(true) => {
                info!("Site already in catalog: {}", candidate.url);
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Existence check failed for {}: {}", candidate.url, e);
                continue;
            }
        }

        let record = SiteRecord::from_candidate(&candidate, tag);
        match store.insert(&record) {
            Ok(()) => {
                info!("Added to catalog: {} - {}", record.url, record.title);
                accepted.push(record);
                tokio::time::sleep(adapter.delay()).await;
            }
            Err(e) if e.is_duplicate() => {
                // Lost the race between the existence check and the
                // insert; the unique key did its job.
                info!("Duplicate insert rejected: {}", candidate.url);
            }
            Err(e) => {
                warn!("Failed to persist {}: {}", candidate.url, e);
            }
        }
    }

    info!(
        "Collection from {} complete: {} accepted in {} attempts",
        tag.as_str(),
        accepted.len(),
        attempts
    );

    CollectOutcome { accepted, attempts }
}
