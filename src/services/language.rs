//! Language classification pass over directory-listing records.
//!
//! Fetches each page with the headless browser and runs the heuristic
//! classifier over the document. The two failure points stay
//! distinguishable in the persisted status: a failed page fetch records
//! `error`, while a failure inside detection falls back to an English
//! verdict (`english_site`).

use std::time::Duration;

use tracing::{info, warn};

use crate::analysis::{HeuristicClassifier, LanguageClassifier, PageSample};
use crate::config::ClassifierConfig;
use crate::models::{LanguageStatus, LanguageVerdict, SourceTag};
use crate::repository::SiteRepository;
use crate::scrapers::browser::BrowserFetcher;

/// Pause between classification fetches, matching the collection pace.
const CLASSIFY_PAUSE: Duration = Duration::from_secs(3);

pub struct LanguageAnalyzer {
    browser: BrowserFetcher,
    classifier: HeuristicClassifier,
}

impl LanguageAnalyzer {
    pub fn new(page_load_timeout: Duration, config: ClassifierConfig) -> Self {
        Self {
            browser: BrowserFetcher::new(page_load_timeout),
            classifier: HeuristicClassifier::new(config),
        }
    }

    /// Classify one site by URL.
    pub async fn classify_site(&mut self, url: &str, title: &str) -> LanguageVerdict {
        match self.browser.fetch_page(url).await {
            Ok(page) => {
                tracing::debug!("Fetched {} for classification", page.final_url);
                // Prefer the live document title over the captured one.
                let title = if page.title.trim().is_empty() {
                    title
                } else {
                    &page.title
                };
                let detection = self.classifier.classify(&PageSample {
                    title,
                    html: &page.html,
                });
                let status = if detection.is_english {
                    LanguageStatus::EnglishSite
                } else {
                    LanguageStatus::NonEnglish
                };
                LanguageVerdict::new(detection.is_english, status, Some(detection.notes))
            }
            Err(e) => {
                warn!("Page fetch failed for {}: {}", url, e);
                // Benefit of the doubt on the flag, but the status keeps
                // the fetch failure visible for a later revisit.
                LanguageVerdict::new(
                    true,
                    LanguageStatus::Error,
                    Some(format!("page fetch failed: {}", e)),
                )
            }
        }
    }

    /// Classify a batch of records and persist each verdict.
    pub async fn classify_records(
        &mut self,
        repo: &SiteRepository,
        records: &[crate::models::SiteRecord],
    ) -> usize {
        let mut classified = 0usize;
        for record in records {
            let verdict = self.classify_site(&record.url, &record.title).await;
            info!(
                "Classified {} as {}",
                record.url,
                verdict.status.as_str()
            );
            if let Err(e) = repo.update_language(&record.url, &verdict) {
                warn!("Failed to store verdict for {}: {}", record.url, e);
                continue;
            }
            classified += 1;
            tokio::time::sleep(CLASSIFY_PAUSE).await;
        }
        classified
    }

    /// Re-run classification over directory records that have never been
    /// checked.
    pub async fn classify_pending(
        &mut self,
        repo: &SiteRepository,
        limit: usize,
    ) -> anyhow::Result<usize> {
        let pending = repo.unclassified(SourceTag::Kb512Club.as_str(), limit)?;
        info!("Found {} sites to classify", pending.len());
        Ok(self.classify_records(repo, &pending).await)
    }

    pub async fn close(&mut self) {
        self.browser.close().await;
    }
}
