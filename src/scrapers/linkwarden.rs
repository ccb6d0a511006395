//! Linkwarden bookmark adapter.
//!
//! One authenticated listing call per run. Entries missing a URL or a
//! title are dropped; when more valid bookmarks exist than requested, a
//! uniform random sample of the requested size is drawn.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClient;
use super::SourceAdapter;
use crate::models::{Candidate, SourceTag};

#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinksResponse {
    #[serde(default)]
    response: Vec<BookmarkEntry>,
}

/// Keep only entries that carry both a URL and a title.
fn valid_candidates(entries: &[BookmarkEntry]) -> Vec<Candidate> {
    entries
        .iter()
        .filter_map(|entry| {
            let url = entry.url.as_deref()?.trim();
            let name = entry.name.as_deref()?.trim();
            if url.is_empty() || name.is_empty() {
                return None;
            }
            Some(Candidate::new(url, name))
        })
        .collect()
}

/// Uniform sample of `count` bookmarks. When the pool is at or below the
/// request, everything is returned unsampled.
pub fn sample_bookmarks(mut candidates: Vec<Candidate>, count: usize) -> Vec<Candidate> {
    if candidates.len() <= count {
        return candidates;
    }
    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(count);
    candidates
}

pub struct LinkwardenAdapter {
    base_url: String,
    token: String,
    http: HttpClient,
    requested: usize,
    /// Sampled candidates, filled by the first attempt.
    queue: Option<VecDeque<Candidate>>,
}

impl LinkwardenAdapter {
    pub fn new(base_url: String, token: String, http: HttpClient, requested: usize) -> Self {
        Self {
            base_url,
            token,
            http,
            requested,
            queue: None,
        }
    }

    async fn ensure_queue(&mut self) -> anyhow::Result<()> {
        if self.queue.is_some() {
            return Ok(());
        }

        let url = format!("{}/api/v1/links", self.base_url.trim_end_matches('/'));
        let listing: LinksResponse = self.http.get_json_auth(&url, &self.token).await?;

        let valid = valid_candidates(&listing.response);
        debug!(
            "Linkwarden returned {} bookmarks, {} usable",
            listing.response.len(),
            valid.len()
        );

        self.queue = Some(sample_bookmarks(valid, self.requested).into());
        Ok(())
    }
}

#[async_trait]
impl SourceAdapter for LinkwardenAdapter {
    fn tag(&self) -> SourceTag {
        SourceTag::Linkwarden
    }

    fn delay(&self) -> Duration {
        Duration::ZERO
    }

    async fn fetch_one(&mut self) -> anyhow::Result<Option<Candidate>> {
        self.ensure_queue().await?;
        Ok(self.queue.as_mut().unwrap().pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: Option<&str>, url: Option<&str>) -> BookmarkEntry {
        BookmarkEntry {
            name: name.map(String::from),
            url: url.map(String::from),
        }
    }

    #[test]
    fn test_entries_missing_fields_are_filtered() {
        let entries = vec![
            entry(Some("Good"), Some("https://a.example")),
            entry(None, Some("https://b.example")),
            entry(Some("No url"), None),
            entry(Some(""), Some("https://c.example")),
        ];
        let valid = valid_candidates(&entries);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].url, "https://a.example");
    }

    #[test]
    fn test_small_pool_returned_whole() {
        // Five valid bookmarks against a request for ten: all five come
        // back, no sampling, no error.
        let pool: Vec<Candidate> = (0..5)
            .map(|i| Candidate::new(format!("https://site{}.example", i), format!("Site {}", i)))
            .collect();
        let sampled = sample_bookmarks(pool.clone(), 10);
        assert_eq!(sampled, pool);
    }

    #[test]
    fn test_large_pool_is_sampled_down() {
        let pool: Vec<Candidate> = (0..20)
            .map(|i| Candidate::new(format!("https://site{}.example", i), format!("Site {}", i)))
            .collect();
        let sampled = sample_bookmarks(pool.clone(), 7);
        assert_eq!(sampled.len(), 7);
        // Every sampled element came from the pool, without duplication.
        let mut urls: Vec<_> = sampled.iter().map(|c| c.url.clone()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), 7);
        for c in &sampled {
            assert!(pool.contains(c));
        }
    }
}
