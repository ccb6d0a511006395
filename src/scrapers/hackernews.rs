//! Hacker News listing adapter.
//!
//! Fetches the id list for one listing kind once per run, shuffles it,
//! then walks the shuffled order one detail fetch per attempt until the
//! loop is satisfied or the list runs out.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClient;
use super::SourceAdapter;
use crate::models::{Candidate, SourceTag};

const API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Which Hacker News listing to sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    New,
    Show,
}

impl ListingKind {
    pub fn tag(&self) -> SourceTag {
        match self {
            Self::New => SourceTag::HackerNewsNew,
            Self::Show => SourceTag::HackerNewsShow,
        }
    }

    fn listing_url(&self) -> String {
        match self {
            Self::New => format!("{}/newstories.json", API_BASE),
            Self::Show => format!("{}/showstories.json", API_BASE),
        }
    }
}

/// Item payload as returned by the item endpoint. Fields the adapter
/// does not use are left out; absent `url`/`title` stay `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Map an item to a candidate. An item without a title is unusable; an
/// item without a URL gets one synthesized from its own discussion page
/// so every accepted item has a usable link.
pub fn story_to_candidate(id: u64, story: &Story) -> Option<Candidate> {
    let title = story.title.as_deref()?.trim();
    if title.is_empty() {
        return None;
    }

    let url = match story.url.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => format!("https://news.ycombinator.com/item?id={}", id),
    };

    Some(Candidate::new(url, title))
}

pub struct HackerNewsAdapter {
    kind: ListingKind,
    http: HttpClient,
    delay: Duration,
    /// Shuffled id list, fetched lazily on the first attempt.
    ids: Option<Vec<u64>>,
    cursor: usize,
}

impl HackerNewsAdapter {
    pub fn new(kind: ListingKind, http: HttpClient, delay: Duration) -> Self {
        Self {
            kind,
            http,
            delay,
            ids: None,
            cursor: 0,
        }
    }

    async fn ensure_ids(&mut self) -> anyhow::Result<()> {
        if self.ids.is_some() {
            return Ok(());
        }

        let mut ids: Vec<u64> = self.http.get_json(&self.kind.listing_url()).await?;
        ids.shuffle(&mut rand::thread_rng());
        debug!(
            "Fetched {} ids from Hacker News {:?} listing",
            ids.len(),
            self.kind
        );
        self.ids = Some(ids);
        Ok(())
    }
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
    fn tag(&self) -> SourceTag {
        self.kind.tag()
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    async fn fetch_one(&mut self) -> anyhow::Result<Option<Candidate>> {
        self.ensure_ids().await?;
        let ids = self.ids.as_ref().unwrap();

        let Some(&id) = ids.get(self.cursor) else {
            debug!("Hacker News {:?} id list exhausted", self.kind);
            return Ok(None);
        };
        self.cursor += 1;

        // The item endpoint returns `null` for deleted items.
        let story: Option<Story> = self
            .http
            .get_json(&format!("{}/item/{}.json", API_BASE, id))
            .await?;

        Ok(story.as_ref().and_then(|s| story_to_candidate(id, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_with_url_passes_through() {
        let story = Story {
            title: Some("A fast parser".to_string()),
            url: Some("https://example.com/parser".to_string()),
        };
        let candidate = story_to_candidate(41, &story).unwrap();
        assert_eq!(candidate.url, "https://example.com/parser");
        assert_eq!(candidate.title, "A fast parser");
    }

    #[test]
    fn test_story_without_url_gets_item_page() {
        let story = Story {
            title: Some("Ask HN: favorite small site?".to_string()),
            url: None,
        };
        let candidate = story_to_candidate(12345, &story).unwrap();
        assert_eq!(candidate.url, "https://news.ycombinator.com/item?id=12345");
    }

    #[test]
    fn test_story_without_title_is_skipped() {
        let story = Story {
            title: None,
            url: Some("https://example.com".to_string()),
        };
        assert!(story_to_candidate(7, &story).is_none());

        let blank = Story {
            title: Some("   ".to_string()),
            url: Some("https://example.com".to_string()),
        };
        assert!(story_to_candidate(7, &blank).is_none());
    }
}
