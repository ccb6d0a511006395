//! Source adapters: one per upstream site or API.
//!
//! Every adapter exposes the same capability: produce at most one
//! candidate per call. Failures never leak partial state; the collection
//! loop treats them as a spent attempt.

#[cfg(feature = "browser")]
pub mod browser;
mod hackernews;
mod http_client;
mod linkwarden;
#[cfg(feature = "browser")]
mod stumbler;

pub use hackernews::{HackerNewsAdapter, ListingKind};
pub use http_client::HttpClient;
pub use linkwarden::LinkwardenAdapter;
#[cfg(feature = "browser")]
pub use stumbler::{DirectoryStumbler, StumblerSpec, INDIEBLOG_SPEC, KB512_SPEC};

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{Candidate, SourceTag};

/// One upstream origin of candidate items.
///
/// `fetch_one` either returns a candidate, `Ok(None)` when this attempt
/// produced nothing usable (item without a title, exhausted listing), or
/// an error for a transient failure. Calls are bounded by the adapter's
/// network or page-load timeout and never block indefinitely.
#[async_trait]
pub trait SourceAdapter: Send {
    /// Tag written into records produced by this adapter.
    fn tag(&self) -> SourceTag;

    /// Politeness delay applied by the loop after each accepted record.
    fn delay(&self) -> Duration;

    /// Sample one candidate from the upstream source.
    async fn fetch_one(&mut self) -> anyhow::Result<Option<Candidate>>;
}
