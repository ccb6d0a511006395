//! Directory stumbler adapters.
//!
//! Both upstream directories expose a "random site" control on their
//! listing page; the only difference between them is the URL, the CSS
//! selector of that control, and the tag written into the catalog.

use std::time::Duration;

use async_trait::async_trait;

use super::browser::BrowserFetcher;
use super::SourceAdapter;
use crate::models::{Candidate, SourceTag};

/// Static description of one stumbler site.
#[derive(Debug, Clone, Copy)]
pub struct StumblerSpec {
    pub tag: SourceTag,
    pub listing_url: &'static str,
    pub random_selector: &'static str,
}

pub const KB512_SPEC: StumblerSpec = StumblerSpec {
    tag: SourceTag::Kb512Club,
    listing_url: "https://512kb.club",
    random_selector: "a.button.random",
};

pub const INDIEBLOG_SPEC: StumblerSpec = StumblerSpec {
    tag: SourceTag::IndieBlog,
    listing_url: "https://indieblog.page/",
    random_selector: "a#stumble",
};

/// Browser-driven adapter for one stumbler site.
pub struct DirectoryStumbler {
    spec: StumblerSpec,
    browser: BrowserFetcher,
    delay: Duration,
}

impl DirectoryStumbler {
    pub fn new(spec: StumblerSpec, page_load_timeout: Duration, delay: Duration) -> Self {
        Self {
            spec,
            browser: BrowserFetcher::new(page_load_timeout),
            delay,
        }
    }

    pub async fn close(&mut self) {
        self.browser.close().await;
    }
}

#[async_trait]
impl SourceAdapter for DirectoryStumbler {
    fn tag(&self) -> SourceTag {
        self.spec.tag
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    async fn fetch_one(&mut self) -> anyhow::Result<Option<Candidate>> {
        let candidate = self
            .browser
            .stumble(self.spec.listing_url, self.spec.random_selector)
            .await?;
        Ok(Some(candidate))
    }
}
