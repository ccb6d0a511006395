//! Headless browser driver for the directory stumbler sources.
//!
//! Uses chromiumoxide (CDP) against a locally installed Chrome/Chromium.
//! The stumbler sites open their random pick in a new tab, so the driver
//! clicks the control, waits for the new target to appear, and reads the
//! resolved URL and document title from it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::Candidate;

/// A fetched page: resolved location, title, and raw HTML.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub title: String,
    pub html: String,
}

/// Browser-based fetcher. The browser launches lazily on first use and
/// is reused for the rest of the run.
pub struct BrowserFetcher {
    page_load_timeout: Duration,
    browser: Option<Arc<Mutex<Browser>>>,
}

impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(page_load_timeout: Duration) -> Self {
        Self {
            page_load_timeout,
            browser: None,
        }
    }

    /// Find Chrome executable.
    fn find_chrome() -> anyhow::Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium"
        ))
    }

    /// Launch the browser if not already running.
    async fn ensure_browser(&mut self) -> anyhow::Result<()> {
        if self.browser.is_some() {
            return Ok(());
        }

        info!("Launching headless browser");
        let chrome_path = Self::find_chrome()?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu") // Recommended for headless
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        // Spawn handler task
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        self.browser = Some(Arc::new(Mutex::new(browser)));

        Ok(())
    }

    /// Wait for the page's document to reach a usable ready state.
    /// Uses document.readyState instead of a fixed timeout.
    async fn wait_for_ready(&self, page: &Page) {
        let wait_for_ready_script = r#"
            new Promise((resolve) => {
                if (document.readyState === 'complete' || document.readyState === 'interactive') {
                    resolve(document.readyState);
                } else {
                    document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
                    // Fallback timeout in case event never fires
                    setTimeout(() => resolve('timeout'), 10000);
                }
            })
        "#;

        match tokio::time::timeout(
            self.page_load_timeout,
            page.evaluate(wait_for_ready_script.to_string()),
        )
        .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state: {}", e);
            }
            Err(_) => {
                warn!("Timeout waiting for page ready state");
            }
        }
    }

    async fn navigate(&self, page: &Page, url: &str) -> anyhow::Result<()> {
        debug!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;
        page.execute(nav_params).await?;
        self.wait_for_ready(page).await;
        Ok(())
    }

    /// Drive a stumbler listing: open it, click its random-navigation
    /// control, and capture the page that opens in response.
    pub async fn stumble(&mut self, listing_url: &str, selector: &str) -> anyhow::Result<Candidate> {
        self.ensure_browser().await?;
        let browser = self.browser.as_ref().unwrap().lock().await;

        let page = browser.new_page("about:blank").await?;
        let result = self.stumble_inner(&browser, &page, listing_url, selector).await;

        // Close the listing tab regardless of outcome to prevent tab
        // accumulation across attempts.
        let _ = page.close().await;
        result
    }

    async fn stumble_inner(
        &self,
        browser: &Browser,
        page: &Page,
        listing_url: &str,
        selector: &str,
    ) -> anyhow::Result<Candidate> {
        self.navigate(page, listing_url).await?;

        // Remember which targets exist before the click so the new tab is
        // recognizable afterwards.
        let before: HashSet<_> = browser
            .pages()
            .await?
            .iter()
            .map(|p| p.target_id().clone())
            .collect();

        let element = page
            .find_element(selector)
            .await
            .with_context(|| format!("random control not found: {}", selector))?;
        element.click().await?;

        // The random pick opens in a new tab; poll for it.
        let new_page = self.wait_for_new_page(browser, &before).await?;
        self.wait_for_ready(&new_page).await;

        let final_url = new_page
            .url()
            .await?
            .map(|u| u.to_string())
            .ok_or_else(|| anyhow::anyhow!("opened page has no URL"))?;

        let title: String = new_page
            .evaluate("document.title".to_string())
            .await?
            .into_value()
            .unwrap_or_default();

        debug!("Stumbled onto {}", final_url);
        let _ = new_page.close().await;

        Ok(Candidate::new(final_url, title))
    }

    async fn wait_for_new_page(
        &self,
        browser: &Browser,
        before: &HashSet<chromiumoxide::cdp::browser_protocol::target::TargetId>,
    ) -> anyhow::Result<Page> {
        let deadline = tokio::time::Instant::now() + self.page_load_timeout;

        loop {
            for page in browser.pages().await? {
                if !before.contains(page.target_id()) {
                    return Ok(page);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(anyhow::anyhow!("timed out waiting for the random pick to open"));
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// Fetch a single page for content analysis.
    pub async fn fetch_page(&mut self, url: &str) -> anyhow::Result<FetchedPage> {
        self.ensure_browser().await?;
        let browser = self.browser.as_ref().unwrap().lock().await;

        let page = browser.new_page("about:blank").await?;
        let result = self.fetch_page_inner(&page, url).await;
        let _ = page.close().await;
        result
    }

    async fn fetch_page_inner(&self, page: &Page, url: &str) -> anyhow::Result<FetchedPage> {
        self.navigate(page, url).await?;

        let final_url = page
            .url()
            .await?
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());

        let title: String = page
            .evaluate("document.title".to_string())
            .await?
            .into_value()
            .unwrap_or_default();

        let html = page.content().await?;

        Ok(FetchedPage {
            final_url,
            title,
            html,
        })
    }

    /// Close the browser.
    pub async fn close(&mut self) {
        self.browser = None;
    }
}
