//! Configuration management for Serendip.
//!
//! `Settings` covers paths and timing knobs; `Config` covers per-source
//! collection policy and the optional outbound integrations (webhook,
//! bookmark service, feed metadata, object storage). Secrets come from the
//! environment only, never from the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::SourceTag;

pub const DEFAULT_DATABASE_FILENAME: &str = "sites.db";
pub const FEED_FILENAME: &str = "sites.xml";
pub const REPORT_FILENAME: &str = "report.md";
const CONFIG_FILENAME: &str = "serendip.json";

/// Runtime settings: where data lives and how patient the network layer is.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside the data directory.
    pub database_filename: String,
    /// HTTP request timeout in seconds.
    pub request_timeout: u64,
    /// Page load timeout for browser-driven sources, in seconds.
    pub page_load_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("serendip");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            request_timeout: 10,
            page_load_timeout: 15,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn feed_path(&self) -> PathBuf {
        self.data_dir.join(FEED_FILENAME)
    }

    pub fn report_path(&self) -> PathBuf {
        self.data_dir.join(REPORT_FILENAME)
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

/// Collection policy for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Unique records to aim for per run.
    #[serde(default = "default_target")]
    pub target: usize,
    /// Attempt budget; the loop is a best-effort sampler and may accept
    /// fewer than `target` before the budget runs out.
    #[serde(default)]
    pub max_attempts: Option<usize>,
    /// Politeness delay after each accepted record, in milliseconds.
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_target() -> usize {
    5
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            target: default_target(),
            max_attempts: None,
            delay_ms: None,
        }
    }
}

impl SourcePolicy {
    /// Attempt budget, defaulting to 3x the target.
    pub fn attempt_budget(&self) -> usize {
        self.max_attempts.unwrap_or(self.target * 3)
    }

    /// Per-source politeness delay. Browser-driven sources default to a
    /// human-ish pace; the item API gets a short inter-request pause.
    pub fn delay(&self, tag: SourceTag) -> std::time::Duration {
        let default_ms = match tag {
            SourceTag::Kb512Club | SourceTag::IndieBlog => 2000,
            SourceTag::HackerNewsNew | SourceTag::HackerNewsShow => 500,
            SourceTag::Linkwarden => 0,
        };
        std::time::Duration::from_millis(self.delay_ms.unwrap_or(default_ms))
    }
}

/// Bookmark service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkwardenConfig {
    #[serde(default = "default_linkwarden_url")]
    pub base_url: String,
}

fn default_linkwarden_url() -> String {
    "https://cloud.linkwarden.app".to_string()
}

impl Default for LinkwardenConfig {
    fn default() -> Self {
        Self {
            base_url: default_linkwarden_url(),
        }
    }
}

/// Feed-level metadata for the RSS output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_title")]
    pub title: String,
    #[serde(default = "default_feed_link")]
    pub link: String,
    #[serde(default = "default_feed_description")]
    pub description: String,
    #[serde(default = "default_feed_language")]
    pub language: String,
}

fn default_feed_title() -> String {
    "Random Web Discovery Feed".to_string()
}

fn default_feed_link() -> String {
    "https://github.com/serendip-dev/serendip".to_string()
}

fn default_feed_description() -> String {
    "A collection of randomly discovered websites".to_string()
}

fn default_feed_language() -> String {
    "en-US".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: default_feed_title(),
            link: default_feed_link(),
            description: default_feed_description(),
            language: default_feed_language(),
        }
    }
}

/// S3-compatible object storage for the shared catalog copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding the database object. Sync is skipped when unset.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Bucket for the published feed document; defaults to `bucket`.
    #[serde(default)]
    pub feed_bucket: Option<String>,
    /// Custom endpoint URL for S3-compatible providers.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_storage_region")]
    pub region: String,
}

fn default_storage_region() -> String {
    "us-east-1".to_string()
}

/// Language classifier thresholds. These are configuration constants, not
/// tuned parameters; the heuristic carries no accuracy contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Distinct English function words required in the title.
    #[serde(default = "default_title_word_min")]
    pub title_word_min: usize,
    /// Function-word fraction of sampled text that counts as English.
    #[serde(default = "default_text_fraction")]
    pub text_fraction: f64,
    /// Word cap for the sampled-text check.
    #[serde(default = "default_word_cap")]
    pub word_cap: usize,
    /// Character cap when sampling visible text.
    #[serde(default = "default_sample_chars")]
    pub sample_chars: usize,
    /// English navigation words required among nav links.
    #[serde(default = "default_nav_word_min")]
    pub nav_word_min: usize,
}

fn default_title_word_min() -> usize {
    2
}

fn default_text_fraction() -> f64 {
    0.2
}

fn default_word_cap() -> usize {
    50
}

fn default_sample_chars() -> usize {
    500
}

fn default_nav_word_min() -> usize {
    2
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            title_word_min: default_title_word_min(),
            text_fraction: default_text_fraction(),
            word_cap: default_word_cap(),
            sample_chars: default_sample_chars(),
            nav_word_min: default_nav_word_min(),
        }
    }
}

/// Top-level feature configuration, loaded from `serendip.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kb512: SourcePolicy,
    #[serde(default)]
    pub indieblog: SourcePolicy,
    #[serde(default)]
    pub hackernews_new: SourcePolicy,
    #[serde(default)]
    pub hackernews_show: SourcePolicy,
    #[serde(default)]
    pub linkwarden_source: SourcePolicy,

    #[serde(default)]
    pub linkwarden: LinkwardenConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Load configuration from the data directory or the working
    /// directory; absent file means defaults.
    pub fn load(settings: &Settings) -> Self {
        let candidates = [
            settings.data_dir.join(CONFIG_FILENAME),
            PathBuf::from(CONFIG_FILENAME),
        ];
        for path in &candidates {
            if path.exists() {
                match Self::load_from(path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Collection policy for a source tag.
    pub fn policy(&self, tag: SourceTag) -> &SourcePolicy {
        match tag {
            SourceTag::Kb512Club => &self.kb512,
            SourceTag::IndieBlog => &self.indieblog,
            SourceTag::HackerNewsNew => &self.hackernews_new,
            SourceTag::HackerNewsShow => &self.hackernews_show,
            SourceTag::Linkwarden => &self.linkwarden_source,
        }
    }

    /// Webhook endpoint; environment only, it embeds a credential.
    pub fn webhook_url(&self) -> Option<String> {
        std::env::var("DISCORD_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.is_empty())
    }

    /// Bookmark service token; environment only.
    pub fn linkwarden_token(&self) -> Option<String> {
        std::env::var("LINKWARDEN_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
    }

    /// Storage bucket, allowing the environment to override the file.
    pub fn storage_bucket(&self) -> Option<String> {
        std::env::var("SERENDIP_BUCKET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.storage.bucket.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_budget_is_three_times_target() {
        let policy = SourcePolicy::default();
        assert_eq!(policy.target, 5);
        assert_eq!(policy.attempt_budget(), 15);
    }

    #[test]
    fn test_explicit_budget_wins() {
        let policy = SourcePolicy {
            max_attempts: Some(7),
            ..Default::default()
        };
        assert_eq!(policy.attempt_budget(), 7);
    }

    #[test]
    fn test_config_parses_partial_file() {
        let config: Config = serde_json::from_str(
            r#"{
                "kb512": { "target": 3, "max_attempts": 9 },
                "feed": { "title": "My Feed" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.kb512.target, 3);
        assert_eq!(config.kb512.attempt_budget(), 9);
        assert_eq!(config.feed.title, "My Feed");
        // Untouched sections keep defaults.
        assert_eq!(config.indieblog.target, 5);
        assert_eq!(config.classifier.word_cap, 50);
    }

    #[test]
    fn test_source_delays() {
        let policy = SourcePolicy::default();
        assert_eq!(
            policy.delay(SourceTag::Kb512Club),
            std::time::Duration::from_millis(2000)
        );
        assert_eq!(
            policy.delay(SourceTag::HackerNewsNew),
            std::time::Duration::from_millis(500)
        );
        assert_eq!(
            policy.delay(SourceTag::Linkwarden),
            std::time::Duration::ZERO
        );
    }
}
