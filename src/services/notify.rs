//! Webhook notification fan-out.
//!
//! One message per run: a content line plus one embed per source with a
//! bulleted list of clickable links. Delivery is best-effort; a failure
//! is logged and never retried.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::models::SiteRecord;
use crate::utils::{escape_markdown, truncate_title};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const EMBED_COLOR: u32 = 3447003; // blue
const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
}

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

/// Build the grouped-by-source payload for one run's accepted items.
pub fn build_payload(items: &[SiteRecord]) -> WebhookPayload {
    // Group by source, preserving first-seen order.
    let mut groups: Vec<(String, Vec<&SiteRecord>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(source, _)| *source == item.source) {
            Some((_, members)) => members.push(item),
            None => groups.push((item.source.clone(), vec![item])),
        }
    }

    let embeds = groups
        .into_iter()
        .map(|(source, members)| {
            let lines: Vec<String> = members
                .iter()
                .map(|site| {
                    let clean = truncate_title(&escape_markdown(&site.title), TITLE_MAX_CHARS);
                    format!("• [{}]({})", clean, site.url)
                })
                .collect();
            Embed {
                title: format!("Sites from {}", source),
                description: lines.join("\n"),
                color: EMBED_COLOR,
            }
        })
        .collect();

    WebhookPayload {
        content: format!(
            "📚 **Random sites collection** - {}",
            Utc::now().format("%Y-%m-%d")
        ),
        embeds,
    }
}

/// POST the run's accepted items to the configured webhook endpoint.
pub async fn send_webhook(webhook_url: &str, items: &[SiteRecord]) -> bool {
    info!("Sending webhook with {} sites", items.len());
    let payload = build_payload(items);

    let client = match reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => {
            error!("Error building webhook client: {}", e);
            return false;
        }
    };

    let result = client
        .post(webhook_url)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await
        .and_then(|r| r.error_for_status());

    match result {
        Ok(_) => {
            info!("Webhook sent successfully");
            true
        }
        Err(e) => {
            error!("Error sending webhook: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, SourceTag};

    fn record(url: &str, title: &str, tag: SourceTag) -> SiteRecord {
        SiteRecord::from_candidate(&Candidate::new(url, title), tag)
    }

    #[test]
    fn test_payload_groups_by_source() {
        let items = vec![
            record("https://a.example", "A", SourceTag::Kb512Club),
            record("https://b.example", "B", SourceTag::IndieBlog),
            record("https://c.example", "C", SourceTag::Kb512Club),
        ];
        let payload = build_payload(&items);

        assert_eq!(payload.embeds.len(), 2);
        assert_eq!(payload.embeds[0].title, "Sites from 512kb.club");
        assert!(payload.embeds[0].description.contains("https://a.example"));
        assert!(payload.embeds[0].description.contains("https://c.example"));
        assert_eq!(payload.embeds[1].title, "Sites from indieblog.page");
    }

    #[test]
    fn test_payload_escapes_markdown_in_titles() {
        let items = vec![record(
            "https://a.example",
            "[spicy] *bold* _take_",
            SourceTag::IndieBlog,
        )];
        let payload = build_payload(&items);
        let description = &payload.embeds[0].description;

        assert!(description.contains("\\[spicy\\]"));
        assert!(description.contains("\\*bold\\*"));
        assert!(description.contains("\\_take\\_"));
    }

    #[test]
    fn test_payload_truncates_long_titles() {
        let long_title = "a".repeat(90);
        let items = vec![record("https://a.example", &long_title, SourceTag::IndieBlog)];
        let payload = build_payload(&items);

        assert!(payload.embeds[0].description.contains("..."));
        assert!(!payload.embeds[0].description.contains(&long_title));
    }

    #[test]
    fn test_payload_serializes_to_webhook_shape() {
        let items = vec![record("https://a.example", "A", SourceTag::Kb512Club)];
        let json = serde_json::to_value(build_payload(&items)).unwrap();

        assert!(json["content"].as_str().unwrap().contains("Random sites"));
        assert_eq!(json["embeds"][0]["color"], 3447003);
    }
}
