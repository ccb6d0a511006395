//! HTTP request handlers for the browsing page.

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use serde::Serialize;

use super::templates;
use super::AppState;
use crate::models::{SiteRecord, SourceTag};

/// Sample sizes per source tag, mirroring the notification grouping.
fn sample_size(tag: SourceTag) -> usize {
    match tag {
        SourceTag::Kb512Club | SourceTag::IndieBlog => 10,
        SourceTag::HackerNewsNew | SourceTag::HackerNewsShow => 5,
        SourceTag::Linkwarden => 5,
    }
}

fn sampled_sources(state: &AppState) -> Vec<(SourceTag, Vec<SiteRecord>)> {
    SourceTag::all()
        .iter()
        .map(|tag| {
            let sites = state
                .repo
                .random_by_source(tag.as_str(), sample_size(*tag))
                .unwrap_or_default();
            (*tag, sites)
        })
        .collect()
}

/// Browsing page: a fresh random sample per source on every request.
pub async fn browse(State(state): State<AppState>) -> impl IntoResponse {
    let mut content = String::new();
    for (tag, sites) in sampled_sources(&state) {
        content.push_str(&templates::sites_section(tag.display_name(), &sites));
    }

    if content.is_empty() {
        content = "<p>No sites collected yet. Run <code>serendip collect</code> first.</p>"
            .to_string();
    }

    Html(templates::base_template("Random Sites", &content))
}

#[derive(Debug, Serialize)]
struct EntryJson {
    url: String,
    title: String,
    source: String,
    description: String,
    capture_date: String,
}

#[derive(Debug, Serialize)]
struct EntriesResponse {
    entries: Vec<EntryJson>,
}

/// Same sample shape as the page, for programmatic consumption.
pub async fn api_random_entries(State(state): State<AppState>) -> impl IntoResponse {
    let entries = sampled_sources(&state)
        .into_iter()
        .flat_map(|(_, sites)| sites)
        .map(|site| EntryJson {
            description: site.source.clone(),
            capture_date: site.capture_date.to_rfc3339(),
            url: site.url,
            title: site.title,
            source: site.source,
        })
        .collect();

    axum::Json(EntriesResponse { entries })
}

/// Stylesheet.
pub async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], templates::STYLE_CSS)
}
