//! Read-only web server for browsing the catalog.
//!
//! Serves a random sample of records per known source tag, plus a JSON
//! endpoint returning the same shape.

mod handlers;
mod routes;
mod templates;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::repository::SiteRepository;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<SiteRepository>,
}

/// Start the web server.
pub async fn serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let repo = SiteRepository::new(&settings.database_path())?;
    let state = AppState {
        repo: Arc::new(repo),
    };
    let app = create_router(state);

    let addr: SocketAddr = bind.parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::models::{Candidate, SiteRecord, SourceTag};
    use crate::repository::SiteStore;

    fn setup_test_app(seed: &[(&str, &str, SourceTag)]) -> (axum::Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let repo = SiteRepository::new(&dir.path().join("test.db")).unwrap();

        for (url, title, tag) in seed {
            repo.insert(&SiteRecord::from_candidate(
                &Candidate::new(*url, *title),
                *tag,
            ))
            .unwrap();
        }

        let state = AppState {
            repo: Arc::new(repo),
        };
        (create_router(state), dir)
    }

    #[tokio::test]
    async fn test_browse_empty_catalog() {
        let (app, _dir) = setup_test_app(&[]);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("No sites collected yet"));
    }

    #[tokio::test]
    async fn test_browse_lists_seeded_sites() {
        let (app, _dir) = setup_test_app(&[
            ("https://a.example", "Site A", SourceTag::Kb512Club),
            ("https://b.example", "Site B", SourceTag::IndieBlog),
        ]);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("https://a.example"));
        assert!(html.contains("512KB Club"));
        assert!(html.contains("IndieWeb Blogs"));
    }

    #[tokio::test]
    async fn test_api_random_entries_shape() {
        let (app, _dir) = setup_test_app(&[(
            "https://a.example",
            "Site A",
            SourceTag::HackerNewsNew,
        )]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/random-entries")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["url"], "https://a.example");
        assert_eq!(entries[0]["source"], "hackernews-new");
        assert_eq!(entries[0]["description"], "hackernews-new");
        assert!(entries[0]["capture_date"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_static_css() {
        let (app, _dir) = setup_test_app(&[]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/style.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap_or(""));
        assert!(content_type.unwrap_or("").contains("css"));
    }
}
