//! Object-storage sync for the shared catalog copy.
//!
//! The database lives canonically in an S3-compatible bucket so scheduled
//! runs on throwaway machines share one catalog. A run downloads the
//! database first and uploads it (and the rendered feed) afterwards.
//! Every failure here is best-effort: the run continues on a local copy.

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{info, warn};

use crate::config::StorageConfig;

pub const DATABASE_KEY: &str = "sites.db";
pub const FEED_KEY: &str = "sites.xml";

/// S3-compatible object store client, scoped to one run.
pub struct ObjectStore {
    client: Client,
    bucket: String,
    feed_bucket: String,
}

impl ObjectStore {
    /// Connect using the configured bucket. Returns `None` when storage
    /// is not configured; sync is then skipped entirely.
    pub async fn connect(config: &StorageConfig, bucket: Option<String>) -> Option<Self> {
        let bucket = bucket?;

        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base);
        if let Some(endpoint) = &config.endpoint {
            // S3-compatible providers generally want path-style addressing.
            builder = builder.endpoint_url(endpoint.clone()).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        let feed_bucket = config.feed_bucket.clone().unwrap_or_else(|| bucket.clone());

        Some(Self {
            client,
            bucket,
            feed_bucket,
        })
    }

    /// Download the catalog database if the remote copy exists. A missing
    /// object is not an error; a fresh database gets created locally.
    pub async fn download_database(&self, local_path: &Path) -> anyhow::Result<bool> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(DATABASE_KEY)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| anyhow::anyhow!("reading object body: {}", e))?;
                std::fs::write(local_path, bytes.into_bytes())?;
                info!(
                    "Downloaded database from s3://{}/{}",
                    self.bucket, DATABASE_KEY
                );
                Ok(true)
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    info!("No remote database yet; a new one will be created locally");
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(
                        "downloading database: {}",
                        service_err
                    ))
                }
            }
        }
    }

    /// Upload the catalog database back to the bucket.
    pub async fn upload_database(&self, local_path: &Path) -> anyhow::Result<()> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| anyhow::anyhow!("reading {}: {}", local_path.display(), e))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(DATABASE_KEY)
            .body(body)
            .content_type("application/octet-stream")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("uploading database: {}", e.into_service_error()))?;

        info!("Uploaded database to s3://{}/{}", self.bucket, DATABASE_KEY);
        Ok(())
    }

    /// Publish the rendered feed document.
    pub async fn upload_feed(&self, content: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.feed_bucket)
            .key(FEED_KEY)
            .body(ByteStream::from(content.as_bytes().to_vec()))
            .content_type("application/rss+xml")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("uploading feed: {}", e.into_service_error()))?;

        info!("Uploaded feed to s3://{}/{}", self.feed_bucket, FEED_KEY);
        Ok(())
    }
}

/// Best-effort download wrapper used at the start of a run.
pub async fn sync_down(store: &Option<ObjectStore>, db_path: &Path) {
    if let Some(store) = store {
        if let Err(e) = store.download_database(db_path).await {
            warn!("Storage sync (download) failed, using local copy: {}", e);
        }
    }
}

/// Best-effort upload wrapper used at the end of a run.
pub async fn sync_up(store: &Option<ObjectStore>, db_path: &Path) {
    if let Some(store) = store {
        if let Err(e) = store.upload_database(db_path).await {
            warn!("Storage sync (upload) failed: {}", e);
        }
    }
}
