//! HTTP client shared by the API-backed adapters.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("serendip/", env!("CARGO_PKG_VERSION"));

/// Thin reqwest wrapper with a fixed timeout and a post-request delay.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration, request_delay: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            request_delay,
        })
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let value = response.json().await?;
        tokio::time::sleep(self.request_delay).await;
        Ok(value)
    }

    /// GET a JSON document with a bearer token.
    pub async fn get_json_auth<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> anyhow::Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        let value = response.json().await?;
        tokio::time::sleep(self.request_delay).await;
        Ok(value)
    }
}
