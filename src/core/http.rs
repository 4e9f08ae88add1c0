use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

use crate::core::error::{MergerError, MergerResult};

const APP_USER_AGENT: &str = "packweld/0.1.0";

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

/// Seam for all remote reads. The engine never talks to the network except
/// through this trait, so tests (and embedders with their own transport)
/// can substitute an in-memory implementation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response body. Non-2xx is an error.
    async fn fetch(&self, url: &str) -> MergerResult<Vec<u8>>;
}

/// Production fetcher backed by a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            client: build_http_client().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> MergerResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MergerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory fetcher for tests: serves pre-registered bodies by URL
    /// and records every request it sees.
    #[derive(Default)]
    pub struct FakeFetcher {
        bodies: HashMap<String, Vec<u8>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
            self.bodies.insert(url.to_string(), body);
            self
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> MergerResult<Vec<u8>> {
            self.calls.lock().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| MergerError::DownloadFailed {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }
}
