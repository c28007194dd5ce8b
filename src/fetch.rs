use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    item::{self, SearchItem},
};

/// Budget for one candidate retrieval, connection through parsed body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// One network retrieval of an index document. Implementations do not
/// retry; the loader advances to the next candidate on failure.
#[async_trait]
pub trait IndexFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<SearchItem>>;
}

/// HTTP fetcher: a single GET wrapped in a timeout, non-2xx treated as
/// failure, body parsed with the shared index-file parser.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl IndexFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<SearchItem>> {
        let attempt = async {
            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(Error::Status {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                });
            }
            let body = response.text().await?;
            item::parse_index(&body)
        };

        tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| Error::Timeout {
                url: url.to_string(),
                millis: self.timeout.as_millis() as u64,
            })?
    }
}
