//! Fetching directory listings over HTTP.
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("echoboot/", env!("CARGO_PKG_VERSION"));

/// Source of raw listing text.
///
/// The scrapers only ever need "give me the body of this URL"; tests swap in
/// a canned implementation.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher. Each call blocks until the body is read or the
/// client's timeout expires.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Fetch {
                url: String::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("Fetching {url}");
        let fetch_error = |reason: String| Error::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("server answered {status}")));
        }

        response.text().map_err(|e| fetch_error(e.to_string()))
    }
}
