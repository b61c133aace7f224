// 🌐 Fetcher
// Raw markup for a URL; the only network read in the pipeline

use crate::config::WatchConfig;
use crate::error::WatchError;
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

/// Fetcher - Anything that can turn a URL into page markup
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, WatchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<String, WatchError> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP fetcher with a browser User-Agent
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &WatchConfig) -> Result<Self, WatchError> {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(&config.user_agent) {
            Ok(value) => {
                headers.insert(USER_AGENT, value);
            }
            Err(_) => warn!(
                "Ignoring user_agent {:?}: not a valid header value, using reqwest's default",
                config.user_agent
            ),
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, WatchError> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
