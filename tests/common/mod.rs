use std::collections::HashMap;
use std::sync::Mutex;

use page_fetch::error::Result;
use page_fetch::{Fetcher, MirrorError};
use reqwest::StatusCode;
use url::Url;

/// In-memory stand-in for the network. Unknown URLs answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, (StatusCode, Vec<u8>)>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(url.to_string(), (StatusCode::OK, body.into()));
        self
    }

    pub fn with_status(mut self, url: &str, status: StatusCode) -> Self {
        self.responses.insert(url.to_string(), (status, Vec::new()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, url: &Url) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url.as_str()) {
            Some((status, body)) if status.is_success() => Ok(body.clone()),
            Some((status, _)) => Err(MirrorError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(MirrorError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

impl Fetcher for StaticFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let body = self.respond(url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        self.respond(url)
    }
}
