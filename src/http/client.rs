use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use std::time::Duration;

use super::request::{FetchRequest, Method};
use crate::errors::TransportError;

/// One network attempt. Implementations never retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &FetchRequest) -> Result<String, TransportError>;
}

/// reqwest-backed transport speaking the site's English locale
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;
        Ok(Self { client })
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("language=en"));

        Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    fn build_request(&self, request: &FetchRequest) -> reqwest::RequestBuilder {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url).form(&request.form),
        };

        if request.xhr {
            builder.header("x-requested-with", "XMLHttpRequest")
        } else {
            builder
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &FetchRequest) -> Result<String, TransportError> {
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}
