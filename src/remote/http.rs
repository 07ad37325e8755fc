//! HTTP capability used by the remote feed loader

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Transport failure reported by an `HttpClient`
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The request could not be completed
    #[error("HTTP request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for HttpClientError {
    fn from(err: reqwest::Error) -> Self {
        HttpClientError::Transport(err.to_string())
    }
}

/// Raw response handed to the response mapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

/// Performs GET requests
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetches `url`, returning the status and body, or a transport error
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError>;
}

/// `HttpClient` backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new client with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a new client wrapping a custom `reqwest::Client`
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
