//! Request transport
//!
//! A [`Transport`] performs exactly one request/response cycle and hands back
//! the raw body. Parsing and status reporting happen in the session.

use async_trait::async_trait;
use jobpoll_core::domain::request::{JobRequest, Method};
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Raw response of one request cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, unparsed
    pub body: String,
}

/// One request/response cycle against a job server
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response body
    ///
    /// Non-success status codes are not errors at this level: job servers
    /// describe failures in the body.
    async fn send(&self, request: JobRequest) -> Result<TransportResponse>;
}

/// HTTP transport backed by reqwest
///
/// Job servers hand out relative locations (for example `/poll/<id>`), and
/// the default base URL is `/`, so relative URLs are resolved against an
/// origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Origin relative URLs are resolved against (e.g., "http://localhost:8000")
    origin: Option<Url>,
    /// HTTP client instance
    client: Client,
}

impl HttpTransport {
    /// Create a transport that only accepts absolute URLs
    ///
    /// Relative URLs, including the default base URL `/` and the locations
    /// job servers hand out, fail with [`ClientError::InvalidUrl`]. Use
    /// [`HttpTransport::with_origin`] unless every configured URL is absolute.
    pub fn new() -> Self {
        Self {
            origin: None,
            client: Client::new(),
        }
    }

    /// Create a transport resolving relative URLs against `origin`
    ///
    /// # Example
    /// ```
    /// use jobpoll_client::HttpTransport;
    ///
    /// let transport = HttpTransport::with_origin("http://localhost:8000").unwrap();
    /// assert_eq!(
    ///     transport.resolve("/poll/1").unwrap().as_str(),
    ///     "http://localhost:8000/poll/1"
    /// );
    /// ```
    pub fn with_origin(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", origin, e)))?;
        Ok(Self {
            origin: Some(origin),
            client: Client::new(),
        })
    }

    /// Replace the HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the origin, if any
    pub fn origin(&self) -> Option<&Url> {
        self.origin.as_ref()
    }

    /// Resolve a possibly relative URL
    ///
    /// Absolute URLs are returned unchanged. Relative URLs require an origin.
    pub fn resolve(&self, url: &str) -> Result<Url> {
        let resolved = match &self.origin {
            Some(origin) => origin.join(url),
            None => Url::parse(url),
        };

        resolved.map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Download one result of a finished job
    ///
    /// Results live below the job handle at `{location}/{key}`.
    ///
    /// # Arguments
    /// * `location` - The job handle returned at creation
    /// * `key` - One of the keys listed by the success response
    pub async fn fetch_result(&self, location: &str, key: &str) -> Result<Vec<u8>> {
        let mut url = self.resolve(location)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{}: cannot be a base", location)))?
            .pop_if_empty()
            .push(key);

        debug!("Fetching result {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: JobRequest) -> Result<TransportResponse> {
        let url = self.resolve(&request.url)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(
            "{} {} -> {} ({} bytes)",
            request.method,
            request.url,
            status,
            body.len()
        );

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_against_origin() {
        let transport = HttpTransport::with_origin("http://localhost:8000").unwrap();
        assert_eq!(
            transport.resolve("/execute").unwrap().as_str(),
            "http://localhost:8000/execute"
        );
        assert_eq!(
            transport.resolve("http://other:9000/poll/1").unwrap().as_str(),
            "http://other:9000/poll/1"
        );
    }

    #[test]
    fn test_resolve_relative_without_origin_fails() {
        let transport = HttpTransport::new();
        assert!(transport.origin().is_none());
        assert!(matches!(
            transport.resolve("/execute"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(transport.resolve("http://localhost:8000/execute").is_ok());
    }

    #[test]
    fn test_invalid_origin() {
        assert!(matches!(
            HttpTransport::with_origin("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_transport_with_custom_client() {
        let transport = HttpTransport::with_origin("http://localhost:8000")
            .unwrap()
            .with_http_client(Client::new());
        assert_eq!(
            transport.origin().map(Url::as_str),
            Some("http://localhost:8000/")
        );
    }
}
