use std::borrow::Cow;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Method, StatusCode};

use crate::constants::MAX_REDIRECTS;
use crate::error::{ConfigError, RequestError, TransportError};

pub type QueryParams = BTreeMap<String, String>;

/// A fully resolved request, ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub params: QueryParams,
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(
        method: Method,
        url: impl Into<String>,
        status: StatusCode,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// True for 4xx and 5xx statuses.
    pub fn is_error_status(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    pub fn error_for_status(self) -> Result<Self, RequestError> {
        if self.is_error_status() {
            return Err(RequestError::Status(Box::new(self)));
        }
        Ok(self)
    }

    pub fn contains(&self, marker: &[u8]) -> bool {
        if marker.is_empty() {
            return true;
        }
        self.body.windows(marker.len()).any(|window| window == marker)
    }
}

/// The HTTP layer underneath a [`crate::Scraper`].
pub trait Transport {
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;

    /// Releases any held connections. Called at most once by the scraper.
    fn close(&mut self) {}
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(follow_redirects: bool, verify_ssl: bool) -> Result<Self, ConfigError> {
        let redirect = if follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };
        let client = ClientBuilder::new()
            .redirect(redirect)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(ConfigError::Client)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(Response {
            method: request.method.clone(),
            url,
            status,
            headers,
            body,
        })
    }
}
