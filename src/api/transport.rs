use crate::{
    credentials::Credentials,
    error::{Error, Result},
};
use reqwest::{Client, Method, header::CONTENT_TYPE};
use std::{future::Future, time::Duration};
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw answer to a request, status is reported but never judged here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// First bytes of the body, for log lines and error messages
    #[must_use]
    pub fn excerpt(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        let trimmed = text.trim();
        match trimmed.char_indices().nth(200) {
            Some((idx, _)) => format!("{}...", trimmed.get(..idx).unwrap_or_default()),
            None => trimmed.to_string(),
        }
    }
}

/// Anything able to send a request to `{base}/services/v2/{path}`
pub trait Transport {
    /// Send one request and wait for the whole body
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` when no response could be obtained
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> impl Future<Output = Result<Response>> + Send;
}

/// `reqwest` backed transport using basic auth
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    credentials: Credentials,
    retries: u32,
}

impl HttpTransport {
    /// Build the HTTP client, `retries` extra attempts are made on network errors
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the client can't be built
    pub fn new(credentials: Credentials, timeout: Duration, retries: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            credentials,
            retries,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.credentials.api_root(), path)
    }

    async fn send(&self, method: Method, url: &str, body: Option<&[u8]>) -> Result<Response> {
        let mut request = self
            .client
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(Response { status, body })
    }
}

impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            debug!(%method, %url, attempt, "sending request");

            match self.send(method.clone(), &url, body.as_deref()).await {
                Ok(response) => {
                    debug!(%method, %url, status = response.status, "request completed");
                    return Ok(response);
                }
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        %method,
                        %url,
                        "request failed (attempt {attempt}/{}): {err}",
                        self.retries + 1
                    );
                }
                Err(Error::Transport(msg)) => {
                    return Err(Error::Transport(format!("{method} {url}: {msg}")));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
