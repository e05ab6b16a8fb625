use std::time::Duration;

use ureq::{http::HeaderMap, Agent, Proxy, RequestBuilder};

use crate::error::{RegistryError, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("dash/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_BODY_SIZE: u64 = 256 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub headers: Option<HeaderMap>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
    /// Largest response body read into memory; `None` disables the limit.
    pub max_body_size: Option<u64>,
}

impl Default for ClientConfig {
    /// Creates a ClientConfig with the `dash/<version>` user agent, a 30 second
    /// timeout and a 256 MiB body limit. Proxy and extra headers are left unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use dash_registry::http_client::ClientConfig;
    ///
    /// let cfg = ClientConfig::default();
    /// assert!(cfg.user_agent.unwrap().starts_with("dash/"));
    /// assert!(cfg.proxy.is_none());
    /// ```
    fn default() -> Self {
        Self {
            user_agent: Some(DEFAULT_USER_AGENT.into()),
            proxy: None,
            headers: None,
            timeout: Some(DEFAULT_TIMEOUT),
            max_body_size: Some(DEFAULT_MAX_BODY_SIZE),
        }
    }
}

impl ClientConfig {
    /// Builds an HTTP `Agent` configured from this `ClientConfig`.
    ///
    /// Non-2xx statuses are returned as ordinary responses so that callers can
    /// tell a 404 apart from other failures.
    pub fn build(&self) -> Agent {
        let mut config = ureq::Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout)
            .http_status_as_error(false);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent.as_str());
        }

        config.build().into()
    }
}

/// Status code and full body of an HTTP response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Performs HTTP GET requests for repositories.
///
/// Implementations return every response that was actually received,
/// whatever its status, and fail only when no response could be obtained.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// [`Fetch`] implementation backed by a `ureq` agent.
#[derive(Clone)]
pub struct HttpClient {
    agent: Agent,
    headers: Option<HeaderMap>,
    max_body_size: u64,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            agent: config.build(),
            headers: config.headers.clone(),
            max_body_size: config.max_body_size.unwrap_or(u64::MAX),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Fetch for HttpClient {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        let req = apply_headers(self.agent.get(url), &self.headers);
        let mut response = req
            .call()
            .map_err(|err| RegistryError::transport(url, err))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_size)
            .read_to_vec()
            .map_err(|err| {
                match err {
                    ureq::Error::BodyExceedsLimit(limit) => {
                        RegistryError::BodyTooLarge {
                            url: url.to_string(),
                            limit,
                        }
                    }
                    err => RegistryError::transport(url, err),
                }
            })?;

        Ok(FetchResponse {
            status,
            body,
        })
    }
}

fn apply_headers<B>(mut req: RequestBuilder<B>, headers: &Option<HeaderMap>) -> RequestBuilder<B> {
    if let Some(headers) = headers {
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }
    }
    req
}
