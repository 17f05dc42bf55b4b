//! HTTP client for the platform's git auth endpoints

use std::sync::Arc;
use std::time::Duration;

use gitauth_config::Config;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;

use crate::auth::{Authenticator, NoAuth, SessionTokenAuth};
use crate::error::{GitAuthError, Result};

const API_PREFIX: [&str; 3] = ["api", "v2", "gitauth"];

/// Client for device-flow authentication and repository discovery.
///
/// Every operation is a single request/response; nothing is cached or retried.
#[derive(Clone)]
pub struct GitAuthClient {
    http: Client,
    base_url: Url,
    auth: Arc<dyn Authenticator>,
}

impl GitAuthClient {
    /// Create an unauthenticated client for `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            http: Client::new(),
            base_url,
            auth: Arc::new(NoAuth),
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .user_agent(config.http.user_agent.clone())
            .build()?;

        let auth: Arc<dyn Authenticator> = match &config.server.session_token {
            Some(token) => Arc::new(SessionTokenAuth::new(
                config.server.session_header.clone(),
                token.clone(),
            )),
            None => Arc::new(NoAuth),
        };

        Ok(Self {
            http,
            base_url: parse_base_url(&config.server.url)?,
            auth,
        })
    }

    pub fn with_authenticator(mut self, auth: impl Authenticator + 'static) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/v2/gitauth/{provider}/{tail...}` with every segment percent-encoded
    pub(crate) fn endpoint(&self, provider: &str, tail: &[&str]) -> Result<Url> {
        if provider.trim().is_empty() {
            return Err(GitAuthError::InvalidArgument(
                "provider id must not be empty".to_string(),
            ));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitAuthError::InvalidArgument(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .push(provider)
            .extend(tail);
        Ok(url)
    }

    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response> {
        log::debug!("{} {}", method, url.path());

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some((name, value)) = self.auth.get_auth_header().await? {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GitAuthError::InvalidArgument(format!("invalid auth header name: {}", e)))?;
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| GitAuthError::InvalidArgument(format!("invalid auth header value: {}", e)))?;
            value.set_sensitive(true);
            request = request.header(name, value);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| GitAuthError::InvalidArgument(format!("invalid base url '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(GitAuthError::InvalidArgument(format!(
            "base url must be http(s): {}",
            raw
        )));
    }
    Ok(url)
}
