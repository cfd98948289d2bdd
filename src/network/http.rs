//! Blocking HTTP client driven from the async runtime

use super::Fetcher;
use crate::config::schema::NetworkConfig;
use crate::error::{WardenError, WardenResult};
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::{Agent, RequestBuilder};

/// [`Fetcher`] backed by a `ureq` agent
///
/// Requests run on the blocking pool. Dropping the returned future abandons
/// the result; the underlying call still runs to completion or to the
/// configured global timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
    user_agent: String,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Build a fetcher from network settings
    pub fn new(config: &NetworkConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let agent: Agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            user_agent: config.user_agent.clone(),
            timeout,
        }
    }

    /// Apply the forwarded headers and the default user agent
    fn prepare<B>(&self, mut builder: RequestBuilder<B>, request: &Request) -> RequestBuilder<B> {
        if request.header("user-agent").is_none() {
            builder = builder.header("User-Agent", self.user_agent.as_str());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn call(&self, request: &Request) -> WardenResult<Response> {
        let url = request.url.as_str();
        let body = request.body.as_slice();
        let result = match request.method.as_str() {
            "GET" => self.prepare(self.agent.get(url), request).call(),
            "HEAD" => self.prepare(self.agent.head(url), request).call(),
            "DELETE" => self.prepare(self.agent.delete(url), request).call(),
            "POST" => self.prepare(self.agent.post(url), request).send(body),
            "PUT" => self.prepare(self.agent.put(url), request).send(body),
            "PATCH" => self.prepare(self.agent.patch(url), request).send(body),
            other => {
                return Err(WardenError::User(format!(
                    "Unsupported HTTP method: {}",
                    other
                )))
            }
        };

        let mut resp = result.map_err(|e| self.map_error(url, e))?;

        let mut response = Response::new(resp.status().as_u16());
        for (name, value) in resp.headers() {
            if let Ok(value) = value.to_str() {
                response.set_header(name.as_str(), value);
            }
        }

        if request.method != "HEAD" {
            let body = resp
                .body_mut()
                .read_to_vec()
                .map_err(|e| self.map_error(url, e))?;
            response.body = body;
        }

        Ok(response)
    }

    fn map_error(&self, url: &str, err: ureq::Error) -> WardenError {
        match err {
            ureq::Error::Timeout(_) => WardenError::NetworkTimeout {
                url: url.to_string(),
                timeout: self.timeout.unwrap_or_default(),
            },
            other => WardenError::network(url, other.to_string()),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> WardenResult<Response> {
        let this = self.clone();
        let request = request.clone();
        debug!(
            request_id = %request.id,
            "{} {} ({} body bytes)",
            request.method,
            request.url,
            request.body.len()
        );

        tokio::task::spawn_blocking(move || this.call(&request))
            .await
            .map_err(|e| WardenError::Internal(format!("fetch task failed: {}", e)))?
    }

    fn fetcher_name(&self) -> &'static str {
        "http"
    }
}
