//! Transports that execute `HttpRequest` values.
//!
//! # Design
//! Clients hold an `Arc<dyn ClientTransport>` so the same handle can be shared
//! by the top-level client and every sub-resource client, and swapped as a
//! unit. `HttpTransport` is the blocking ureq implementation. Building one
//! opens no connection; the agent dials on the first `submit`.

use std::any::Any;
use std::fmt;

use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes requests against a remote task tracker.
///
/// Implementations must tolerate concurrent `submit` calls from several
/// threads sharing the same handle.
pub trait ClientTransport: Send + Sync + fmt::Debug {
    fn submit(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    fn as_any(&self) -> &dyn Any;
}

/// Blocking HTTP transport bound to a host, base path and scheme list.
///
/// The three values are kept verbatim; they are only interpreted when a
/// URL is assembled, so a malformed host surfaces as a `TransportError` on
/// the first request.
pub struct HttpTransport {
    host: String,
    base_path: String,
    schemes: Vec<String>,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(host: &str, base_path: &str, schemes: &[String]) -> Self {
        debug!(host, base_path, ?schemes, "creating http transport");
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            host: host.to_string(),
            base_path: base_path.to_string(),
            schemes: schemes.to_vec(),
            agent,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(&config.host, &config.base_path, &config.schemes)
    }

    /// The host, base path and schemes this transport was built from.
    pub fn config(&self) -> TransportConfig {
        TransportConfig {
            host: self.host.clone(),
            base_path: self.base_path.clone(),
            schemes: self.schemes.clone(),
        }
    }

    /// Absolute URL for an operation path, without the query string.
    pub fn url_for(&self, path: &str) -> String {
        let scheme = select_scheme(&self.schemes);
        let base = self.base_path.trim_end_matches('/');
        let base = if base.is_empty() || base.starts_with('/') {
            base.to_string()
        } else {
            format!("/{base}")
        };
        format!("{scheme}://{}{base}{path}", self.host)
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("host", &self.host)
            .field("base_path", &self.base_path)
            .field("schemes", &self.schemes)
            .finish_non_exhaustive()
    }
}

impl ClientTransport for HttpTransport {
    fn submit(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.url_for(&request.path);
        let method = request.method.as_str();
        debug!(method, %url, "submitting request");

        let result = match request.method {
            HttpMethod::Get => decorate(self.agent.get(&url), &request).call(),
            HttpMethod::Delete => decorate(self.agent.delete(&url), &request).call(),
            HttpMethod::Post | HttpMethod::Put => {
                let builder = if request.method == HttpMethod::Post {
                    self.agent.post(&url)
                } else {
                    self.agent.put(&url)
                };
                let builder = decorate(builder, &request);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| {
            warn!(method, %url, error = %e, "request failed");
            TransportError::Request {
                method,
                url: url.clone(),
                message: e.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;
        debug!(method, %url, status, "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn decorate<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Pick the scheme used to reach the host.
///
/// `https` wins whenever more than one scheme is offered and it is among
/// them; otherwise the first entry is used, and `http` when none are given.
pub fn select_scheme(schemes: &[String]) -> &str {
    match schemes {
        [] => "http",
        [only] => only.as_str(),
        [first, ..] => schemes
            .iter()
            .map(String::as_str)
            .find(|s| *s == "https")
            .unwrap_or(first.as_str()),
    }
}
