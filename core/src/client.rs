//! Top-level task tracker client and its factory functions.
//!
//! # Design
//! Construction is pure assembly: pick the configuration, build one
//! `HttpTransport`, and hand the same `Arc` to every sub-resource client.
//! Nothing here performs I/O or returns an error; a bad host shows up when
//! the first request is sent.
//!
//! `set_transport` takes `&mut self`, so a swap can never overlap an
//! operation borrowed from the same client. Callers that share a client
//! between threads and still want to swap its transport must wrap it in a
//! lock of their choosing.

use std::sync::Arc;

use tracing::debug;

use crate::config::{default_transport_config, TransportConfig};
use crate::formats::FormatRegistry;
use crate::tasks::TasksClient;
use crate::transport::{ClientTransport, HttpTransport};

/// Client for the task tracker API.
#[derive(Debug, Clone)]
pub struct TaskTracker {
    pub tasks: TasksClient,
    transport: Arc<dyn ClientTransport>,
}

impl TaskTracker {
    /// Assemble a client around an existing transport.
    ///
    /// `None` for `formats` selects `FormatRegistry::global()`.
    pub fn new(transport: Arc<dyn ClientTransport>, formats: Option<Arc<FormatRegistry>>) -> Self {
        let formats = formats.unwrap_or_else(FormatRegistry::global);
        Self {
            tasks: TasksClient::new(Arc::clone(&transport), formats),
            transport,
        }
    }

    /// Replace the transport on the client and all of its sub-resources.
    ///
    /// Every sub-resource holds the new handle by the time this returns.
    pub fn set_transport(&mut self, transport: Arc<dyn ClientTransport>) {
        debug!(?transport, "replacing task tracker transport");
        self.tasks.set_transport(Arc::clone(&transport));
        self.transport = transport;
    }

    pub fn transport(&self) -> &Arc<dyn ClientTransport> {
        &self.transport
    }
}

/// A client for `localhost:8322/api` over `http`/`https` using the global
/// format registry.
pub fn default_client() -> TaskTracker {
    new_http_client_with_config(None, None)
}

/// A client using the default transport configuration.
pub fn new_http_client(formats: Option<Arc<FormatRegistry>>) -> TaskTracker {
    new_http_client_with_config(formats, None)
}

/// A client using `config`, or the defaults when `config` is `None`.
///
/// A supplied configuration is used as-is; empty fields are not filled in.
pub fn new_http_client_with_config(
    formats: Option<Arc<FormatRegistry>>,
    config: Option<TransportConfig>,
) -> TaskTracker {
    let config = config.unwrap_or_else(default_transport_config);
    debug!(
        host = %config.host,
        base_path = %config.base_path,
        schemes = ?config.schemes,
        "building task tracker client"
    );
    let transport: Arc<dyn ClientTransport> = Arc::new(HttpTransport::from_config(&config));
    TaskTracker::new(transport, formats)
}
