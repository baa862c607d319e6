//! Blocking client for the task tracker API.
//!
//! # Overview
//! `new_http_client_with_config` turns an optional `TransportConfig` and an
//! optional `FormatRegistry` into a `TaskTracker`: one shared transport and
//! one client per resource group (`tasks`). Missing inputs fall back to
//! `localhost:8322`, `/api`, `["http", "https"]` and the global registry.
//!
//! # Design
//! - Construction is infallible and does no I/O; all failures surface from
//!   the transport when an operation runs.
//! - The transport is an `Arc<dyn ClientTransport>` shared by the top-level
//!   client and its sub-resources. `TaskTracker::set_transport` swaps it in
//!   all of them at once.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so request shapes are testable without a
//!   server.

pub mod client;
pub mod config;
pub mod error;
pub mod formats;
pub mod http;
pub mod tasks;
pub mod transport;
pub mod types;

pub use client::{default_client, new_http_client, new_http_client_with_config, TaskTracker};
pub use config::{
    default_transport_config, TransportConfig, DEFAULT_BASE_PATH, DEFAULT_HOST, DEFAULT_SCHEMES,
};
pub use error::{ApiError, TransportError, ValidationError};
pub use formats::FormatRegistry;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use tasks::TasksClient;
pub use transport::{ClientTransport, HttpTransport};
pub use types::{
    Comment, ListTasksParams, Milestone, NewComment, NewTask, Task, TaskPage, TaskStatus,
    UpdateTask, Validate,
};
