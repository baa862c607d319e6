//! Transport configuration for the task tracker client.
//!
//! # Design
//! `TransportConfig::default()` is the empty record. The built-in defaults
//! are only substituted when a caller passes no configuration at all (see
//! `new_http_client_with_config`); a partially filled configuration is used
//! exactly as given.

use std::env;

/// Default host of the task tracker API.
pub const DEFAULT_HOST: &str = "localhost:8322";

/// Default base path of the task tracker API.
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Default schemes, in preference order as declared by the API.
pub const DEFAULT_SCHEMES: [&str; 2] = ["http", "https"];

const HOST_VAR: &str = "TASK_TRACKER_HOST";
const BASE_PATH_VAR: &str = "TASK_TRACKER_BASE_PATH";
const SCHEMES_VAR: &str = "TASK_TRACKER_SCHEMES";

/// Host, base path and schemes handed to the transport constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    pub host: String,
    pub base_path: String,
    pub schemes: Vec<String>,
}

/// The configuration used when none is supplied.
pub fn default_transport_config() -> TransportConfig {
    TransportConfig {
        host: DEFAULT_HOST.to_string(),
        base_path: DEFAULT_BASE_PATH.to_string(),
        schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
    }
}

impl TransportConfig {
    pub fn with_host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = host.into();
        self
    }

    pub fn with_base_path(&mut self, base_path: impl Into<String>) -> &mut Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_schemes<I, S>(&mut self, schemes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    /// Start from the defaults and override from the environment.
    ///
    /// Reads:
    /// - `TASK_TRACKER_HOST`
    /// - `TASK_TRACKER_BASE_PATH`
    /// - `TASK_TRACKER_SCHEMES`: comma separated, e.g. `https,http`
    pub fn from_env() -> Self {
        let mut cfg = default_transport_config();
        if let Ok(host) = env::var(HOST_VAR) {
            cfg.with_host(host);
        }
        if let Ok(base_path) = env::var(BASE_PATH_VAR) {
            cfg.with_base_path(base_path);
        }
        if let Ok(schemes) = env::var(SCHEMES_VAR) {
            cfg.with_schemes(
                schemes
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            );
        }
        cfg
    }
}
