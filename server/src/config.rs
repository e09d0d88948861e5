//! Server settings from environment variables.

use std::env;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default bound on one request, end to end.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Requests running longer than this get a 503. `None` disables the bound.
    pub request_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

impl ServerConfig {
    /// - `MEALFINDER_BIND_ADDR` (default: "0.0.0.0:3000")
    /// - `MEALFINDER_REQUEST_TIMEOUT_SECS` (default: 30, 0 disables)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = env::var("MEALFINDER_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let request_timeout = match env::var("MEALFINDER_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.request_timeout,
        };

        Self {
            bind_addr,
            request_timeout,
        }
    }
}
