//! Per-context configuration.

use crate::error::Result;
use crate::logging::DEFAULT_LOG_FILTER;
use serde::Deserialize;
use switchboard_bus::BusConfig;
use switchboard_environment::{EnvironmentHints, ExtensionRole};

/// Settings a context entry point passes to [`crate::AppBuilder`].
///
/// ```json
/// { "name": "bg", "environment": { "extension": "background" }, "verbose": true }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    /// Context identity used in logs, e.g. `bg`, `tab`, `popup`.
    pub name: String,
    #[serde(default)]
    pub environment: EnvironmentHints,
    /// Log every dispatch at debug level.
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl ContextConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: EnvironmentHints::web(),
            verbose: false,
            log_filter: default_log_filter(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_role(mut self, role: ExtensionRole) -> Self {
        self.environment = EnvironmentHints::extension(role);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            verbose: self.verbose,
        }
    }
}
