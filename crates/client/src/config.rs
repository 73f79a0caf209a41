//! Cluster configuration: which endpoint serves each task
//!
//! ```toml
//! [jobs]
//! chief = ["10.0.0.1:2222"]
//! worker = ["10.0.0.2:2222", "10.0.0.3:2222"]
//!
//! [channel]
//! connectTimeoutSecs = 5
//! ```

use crate::error::{Error, Result};
use crate::target::TargetAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Endpoints for every job in the cluster, plus channel settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Job name to task endpoints, indexed by task number
    #[serde(default)]
    pub jobs: BTreeMap<String, Vec<String>>,

    /// Settings applied to every channel opened to the cluster
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// Channel establishment and keep-alive settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    /// Timeout for establishing a channel, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Per-request timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// HTTP/2 keep-alive ping interval, in seconds
    #[serde(default = "default_keep_alive_interval_secs")]
    pub keep_alive_interval_secs: u64,

    /// Time to wait for a keep-alive ack, in seconds
    #[serde(default = "default_keep_alive_timeout_secs")]
    pub keep_alive_timeout_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            keep_alive_interval_secs: default_keep_alive_interval_secs(),
            keep_alive_timeout_secs: default_keep_alive_timeout_secs(),
        }
    }
}

impl ClusterConfig {
    /// Add or replace a job's task endpoints
    #[must_use]
    pub fn with_job<I, S>(mut self, job: impl Into<String>, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jobs
            .insert(job.into(), endpoints.into_iter().map(Into::into).collect());
        self
    }

    /// Parse and validate a TOML cluster description
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Invalid cluster file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a cluster description from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        debug!(path = %path.display(), "Loaded cluster file");
        Self::from_toml_str(&content)
    }

    /// Reject empty job names and empty endpoints
    pub fn validate(&self) -> Result<()> {
        for (job, endpoints) in &self.jobs {
            if job.trim().is_empty() {
                return Err(Error::configuration("job names must not be empty"));
            }
            if let Some(index) = endpoints.iter().position(|e| e.trim().is_empty()) {
                return Err(Error::configuration(format!(
                    "job '{job}' has an empty endpoint for task {index}"
                )));
            }
        }
        Ok(())
    }

    /// Resolve a target to the endpoint serving it
    ///
    /// Fails with [`Error::Connection`] when the target is not a task name
    /// or names a job or task the cluster does not have.
    pub fn resolve(&self, target: &TargetAddress) -> Result<&str> {
        let name = target.task_name().ok_or_else(|| {
            Error::connection(
                target.as_str(),
                "target is not of the form /job:<job>/replica:<r>/task:<t>",
            )
        })?;

        let endpoints = self.jobs.get(&name.job).ok_or_else(|| {
            Error::connection(
                target.as_str(),
                format!("job '{}' is not part of the cluster", name.job),
            )
        })?;

        usize::try_from(name.task)
            .ok()
            .and_then(|index| endpoints.get(index))
            .map(String::as_str)
            .ok_or_else(|| {
                Error::connection(
                    target.as_str(),
                    format!(
                        "job '{}' has {} task(s), no task {}",
                        name.job,
                        endpoints.len(),
                        name.task
                    ),
                )
            })
    }
}

const fn default_connect_timeout_secs() -> u64 {
    30
}

const fn default_request_timeout_secs() -> u64 {
    600 // 10 minutes
}

const fn default_keep_alive_interval_secs() -> u64 {
    30
}

const fn default_keep_alive_timeout_secs() -> u64 {
    10
}
