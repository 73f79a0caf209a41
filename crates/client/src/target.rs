//! Target addresses naming remote tasks
//!
//! A [`TargetAddress`] is an opaque, non-empty key. Most clusters spell it in
//! the `/job:<job>/replica:<r>/task:<t>` form, which [`TaskName`] parses so
//! resolvers can map it to an endpoint.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque key identifying one remote task within a cache's scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetAddress(String);

impl TargetAddress {
    /// Create a target address, rejecting empty or whitespace-only input
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(Error::invalid_target(address, "address must not be empty"));
        }
        Ok(Self(address))
    }

    /// The address as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Structured view of the address, if it uses the cluster naming form
    #[must_use]
    pub fn task_name(&self) -> Option<TaskName> {
        TaskName::parse(&self.0)
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TargetAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for TargetAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TargetAddress> for String {
    fn from(value: TargetAddress) -> Self {
        value.0
    }
}

impl AsRef<str> for TargetAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A task named as `/job:<job>/replica:<replica>/task:<task>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskName {
    /// Job the task belongs to
    pub job: String,
    /// Replica index (0 when omitted)
    pub replica: u32,
    /// Task index within the job
    pub task: u32,
}

impl TaskName {
    /// Create a task name
    #[must_use]
    pub fn new(job: impl Into<String>, replica: u32, task: u32) -> Self {
        Self {
            job: job.into(),
            replica,
            task,
        }
    }

    /// Parse `/job:<job>[/replica:<r>]/task:<t>`; returns `None` for anything else
    #[must_use]
    pub fn parse(address: &str) -> Option<Self> {
        let mut parts = address.strip_prefix('/')?.split('/');

        let job = parts.next()?.strip_prefix("job:")?;
        if job.is_empty() {
            return None;
        }

        let mut next = parts.next()?;
        let replica = match next.strip_prefix("replica:") {
            Some(replica) => {
                let replica = replica.parse().ok()?;
                next = parts.next()?;
                replica
            }
            None => 0,
        };

        let task = next.strip_prefix("task:")?.parse().ok()?;

        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(job, replica, task))
    }

    /// Canonical target address for this task
    #[must_use]
    pub fn to_target(&self) -> TargetAddress {
        // job is non-empty, so the rendered address is too
        TargetAddress(self.to_string())
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/job:{}/replica:{}/task:{}",
            self.job, self.replica, self.task
        )
    }
}
