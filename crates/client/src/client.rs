//! Client handle abstraction and the factory seam that builds handles

use crate::error::Result;
use crate::target::TargetAddress;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier for one constructed channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

impl ChannelId {
    /// Allocate the next id
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch-{}", self.0)
    }
}

/// An open channel to one remote task
///
/// Coordination-service stubs are built on top of a concrete handle; the
/// cache only manages existence and ownership. Implementations must be safe
/// to use from many tasks at once, since a shared handle is handed to every
/// caller asking for its target. Dropping a handle releases its transport.
pub trait CoordinationClient: Send + Sync + fmt::Debug {
    /// Target this handle was constructed for
    fn target(&self) -> &TargetAddress;

    /// Identifier assigned when the channel was constructed
    fn channel_id(&self) -> ChannelId;

    /// Short transport label, used in logs
    fn transport(&self) -> &'static str;
}

/// Builds client handles for target addresses
///
/// Construction is all-or-nothing: either a fully usable handle or an
/// [`Error::Connection`](crate::Error::Connection).
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Open a new channel to `target`
    async fn connect(&self, target: &TargetAddress) -> Result<Box<dyn CoordinationClient>>;
}
