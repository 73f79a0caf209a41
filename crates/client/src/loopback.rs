//! In-process loopback transport
//!
//! Stands in for the network when the cache runs inside a single process,
//! most often in tests. Targets become reachable once served, and every
//! handle is tracked so callers can check that channels are released.

use crate::client::{ChannelId, ClientFactory, CoordinationClient};
use crate::error::{Error, Result};
use crate::target::TargetAddress;
use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Default)]
struct LoopbackState {
    serving: DashSet<TargetAddress>,
    accept_all: AtomicBool,
    connect_delay_ms: AtomicU64,
    connect_attempts: AtomicUsize,
    open_channels: AtomicUsize,
}

/// Factory for [`LoopbackClient`]s; clones share state
#[derive(Debug, Clone, Default)]
pub struct LoopbackFactory {
    state: Arc<LoopbackState>,
}

impl LoopbackFactory {
    /// A factory with no reachable targets
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory that treats every target as reachable
    #[must_use]
    pub fn accepting_all() -> Self {
        let factory = Self::new();
        factory.state.accept_all.store(true, Ordering::SeqCst);
        factory
    }

    /// Make `target` reachable
    pub fn serve(&self, target: TargetAddress) {
        self.state.serving.insert(target);
    }

    /// Make `target` unreachable for future connections
    ///
    /// Channels already open stay open.
    pub fn shutdown(&self, target: &TargetAddress) {
        self.state.serving.remove(target);
    }

    /// Delay every connection attempt by `delay`
    pub fn set_connect_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.state.connect_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Connection attempts seen so far, successful or not
    #[must_use]
    pub fn connect_attempts(&self) -> usize {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }

    /// Handles constructed and not yet dropped
    #[must_use]
    pub fn open_channels(&self) -> usize {
        self.state.open_channels.load(Ordering::SeqCst)
    }

    fn is_reachable(&self, target: &TargetAddress) -> bool {
        self.state.accept_all.load(Ordering::SeqCst) || self.state.serving.contains(target)
    }
}

#[async_trait]
impl ClientFactory for LoopbackFactory {
    async fn connect(&self, target: &TargetAddress) -> Result<Box<dyn CoordinationClient>> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let delay = self.state.connect_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if !self.is_reachable(target) {
            return Err(Error::connection(
                target.as_str(),
                "no loopback task is serving this target",
            ));
        }

        self.state.open_channels.fetch_add(1, Ordering::SeqCst);
        let client = LoopbackClient {
            target: target.clone(),
            channel_id: ChannelId::next(),
            state: Arc::clone(&self.state),
        };
        trace!(address = %target, channel_id = %client.channel_id, "Opened loopback channel");

        Ok(Box::new(client))
    }
}

/// Coordination client connected through [`LoopbackFactory`]
#[derive(Debug)]
pub struct LoopbackClient {
    target: TargetAddress,
    channel_id: ChannelId,
    state: Arc<LoopbackState>,
}

impl CoordinationClient for LoopbackClient {
    fn target(&self) -> &TargetAddress {
        &self.target
    }

    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn transport(&self) -> &'static str {
        "loopback"
    }
}

impl Drop for LoopbackClient {
    fn drop(&mut self) {
        self.state.open_channels.fetch_sub(1, Ordering::SeqCst);
        trace!(address = %self.target, channel_id = %self.channel_id, "Closed loopback channel");
    }
}
