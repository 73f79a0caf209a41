//! Per-target client cache
//!
//! Shared handles are built lazily, once per target, and live as long as the
//! cache. Exclusive handles are built fresh on every request and belong to
//! the caller.

use crate::client::{ClientFactory, CoordinationClient};
use crate::error::{Error, Result};
use crate::target::TargetAddress;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

/// A handle owned by the cache and shared between callers
pub type SharedClient = Arc<dyn CoordinationClient>;

/// A handle owned by a single caller
pub type ExclusiveClient = Box<dyn CoordinationClient>;

type Slot = Arc<OnceCell<SharedClient>>;

/// Source of coordination clients for call sites
#[async_trait]
pub trait CoordinationClientCache: Send + Sync {
    /// Return the shared handle for `target`, constructing it on first use
    ///
    /// Every successful call for the same target returns the same instance.
    /// The handle must not be assumed exclusive.
    async fn shared_client(&self, target: &TargetAddress) -> Result<SharedClient>;

    /// Construct a new handle for `target` that only the caller owns
    ///
    /// Never reads or writes the shared entries.
    async fn exclusive_client(&self, target: &TargetAddress) -> Result<ExclusiveClient>;
}

/// Client cache backed by a pluggable [`ClientFactory`]
///
/// Each target gets its own once-initialized slot. The map shard lock is held
/// only while claiming a slot; the connection itself is established outside
/// it, so a slow target never stalls lookups for other targets.
///
/// Keys are compared as written: `/job:w/task:0` and `/job:w/replica:0/task:0`
/// are different entries. Call sites should pass canonical addresses from
/// [`TaskName::to_target`](crate::TaskName::to_target).
pub struct ClientCache {
    factory: Arc<dyn ClientFactory>,
    slots: DashMap<TargetAddress, Slot>,
}

impl ClientCache {
    /// Create a cache over a shared factory
    #[must_use]
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            slots: DashMap::new(),
        }
    }

    /// Create a cache that owns `factory`
    #[must_use]
    pub fn from_factory<F>(factory: F) -> Self
    where
        F: ClientFactory + 'static,
    {
        Self::new(Arc::new(factory))
    }

    /// Number of installed shared handles
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.initialized()).count()
    }

    /// Whether no shared handle has been installed yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a shared handle for `target` is installed
    #[must_use]
    pub fn contains(&self, target: &TargetAddress) -> bool {
        self.slots
            .get(target)
            .is_some_and(|slot| slot.initialized())
    }

    /// Targets with an installed shared handle, sorted
    #[must_use]
    pub fn targets(&self) -> Vec<TargetAddress> {
        let mut targets: Vec<_> = self
            .slots
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        targets.sort();
        targets
    }

    /// Look up the slot for `target`, claiming an empty one if none exists
    fn slot(&self, target: &TargetAddress) -> Slot {
        if let Some(slot) = self.slots.get(target) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(target.clone()).or_default().value())
    }

    /// Release a slot whose construction failed and remove it from the map
    /// once no other caller holds it. The shard write lock held by
    /// `remove_if` keeps new clones from appearing while the count is read.
    fn discard_failed_slot(&self, target: &TargetAddress, slot: Slot) {
        drop(slot);
        let removed = self.slots.remove_if(target, |_, current| {
            !current.initialized() && Arc::strong_count(current) == 1
        });
        if removed.is_some() {
            debug!(address = %target, "Discarded empty slot after failed construction");
        }
    }
}

#[async_trait]
impl CoordinationClientCache for ClientCache {
    #[instrument(name = "shared_client", skip_all, fields(address = %target))]
    async fn shared_client(&self, target: &TargetAddress) -> Result<SharedClient> {
        let slot = self.slot(target);

        if let Some(client) = slot.get() {
            debug!(channel_id = %client.channel_id(), "Reusing shared client");
            return Ok(Arc::clone(client));
        }

        let constructed = slot
            .get_or_try_init(|| async {
                let client: SharedClient = Arc::from(self.factory.connect(target).await?);
                debug!(
                    channel_id = %client.channel_id(),
                    transport = client.transport(),
                    "Installed shared client"
                );
                Ok::<_, Error>(client)
            })
            .await
            .map(Arc::clone);

        match constructed {
            Ok(client) => Ok(client),
            Err(err) => {
                warn!(error = %err, "Shared client construction failed");
                self.discard_failed_slot(target, slot);
                Err(err)
            }
        }
    }

    #[instrument(name = "exclusive_client", skip_all, fields(address = %target))]
    async fn exclusive_client(&self, target: &TargetAddress) -> Result<ExclusiveClient> {
        match self.factory.connect(target).await {
            Ok(client) => {
                debug!(
                    channel_id = %client.channel_id(),
                    transport = client.transport(),
                    "Constructed exclusive client"
                );
                Ok(client)
            }
            Err(err) => {
                warn!(error = %err, "Exclusive client construction failed");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache")
            .field("targets", &self.targets())
            .finish_non_exhaustive()
    }
}

impl Drop for ClientCache {
    fn drop(&mut self) {
        for entry in self.slots.iter() {
            if let Some(client) = entry.value().get() {
                debug!(
                    address = %entry.key(),
                    channel_id = %client.channel_id(),
                    "Dropping client cache, releasing shared client"
                );
            }
        }
    }
}
