//! Coordination-service client cache
//!
//! Call sites obtain handles to remote tasks through a
//! [`CoordinationClientCache`] instead of building channels themselves:
//! - [`shared_client`](CoordinationClientCache::shared_client) returns the one
//!   handle per target that the cache constructs lazily and keeps alive
//! - [`exclusive_client`](CoordinationClientCache::exclusive_client) builds a
//!   fresh handle that belongs to the caller alone
//!
//! # Transports
//!
//! Handles are built by a [`ClientFactory`]. [`GrpcClientFactory`] resolves
//! targets through a [`ClusterConfig`] and opens tonic channels;
//! [`LoopbackFactory`] serves targets in-process.
//!
//! # Example
//!
//! ```rust,ignore
//! use coordination_client::{ClientCache, ClusterConfig, CoordinationClientCache, GrpcClientFactory};
//!
//! let cluster = ClusterConfig::load("cluster.toml")?;
//! let cache = ClientCache::from_factory(GrpcClientFactory::new(cluster));
//!
//! let target = "/job:worker/replica:0/task:1".parse()?;
//! let shared = cache.shared_client(&target).await?;
//! let exclusive = cache.exclusive_client(&target).await?;
//! ```

// TODO(client-docs): Add # Errors documentation to all fallible public functions
#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

pub mod cache;
pub mod client;
pub mod config;
mod error;
pub mod grpc;
pub mod loopback;
pub mod target;

// Re-export error types at crate root
pub use error::{Error, Result};

pub use cache::{ClientCache, CoordinationClientCache, ExclusiveClient, SharedClient};
pub use client::{ChannelId, ClientFactory, CoordinationClient};
pub use config::{ChannelConfig, ClusterConfig};
pub use grpc::{GrpcClient, GrpcClientFactory};
pub use loopback::{LoopbackClient, LoopbackFactory};
pub use target::{TargetAddress, TaskName};
