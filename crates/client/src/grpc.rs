//! gRPC transport for coordination clients

use crate::client::{ChannelId, ClientFactory, CoordinationClient};
use crate::config::{ChannelConfig, ClusterConfig};
use crate::error::{Error, Result};
use crate::target::TargetAddress;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info};

/// Coordination client over a connected gRPC channel
#[derive(Debug)]
pub struct GrpcClient {
    target: TargetAddress,
    endpoint: String,
    channel_id: ChannelId,
    channel: Channel,
}

impl GrpcClient {
    /// The raw channel, for building coordination-service stubs
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Endpoint the target resolved to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CoordinationClient for GrpcClient {
    fn target(&self) -> &TargetAddress {
        &self.target
    }

    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn transport(&self) -> &'static str {
        "grpc"
    }
}

impl Drop for GrpcClient {
    fn drop(&mut self) {
        debug!(
            address = %self.target,
            channel_id = %self.channel_id,
            "Closing gRPC channel"
        );
    }
}

/// Connects to cluster tasks over gRPC
#[derive(Debug, Clone)]
pub struct GrpcClientFactory {
    cluster: Arc<ClusterConfig>,
}

impl GrpcClientFactory {
    /// Create a factory resolving targets through `cluster`
    #[must_use]
    pub fn new(cluster: ClusterConfig) -> Self {
        Self {
            cluster: Arc::new(cluster),
        }
    }

    /// Cluster this factory resolves against
    #[must_use]
    pub fn cluster(&self) -> &ClusterConfig {
        &self.cluster
    }
}

#[async_trait]
impl ClientFactory for GrpcClientFactory {
    async fn connect(&self, target: &TargetAddress) -> Result<Box<dyn CoordinationClient>> {
        let address = self.cluster.resolve(target)?;
        let endpoint = create_endpoint(target, address, &self.cluster.channel)?;

        info!(address = %target, endpoint = %address, "Connecting to coordination task");

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| Error::connection(target.as_str(), format!("{address}: {e}")))?;

        let client = GrpcClient {
            target: target.clone(),
            endpoint: address.to_string(),
            channel_id: ChannelId::next(),
            channel,
        };
        debug!(channel_id = %client.channel_id, "Connected to coordination task");

        Ok(Box::new(client))
    }
}

/// Normalize an endpoint to an `http(s)://` URI
fn normalize_uri(address: &str) -> String {
    if let Some(rest) = address.strip_prefix("grpcs://") {
        format!("https://{rest}")
    } else if let Some(rest) = address.strip_prefix("grpc://") {
        format!("http://{rest}")
    } else if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        // Cluster-internal endpoints are plaintext unless marked otherwise
        format!("http://{address}")
    }
}

/// Create a tonic Endpoint for a resolved task address
fn create_endpoint(
    target: &TargetAddress,
    address: &str,
    config: &ChannelConfig,
) -> Result<Endpoint> {
    let uri = normalize_uri(address);

    debug!(original = %address, normalized = %uri, "Normalizing endpoint URL");

    let mut endpoint = Endpoint::from_shared(uri.clone()).map_err(|e| {
        Error::connection(target.as_str(), format!("invalid endpoint '{address}': {e}"))
    })?;

    endpoint = endpoint
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    if uri.starts_with("https://") {
        let tls = ClientTlsConfig::new().with_native_roots();
        endpoint = endpoint.tls_config(tls).map_err(|e| {
            Error::connection(target.as_str(), format!("TLS configuration error: {e}"))
        })?;
    }

    endpoint = endpoint
        .http2_keep_alive_interval(Duration::from_secs(config.keep_alive_interval_secs))
        .keep_alive_timeout(Duration::from_secs(config.keep_alive_timeout_secs))
        .keep_alive_while_idle(true);

    Ok(endpoint)
}
