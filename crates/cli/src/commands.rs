//! Command implementations; each returns the lines to print

use coordination_client::{
    ClientCache, ClusterConfig, CoordinationClientCache, GrpcClientFactory, TargetAddress,
};
use miette::miette;
use std::time::Instant;

fn parse_targets(targets: &[String]) -> coordination_client::Result<Vec<TargetAddress>> {
    targets.iter().map(|t| t.parse()).collect()
}

/// Resolve every target to its endpoint without connecting
pub fn resolve(cluster: &ClusterConfig, targets: &[String]) -> miette::Result<Vec<String>> {
    let lines = parse_targets(targets)?
        .iter()
        .map(|target| {
            let endpoint = cluster.resolve(target)?;
            Ok(format!("{target} -> {endpoint}"))
        })
        .collect::<coordination_client::Result<Vec<_>>>()?;
    Ok(lines)
}

/// Connect to every target through one cache, `repeat` times each
///
/// Failures are reported per target; the command fails if any target did.
pub async fn probe(
    cluster: ClusterConfig,
    targets: &[String],
    exclusive: bool,
    repeat: usize,
) -> miette::Result<Vec<String>> {
    let targets = parse_targets(targets)?;
    let cache = ClientCache::from_factory(GrpcClientFactory::new(cluster));
    let mut report = Vec::new();
    let mut failures = 0usize;

    for target in &targets {
        for attempt in 1..=repeat.max(1) {
            let started = Instant::now();
            let outcome = if exclusive {
                cache
                    .exclusive_client(target)
                    .await
                    .map(|client| client.channel_id())
            } else {
                cache
                    .shared_client(target)
                    .await
                    .map(|client| client.channel_id())
            };

            match outcome {
                Ok(channel_id) => report.push(format!(
                    "{target} [{attempt}] {mode} {channel_id} in {elapsed}ms",
                    mode = if exclusive { "exclusive" } else { "shared" },
                    elapsed = started.elapsed().as_millis(),
                )),
                Err(err) => {
                    failures += 1;
                    report.push(format!("{target} [{attempt}] failed: {err}"));
                }
            }
        }
    }

    ::tracing::debug!(shared = cache.len(), failures, "Probe finished");

    if failures > 0 {
        return Err(miette!(
            "{failures} of {} lookups failed:\n{}",
            targets.len() * repeat.max(1),
            report.join("\n")
        ));
    }
    Ok(report)
}
