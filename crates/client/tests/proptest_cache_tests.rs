//! Property-based tests for the client cache.
//!
//! For any sequence of shared lookups over any set of targets:
//! - Each target maps to exactly one handle
//! - Distinct targets never share a handle
//! - Construction happens once per distinct target

#![allow(clippy::unwrap_used, clippy::expect_used)]

use coordination_client::{
    ClientCache, CoordinationClientCache, LoopbackFactory, SharedClient, TargetAddress,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Generate a task-style target address.
fn target_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_]{0,8}".prop_map(|job| format!("/job:{job}/task:0")),
        (0u32..16).prop_map(|task| format!("/job:worker/replica:0/task:{task}")),
        "[a-z]{1,6}:[0-9]{1,2}".prop_map(String::from),
    ]
}

proptest! {
    #[test]
    fn shared_lookups_are_singleton_per_target(
        lookups in proptest::collection::vec(target_strategy(), 1..40)
    ) {
        let factory = LoopbackFactory::accepting_all();
        let cache = ClientCache::from_factory(factory.clone());

        let seen: HashMap<String, SharedClient> = tokio_test::block_on(async {
            let mut seen: HashMap<String, SharedClient> = HashMap::new();
            for address in &lookups {
                let target = TargetAddress::new(address.clone()).unwrap();
                let client = cache.shared_client(&target).await.unwrap();
                if let Some(previous) = seen.get(address) {
                    assert!(Arc::ptr_eq(previous, &client), "{address} changed identity");
                }
                seen.insert(address.clone(), client);
            }
            seen
        });

        let distinct: BTreeSet<_> = lookups.iter().cloned().collect();
        prop_assert_eq!(seen.len(), distinct.len());
        prop_assert_eq!(cache.len(), distinct.len());
        prop_assert_eq!(factory.connect_attempts(), distinct.len());

        let handles: Vec<_> = seen.values().collect();
        for (i, a) in handles.iter().enumerate() {
            for b in &handles[i + 1..] {
                prop_assert!(!Arc::ptr_eq(a, b));
            }
        }

        let targets: Vec<String> = cache.targets().into_iter().map(String::from).collect();
        prop_assert_eq!(targets, distinct.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn exclusive_lookups_never_touch_shared_entries(
        lookups in proptest::collection::vec(target_strategy(), 1..20)
    ) {
        let factory = LoopbackFactory::accepting_all();
        let cache = ClientCache::from_factory(factory.clone());

        tokio_test::block_on(async {
            for address in &lookups {
                let target = TargetAddress::new(address.clone()).unwrap();
                let client = cache.exclusive_client(&target).await.unwrap();
                assert_eq!(client.target(), &target);
            }
        });

        prop_assert!(cache.is_empty());
        prop_assert_eq!(factory.connect_attempts(), lookups.len());
        prop_assert_eq!(factory.open_channels(), 0);
    }
}
