/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use billet_ipam::{
    IpPool, OwnerRef, PodDetails, PodRef, PodRetriever, PoolStore, PoolVersion,
    StatefulSetRetriever, StoreError,
};

/// In-memory stand-in for the cluster: one pool resource behind a version
/// counter with compare-and-swap updates, plus pod and StatefulSet
/// presence. Clones share state, so a test can hand one clone to the
/// allocator and inspect the other.
#[derive(Clone, Default)]
pub struct MockCluster {
    state: Arc<Mutex<ClusterState>>,
}

#[derive(Default)]
struct ClusterState {
    pool: IpPool,
    version: u64,
    pods: BTreeMap<(String, String), PodDetails>,
    stateful_sets: BTreeSet<(String, String)>,
    update_count: usize,
    fail_next_update: bool,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pool(&self, pool: IpPool) {
        self.state.lock().unwrap().pool = pool;
    }

    /// Snapshot of the stored pool, without a version token.
    pub fn pool(&self) -> IpPool {
        self.state.lock().unwrap().pool.clone()
    }

    pub fn update_count(&self) -> usize {
        self.state.lock().unwrap().update_count
    }

    /// The next `update_pool` call fails with a version conflict, as if a
    /// concurrent writer got in between fetch and persist.
    pub fn fail_next_update(&self) {
        self.state.lock().unwrap().fail_next_update = true;
    }

    pub fn insert_pod(&self, pod: &PodRef, details: PodDetails) {
        self.state
            .lock()
            .unwrap()
            .pods
            .insert((pod.namespace.clone(), pod.name.clone()), details);
    }

    pub fn insert_stateful_set(&self, namespace: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .stateful_sets
            .insert((namespace.to_string(), name.to_string()));
    }
}

#[async_trait::async_trait]
impl PoolStore for MockCluster {
    async fn get_pool(&self) -> Result<IpPool, StoreError> {
        let state = self.state.lock().unwrap();
        let mut pool = state.pool.clone();
        pool.version = PoolVersion::new(state.version.to_string());
        Ok(pool)
    }

    async fn update_pool(&self, pool: &IpPool) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_update {
            state.fail_next_update = false;
            return Err(StoreError::VersionConflict);
        }
        let current = state.version.to_string();
        if pool.version.as_str() != Some(current.as_str()) {
            return Err(StoreError::VersionConflict);
        }
        state.pool = IpPool {
            spec: pool.spec.clone(),
            status: pool.status.clone(),
            version: PoolVersion::default(),
        };
        state.version += 1;
        state.update_count += 1;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PodRetriever for MockCluster {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<PodDetails>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pods
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}

#[async_trait::async_trait]
impl StatefulSetRetriever for MockCluster {
    async fn stateful_set_exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .stateful_sets
            .contains(&(namespace.to_string(), name.to_string())))
    }
}

pub fn running_pod(host_ip: &str) -> PodDetails {
    PodDetails {
        host_ip: Some(host_ip.to_string()),
        owners: Vec::new(),
    }
}

pub fn owned_pod(host_ip: &str, owner_kind: &str, owner_name: &str) -> PodDetails {
    PodDetails {
        host_ip: Some(host_ip.to_string()),
        owners: vec![OwnerRef {
            kind: owner_kind.to_string(),
            name: owner_name.to_string(),
        }],
    }
}
