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

use std::net::Ipv4Addr;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::errors::{Error, Result};
use crate::pool::IpPool;
use crate::reservation::PodRef;

/// Failure of a collaborator call. Version conflicts are kept apart from
/// every other failure so the engine can surface them as the one
/// retryable error.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("pool version token is stale")]
    VersionConflict,

    #[error("store request failed: {0}")]
    Api(eyre::Report),
}

impl From<eyre::Report> for StoreError {
    fn from(err: eyre::Report) -> Self {
        StoreError::Api(err)
    }
}

/// Versioned pool persistence. `update_pool` must atomically reject a
/// write whose version token is no longer current with
/// [`StoreError::VersionConflict`].
#[async_trait::async_trait]
pub trait PoolStore: Send + Sync {
    async fn get_pool(&self) -> Result<IpPool, StoreError>;
    async fn update_pool(&self, pool: &IpPool) -> Result<(), StoreError>;
}

/// Pod lookup for the requester itself and for reservation holders during
/// liveness checks. `Ok(None)` means the pod does not exist.
#[async_trait::async_trait]
pub trait PodRetriever: Send + Sync {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<PodDetails>, StoreError>;
}

/// Existence probe for the controllers that keep reservations of their
/// vanished replicas alive.
#[async_trait::async_trait]
pub trait StatefulSetRetriever: Send + Sync {
    async fn stateful_set_exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError>;
}

/// The composed client surface the engine runs against. Blanket-implemented
/// for anything providing all three collaborator traits.
pub trait AllocatorClient: PoolStore + PodRetriever + StatefulSetRetriever {}

impl<T: PoolStore + PodRetriever + StatefulSetRetriever> AllocatorClient for T {}

/// The slice of pod state the engine consults: the node address the pod
/// was scheduled onto and its ownership lineage.
#[derive(Debug, Clone, Default)]
pub struct PodDetails {
    pub host_ip: Option<String>,
    pub owners: Vec<OwnerRef>,
}

impl PodDetails {
    pub fn owned_by_stateful_set(&self) -> bool {
        self.owners.iter().any(|owner| owner.kind == "StatefulSet")
    }
}

#[derive(Debug, Clone)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

/// A successful allocation: the address itself plus the gateway and
/// netmask the requester needs to configure its interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub address: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask_bits: u8,
}

/// The allocation engine.
///
/// Each operation fetches the pool fresh from the store, mutates it in
/// memory at most once and persists it at most once. A persist that loses
/// a concurrent write race fails with [`Error::UpdateConflict`]; the
/// engine never retries internally, the caller re-runs the whole
/// operation against a re-fetched pool.
///
/// The engine owns its random source, seeded once at construction; tests
/// inject a seeded generator through [`IpAllocator::with_rng`] for
/// reproducible draws.
pub struct IpAllocator<C> {
    client: C,
    rng: StdRng,
}

impl<C: AllocatorClient> IpAllocator<C> {
    pub fn new(client: C) -> Self {
        IpAllocator {
            client,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_rng(client: C, rng: StdRng) -> Self {
        IpAllocator { client, rng }
    }

    /// Allocates an address for `pod` out of the subnet serving the node
    /// the pod was scheduled onto.
    ///
    /// A pod that already holds a reservation (static or dynamic) gets
    /// the same address back without a store write, so a relaunched pod
    /// of the same identity keeps its address. Otherwise addresses are
    /// drawn at random; a drawn address whose holder is dead (and not
    /// covered by a surviving StatefulSet) is reclaimed on the spot.
    pub async fn allocate(&mut self, pod: &PodRef) -> Result<Allocation> {
        let mut pool = self.client.get_pool().await?;

        let details = self
            .client
            .get_pod(&pod.namespace, &pod.name)
            .await?
            .ok_or_else(|| Error::PodNotFound { pod: pod.clone() })?;

        let host_text = details
            .host_ip
            .as_deref()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::MissingHostAddress { pod: pod.clone() })?;
        let host: Ipv4Addr = host_text.parse().map_err(|_| Error::InvalidHostAddress {
            pod: pod.clone(),
            host: host_text.to_string(),
        })?;

        let subnet = pool.resolve_subnet(host)?.checked()?;

        if let Some(address) = pool.existing_reservation(pod) {
            tracing::debug!(%pod, %address, "pod already holds a reservation, reusing it");
            return Ok(Allocation {
                address,
                gateway: subnet.gateway,
                netmask_bits: subnet.netmask_bits,
            });
        }

        // Draws that collide with live holders burn attempts too, so the
        // bound caps the loop even when no reservation is reclaimable.
        let max_attempts = subnet.usable_capacity().saturating_mul(64).max(64);
        let mut selected = None;
        for _ in 0..max_attempts {
            let candidate = subnet.random_address(&mut self.rng)?;

            let Some(holder) = pool.owner_of_address(candidate) else {
                selected = Some(candidate);
                break;
            };

            tracing::debug!(address = %candidate, %holder, "candidate is held, checking holder liveness");
            if self
                .client
                .get_pod(&holder.namespace, &holder.name)
                .await?
                .is_some()
            {
                // holder is alive, try another address
                continue;
            }

            if let Some(parent) = holder.stateful_set_parent() {
                if self
                    .client
                    .stateful_set_exists(&holder.namespace, parent)
                    .await?
                {
                    tracing::debug!(
                        %holder,
                        parent,
                        "holder is gone but its StatefulSet survives, keeping the reservation"
                    );
                    continue;
                }
            }

            pool.release_dynamic(&holder);
            tracing::info!(%holder, address = %candidate, "reclaimed reservation from a dead pod");
            selected = Some(candidate);
            break;
        }
        let Some(address) = selected else {
            return Err(Error::PoolExhausted {
                subnet: subnet.range.to_string(),
            });
        };

        if !subnet.range.contains(address) {
            tracing::warn!(%address, range = %subnet.range, "selected address fell outside the resolved subnet");
            return Err(Error::AllocationInvariantViolation { address });
        }

        pool.reserve_dynamic(pod, address);
        self.client.update_pool(&pool).await?;

        tracing::info!(%pod, %address, gateway = %subnet.gateway, "allocated address");
        Ok(Allocation {
            address,
            gateway: subnet.gateway,
            netmask_bits: subnet.netmask_bits,
        })
    }

    /// Releases the dynamic reservation held by `pod`, if any.
    ///
    /// A pod that still exists must carry owner references; if one of
    /// them is a StatefulSet the reservation is deliberately retained so
    /// the replacement replica of the same identity reuses its address.
    pub async fn free(&mut self, pod: &PodRef) -> Result<()> {
        let mut pool = self.client.get_pool().await?;

        if let Some(details) = self.client.get_pod(&pod.namespace, &pod.name).await? {
            if details.owners.is_empty() {
                return Err(Error::InvalidPodMetadata { pod: pod.clone() });
            }
            if details.owned_by_stateful_set() {
                tracing::debug!(%pod, "pod belongs to a StatefulSet, retaining its reservation");
                return Ok(());
            }
        }

        match pool.release_dynamic(pod) {
            Some(address) => tracing::info!(%pod, %address, "released reservation"),
            None => tracing::debug!(%pod, "no reservation to release"),
        }

        // Persist unconditionally; a no-op release still writes the pool.
        self.client.update_pool(&pool).await?;
        Ok(())
    }
}
