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

use billet_ipam::{IpPool, IpPoolSpec, IpPoolStatus, PoolSubnet, PoolVersion, ReservationMap};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// The `IPPool` custom resource. Cluster-scoped: pools serve nodes, not
/// namespaces. The spec carries the operator-declared subnets and pinned
/// reservations; the status carries the reservations the allocator
/// maintains. There is no status subresource, so one replace persists
/// both halves atomically under the same `resourceVersion`.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "ipam.nvidia.com",
    version = "v1alpha1",
    kind = "IPPool",
    status = "IpPoolStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct IPPoolSpec {
    #[serde(rename = "ipPoolSubs", default)]
    pub subnets: Vec<PoolSubnet>,
    #[serde(default)]
    pub static_reservations: ReservationMap,
}

impl From<&IPPool> for IpPool {
    fn from(resource: &IPPool) -> Self {
        IpPool {
            spec: IpPoolSpec {
                subnets: resource.spec.subnets.clone(),
                static_reservations: resource.spec.static_reservations.clone(),
            },
            status: resource.status.clone().unwrap_or_default(),
            version: resource
                .metadata
                .resource_version
                .as_deref()
                .map(PoolVersion::new)
                .unwrap_or_default(),
        }
    }
}

impl IPPool {
    /// Builds the resource to persist for `pool`. The version token rides
    /// back as `metadata.resourceVersion`, which makes the apiserver
    /// reject the replace if the resource moved on since the fetch.
    pub fn from_pool(name: &str, pool: &IpPool) -> IPPool {
        let mut resource = IPPool::new(
            name,
            IPPoolSpec {
                subnets: pool.spec.subnets.clone(),
                static_reservations: pool.spec.static_reservations.clone(),
            },
        );
        resource.status = Some(pool.status.clone());
        resource.metadata.resource_version = pool.version.as_str().map(str::to_string);
        resource
    }
}

#[cfg(test)]
mod tests {
    use billet_ipam::PodRef;
    use kube::Resource;

    use super::*;

    fn sample_pool() -> IpPool {
        let mut pool = IpPool {
            spec: IpPoolSpec {
                subnets: vec![PoolSubnet {
                    range: "10.2.0.0-10.2.0.255".to_string(),
                    netmask_bits: 24,
                    gateway: Some("10.2.0.1".parse().unwrap()),
                    reserved_ranges: vec!["10.2.0.0-10.2.0.15".to_string()],
                }],
                ..Default::default()
            },
            status: IpPoolStatus::default(),
            version: PoolVersion::new("42"),
        };
        pool.spec
            .static_reservations
            .reserve(&PodRef::new("monitoring", "prometheus-0"), "10.2.0.200".parse().unwrap());
        pool.reserve_dynamic(&PodRef::new("default", "web-st-0"), "10.2.0.31".parse().unwrap());
        pool
    }

    #[test]
    fn resource_identity_matches_the_pool_api() {
        assert_eq!(IPPool::kind(&()), "IPPool");
        assert_eq!(IPPool::group(&()), "ipam.nvidia.com");
        assert_eq!(IPPool::version(&()), "v1alpha1");
        assert_eq!(IPPool::plural(&()), "ippools");
    }

    #[test]
    fn conversion_round_trips_spec_status_and_version() {
        let pool = sample_pool();
        let resource = IPPool::from_pool("underlay", &pool);

        assert_eq!(resource.metadata.name.as_deref(), Some("underlay"));
        assert_eq!(resource.metadata.resource_version.as_deref(), Some("42"));
        assert!(resource.status.is_some());

        let back = IpPool::from(&resource);
        assert_eq!(back, pool);
        assert_eq!(back.version.as_str(), Some("42"));
    }

    #[test]
    fn absent_status_and_version_read_as_defaults() {
        let resource = IPPool::new("underlay", IPPoolSpec::default());
        let pool = IpPool::from(&resource);

        assert!(pool.status.dynamic_reservations.is_empty());
        assert_eq!(pool.version.as_str(), None);
    }

    #[test]
    fn spec_serializes_with_the_resource_wire_names() {
        let pool = sample_pool();
        let resource = IPPool::from_pool("underlay", &pool);

        let value = serde_json::to_value(&resource.spec).unwrap();
        assert_eq!(value["ipPoolSubs"][0]["range"], "10.2.0.0-10.2.0.255");
        assert_eq!(value["ipPoolSubs"][0]["netmaskBits"], 24);
        assert_eq!(value["ipPoolSubs"][0]["gateway"], "10.2.0.1");
        assert_eq!(
            value["staticReservations"]["monitoring"]["prometheus-0"],
            "10.2.0.200"
        );
    }
}
