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

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::range::IpRange;
use crate::reservation::{PodRef, ReservationMap};

/// Opaque store version token. A pool fetched from the store carries the
/// token it was read at, and every persist must present it unchanged so
/// the store can reject writes against a stale read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolVersion(Option<String>);

impl PoolVersion {
    pub fn new(token: impl Into<String>) -> Self {
        PoolVersion(Some(token.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// One allocatable subnet: an address range, the netmask handed out with
/// every allocation from it, the gateway, and sub-ranges withheld from
/// dynamic allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSubnet {
    pub range: String,
    pub netmask_bits: u8,
    pub gateway: Option<Ipv4Addr>,
    #[serde(default)]
    pub reserved_ranges: Vec<String>,
}

impl PoolSubnet {
    /// Checks the declared configuration: the range and every reserved
    /// range must parse, the netmask must lie in 1..=31 and the gateway
    /// must be set.
    pub fn validate(&self) -> Result<(), Error> {
        self.checked().map(|_| ())
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        IpRange::parse(&self.range).is_ok_and(|range| range.contains(addr))
    }

    /// Addresses the random draw can reach: the range minus reserved
    /// sub-ranges and the gateway. Reservations held by pods are not
    /// subtracted; those slots stay reachable for reclamation.
    pub fn usable_capacity(&self) -> Result<u64, Error> {
        Ok(self.checked()?.usable_capacity())
    }

    pub(crate) fn checked(&self) -> Result<CheckedSubnet, Error> {
        let range = IpRange::parse(&self.range)
            .map_err(|err| Error::invalid_pool_config(&self.range, err.to_string()))?;

        let mut reserved = Vec::with_capacity(self.reserved_ranges.len());
        for text in &self.reserved_ranges {
            let parsed = IpRange::parse(text)
                .map_err(|err| Error::invalid_pool_config(&self.range, err.to_string()))?;
            reserved.push(parsed);
        }

        if !(1..=31).contains(&self.netmask_bits) {
            return Err(Error::invalid_pool_config(
                &self.range,
                format!("netmask bits {} must lie between 1 and 31", self.netmask_bits),
            ));
        }

        let gateway = self
            .gateway
            .ok_or_else(|| Error::invalid_pool_config(&self.range, "gateway is not set"))?;

        Ok(CheckedSubnet {
            range,
            reserved,
            gateway,
            netmask_bits: self.netmask_bits,
        })
    }
}

/// A subnet whose configuration has been parsed and checked, ready for
/// address draws.
#[derive(Debug, Clone)]
pub(crate) struct CheckedSubnet {
    pub(crate) range: IpRange,
    pub(crate) reserved: Vec<IpRange>,
    pub(crate) gateway: Ipv4Addr,
    pub(crate) netmask_bits: u8,
}

impl CheckedSubnet {
    pub(crate) fn usable_capacity(&self) -> u64 {
        self.range.usable_size(&self.reserved, &[self.gateway])
    }

    pub(crate) fn random_address<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Ipv4Addr, Error> {
        self.range.random_address(rng, &self.reserved, &[self.gateway])
    }
}

/// Declared pool configuration: the allocatable subnets and the
/// operator-pinned reservations the engine never mutates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpPoolSpec {
    #[serde(rename = "ipPoolSubs", default)]
    pub subnets: Vec<PoolSubnet>,
    #[serde(default)]
    pub static_reservations: ReservationMap,
}

/// Runtime pool state: the reservations the engine creates and reclaims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpPoolStatus {
    #[serde(default)]
    pub dynamic_reservations: ReservationMap,
}

/// The pool aggregate: declared configuration, runtime state and the
/// store version both were read at. Fetched fresh per operation, mutated
/// in memory at most once, persisted at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpPool {
    pub spec: IpPoolSpec,
    pub status: IpPoolStatus,
    pub version: PoolVersion,
}

impl IpPool {
    /// Picks the subnet whose range contains `host`. Selection is keyed on
    /// the requesting node's address, so every pod scheduled onto a node
    /// draws from the subnet serving that node. Subnets whose range text
    /// does not parse cannot match anything.
    pub fn resolve_subnet(&self, host: Ipv4Addr) -> Result<&PoolSubnet, Error> {
        self.spec
            .subnets
            .iter()
            .find(|subnet| subnet.contains(host))
            .ok_or(Error::NoMatchingRange { host })
    }

    /// Address already reserved for `pod`, if any. The static partition
    /// wins over the dynamic one.
    pub fn existing_reservation(&self, pod: &PodRef) -> Option<Ipv4Addr> {
        self.spec
            .static_reservations
            .lookup(pod)
            .or_else(|| self.status.dynamic_reservations.lookup(pod))
    }

    /// Pod holding `addr` in either partition, static first.
    pub fn owner_of_address(&self, addr: Ipv4Addr) -> Option<PodRef> {
        self.spec
            .static_reservations
            .holder_of(addr)
            .or_else(|| self.status.dynamic_reservations.holder_of(addr))
    }

    pub fn reserve_dynamic(&mut self, pod: &PodRef, addr: Ipv4Addr) {
        self.status.dynamic_reservations.reserve(pod, addr);
    }

    pub fn release_dynamic(&mut self, pod: &PodRef) -> Option<Ipv4Addr> {
        self.status.dynamic_reservations.release(pod)
    }
}
