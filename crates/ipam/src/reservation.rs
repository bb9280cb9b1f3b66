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

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Namespaced pod identity, the key under which addresses are reserved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl PodRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        PodRef {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// StatefulSet replicas follow the `<set>-<ordinal>` naming scheme, and
    /// sets participating in address handover additionally end in `-st`.
    /// For such pods this returns the owning set's name; `None` otherwise.
    ///
    /// `web-st-3` maps to `web-st`, `st-0` to `st`; `web-0` and names
    /// without a hyphen are not part of the scheme.
    pub fn stateful_set_parent(&self) -> Option<&str> {
        let (parent, _ordinal) = self.name.rsplit_once('-')?;
        if parent == "st" || parent.ends_with("-st") {
            Some(parent)
        } else {
            None
        }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Two-level identity-to-address map as persisted in the pool resource:
/// namespace, then pod name, then the reserved address in dotted-quad
/// form. Releasing the last pod of a namespace drops the namespace
/// bucket so the stored map never accumulates empty objects.
///
/// A pool carries two of these: a mutable one the allocator writes, and
/// a read-only one for addresses reserved out-of-band by operators.

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationMap(BTreeMap<String, BTreeMap<String, String>>);

impl ReservationMap {
    pub fn reserve(&mut self, pod: &PodRef, addr: Ipv4Addr) {
        self.0
            .entry(pod.namespace.clone())
            .or_default()
            .insert(pod.name.clone(), addr.to_string());
    }

    pub fn release(&mut self, pod: &PodRef) -> Option<Ipv4Addr> {
        let bucket = self.0.get_mut(&pod.namespace)?;
        let freed = bucket.remove(&pod.name);
        if bucket.is_empty() {
            self.0.remove(&pod.namespace);
        }
        freed?.parse().ok()
    }

    pub fn lookup(&self, pod: &PodRef) -> Option<Ipv4Addr> {
        self.0
            .get(&pod.namespace)?
            .get(&pod.name)?
            .parse()
            .ok()
    }

    /// Reverse lookup: which pod, if any, holds `addr`. Entries that do
    /// not parse as IPv4 cannot hold any drawable address and are skipped.
    pub fn holder_of(&self, addr: Ipv4Addr) -> Option<PodRef> {
        for (namespace, bucket) in &self.0 {
            for (name, held) in bucket {
                if held.parse::<Ipv4Addr>().ok() == Some(addr) {
                    return Some(PodRef::new(namespace.as_str(), name.as_str()));
                }
            }
        }
        None
    }

    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.0
            .values()
            .flat_map(|bucket| bucket.values())
            .filter_map(|held| held.parse().ok())
    }

    /// Every entry with the address in its stored textual form, ordered
    /// by namespace then pod name.
    pub fn entries(&self) -> impl Iterator<Item = (PodRef, &str)> + '_ {
        self.0.iter().flat_map(|(namespace, bucket)| {
            bucket
                .iter()
                .map(move |(name, held)| (PodRef::new(namespace.as_str(), name.as_str()), held.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
