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

use crate::allocator::StoreError;
use crate::reservation::PodRef;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed address range '{text}': {reason}")]
    MalformedRange { text: String, reason: String },

    #[error("pool subnet '{subnet}' is misconfigured: {reason}")]
    InvalidPoolConfig { subnet: String, reason: String },

    #[error("no pool subnet contains host address {host}")]
    NoMatchingRange { host: Ipv4Addr },

    #[error("pod {pod} does not exist")]
    PodNotFound { pod: PodRef },

    #[error("pod {pod} has not been assigned a host address yet")]
    MissingHostAddress { pod: PodRef },

    #[error("pod {pod} reports host address '{host}', which is not an IPv4 address")]
    InvalidHostAddress { pod: PodRef, host: String },

    #[error("pod {pod} carries no owner references")]
    InvalidPodMetadata { pod: PodRef },

    #[error("subnet '{subnet}' has exhausted its usable address space")]
    PoolExhausted { subnet: String },

    #[error("allocated address {address} lies outside the resolved subnet")]
    AllocationInvariantViolation { address: Ipv4Addr },

    #[error("pool update lost a concurrent write race; re-run the whole operation")]
    UpdateConflict,

    #[error(transparent)]
    Store(StoreError),
}

impl Error {
    pub(crate) fn malformed_range(text: &str, reason: impl Into<String>) -> Self {
        Error::MalformedRange {
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_pool_config(subnet: &str, reason: impl Into<String>) -> Self {
        Error::InvalidPoolConfig {
            subnet: subnet.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the one failure that is safe to retry by re-running the
    /// whole operation against a freshly fetched pool.
    pub fn is_update_conflict(&self) -> bool {
        matches!(self, Error::UpdateConflict)
    }
}

// Version conflicts must stay distinguishable from every other store
// failure, so the conversion pins the mapping in one place instead of
// leaving it to each call site.
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict => Error::UpdateConflict,
            other => Error::Store(other),
        }
    }
}
