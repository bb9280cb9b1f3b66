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

//! IPv4 address allocation for pods out of administrator-defined pools.
//!
//! The pool (subnets, static reservations, and the dynamic reservation
//! table the allocator maintains) lives in an external versioned store.
//! Every operation fetches the pool fresh, mutates it in memory once, and
//! persists it against the version token it was read with; a lost write
//! race surfaces as [`Error::UpdateConflict`] and the caller re-runs the
//! whole operation.

pub mod allocator;
pub mod errors;
pub mod pool;
pub mod range;
pub mod reservation;

pub use allocator::{
    Allocation, AllocatorClient, IpAllocator, OwnerRef, PodDetails, PodRetriever, PoolStore,
    StatefulSetRetriever, StoreError,
};
pub use errors::{Error, Result};
pub use pool::{IpPool, IpPoolSpec, IpPoolStatus, PoolSubnet, PoolVersion};
pub use range::IpRange;
pub use reservation::{PodRef, ReservationMap};
