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

//! Kubernetes bindings for the allocator: the cluster-scoped `IPPool`
//! custom resource and a client implementing the allocator's store and
//! liveness collaborator traits on top of the apiserver.

pub mod client;
pub mod crd;

pub use client::KubeClient;
pub use crd::{IPPool, IPPoolSpec};
