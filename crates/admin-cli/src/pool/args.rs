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
use clap::Parser;

#[derive(Parser, Debug)]
pub enum Cmd {
    #[clap(about = "Allocate an address for a pod")]
    Allocate(AllocateIp),
    #[clap(about = "Release the address held by a pod")]
    Free(FreeIp),
    #[clap(about = "Display the pool's subnets and reservations")]
    Show,
}

#[derive(Parser, Debug)]
pub struct AllocateIp {
    #[clap(help = "Namespace of the pod")]
    pub namespace: String,

    #[clap(help = "Name of the pod")]
    pub pod: String,

    #[clap(
        long,
        default_value_t = 3,
        help = "Times to re-run the operation after losing an update race"
    )]
    pub retries: u32,
}

#[derive(Parser, Debug)]
pub struct FreeIp {
    #[clap(help = "Namespace of the pod")]
    pub namespace: String,

    #[clap(help = "Name of the pod")]
    pub pod: String,

    #[clap(
        long,
        default_value_t = 3,
        help = "Times to re-run the operation after losing an update race"
    )]
    pub retries: u32,
}
