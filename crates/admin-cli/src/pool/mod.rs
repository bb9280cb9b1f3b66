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

pub mod args;
pub mod cmds;


use billet_k8s::KubeClient;
pub use args::Cmd;

pub async fn dispatch(cmd: Cmd, client: KubeClient) -> Result<(), eyre::Report> {
    match cmd {
        Cmd::Allocate(args) => cmds::allocate(args, client).await,
        Cmd::Free(args) => cmds::free(args, client).await,
        Cmd::Show => cmds::show(client).await,
    }
}
