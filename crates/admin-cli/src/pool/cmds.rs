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

use billet_ipam::{IpAllocator, PodRef, PoolStore, ReservationMap};
use billet_k8s::KubeClient;
use prettytable::{Table, row};

use super::args::{AllocateIp, FreeIp};

pub async fn allocate(args: AllocateIp, client: KubeClient) -> Result<(), eyre::Report> {
    let pod = PodRef::new(&args.namespace, &args.pod);
    let mut engine = IpAllocator::new(client);

    let mut attempts_left = args.retries;
    let allocation = loop {
        match engine.allocate(&pod).await {
            Ok(allocation) => break allocation,
            Err(err) if err.is_update_conflict() && attempts_left > 0 => {
                attempts_left -= 1;
                tracing::warn!(%pod, "lost an update race, re-running the allocation");
            }
            Err(err) => return Err(err.into()),
        }
    };

    println!(
        "{} {}/{}",
        allocation.address, allocation.gateway, allocation.netmask_bits
    );
    Ok(())
}

pub async fn free(args: FreeIp, client: KubeClient) -> Result<(), eyre::Report> {
    let pod = PodRef::new(&args.namespace, &args.pod);
    let mut engine = IpAllocator::new(client);

    let mut attempts_left = args.retries;
    loop {
        match engine.free(&pod).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_update_conflict() && attempts_left > 0 => {
                attempts_left -= 1;
                tracing::warn!(%pod, "lost an update race, re-running the release");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub async fn show(client: KubeClient) -> Result<(), eyre::Report> {
    let pool = client.get_pool().await?;

    if pool.spec.subnets.is_empty() {
        println!("No subnets defined");
    } else {
        let mut subnets = Table::new();
        subnets.set_titles(row!["Range", "Netmask", "Gateway", "Reserved", "Usable"]);
        for subnet in &pool.spec.subnets {
            let gateway = subnet
                .gateway
                .map_or_else(|| "-".to_string(), |gw| gw.to_string());
            let usable = match subnet.usable_capacity() {
                Ok(count) => count.to_string(),
                Err(_) => "invalid".to_string(),
            };
            subnets.add_row(row![
                subnet.range,
                format!("/{}", subnet.netmask_bits),
                gateway,
                subnet.reserved_ranges.join(", "),
                usable,
            ]);
        }
        subnets.printstd();
    }

    print_reservations("Static reservations", &pool.spec.static_reservations);
    print_reservations("Dynamic reservations", &pool.status.dynamic_reservations);
    Ok(())
}

fn print_reservations(title: &str, reservations: &ReservationMap) {
    println!("{title}: {}", reservations.len());
    if reservations.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_titles(row!["Namespace", "Pod", "Address"]);
    for (pod, address) in reservations.entries() {
        table.add_row(row![pod.namespace, pod.name, address]);
    }
    table.printstd();
}
