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
use std::path::PathBuf;

use billet_k8s::KubeClient;
use clap::Parser;
use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

mod pool;

#[derive(Parser, Debug)]
#[clap(
    name = "billet-admin-cli",
    about = "Administer pod address allocation out of IPPool resources"
)]
struct Options {
    #[clap(
        long,
        env = "BILLET_KUBECONFIG",
        help = "Kubeconfig to connect with; ambient configuration when omitted"
    )]
    kubeconfig: Option<PathBuf>,

    #[clap(long, env = "BILLET_POOL", help = "Name of the IPPool resource")]
    pool: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    #[clap(subcommand, about = "Allocate, free and inspect pool addresses")]
    Pool(pool::Cmd),
}

#[tokio::main]
async fn main() -> Result<(), eyre::Report> {
    color_eyre::install()?;
    let options = Options::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive("tower=warn".parse()?)
        .add_directive("rustls=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("hyper_util=warn".parse()?)
        .add_directive("kube=warn".parse()?);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .try_init()?;

    let client = match &options.kubeconfig {
        Some(path) => KubeClient::from_kubeconfig(path, options.pool.as_str()).await?,
        None => KubeClient::infer(options.pool.as_str()).await?,
    };

    match options.command {
        Command::Pool(cmd) => pool::dispatch(cmd, client).await,
    }
}
