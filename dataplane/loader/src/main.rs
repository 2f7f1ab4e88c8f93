/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api_server::config::ApiConfig;
use api_server::server::AdminService;
use api_server::start as start_api_server;
use clap::Parser;
use engine::sync::{MulticastFactory, TransportFactory};
use engine::{spawn_sweeper, Dataplane, SyncController};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::LoaderConfig;

#[derive(Debug, Parser)]
struct Opt {
    /// YAML file with engine tunables, services to preload and sync roles
    #[clap(short, long)]
    config: Option<PathBuf>,
    #[clap(flatten)]
    api: ApiConfig,
    /// Default interface of the sync daemons
    #[clap(short, long, default_value = "eth0")]
    iface: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let opt = Opt::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match &opt.config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::default(),
    };

    info!("starting dataplane engine");
    let dataplane = Arc::new(Dataplane::new(config.engine.clone()));
    config.preload(&dataplane)?;

    let factory: Arc<dyn TransportFactory> = Arc::new(MulticastFactory::new(&config.engine.sync));
    let sync = Arc::new(SyncController::new(dataplane.clone(), factory, opt.iface.clone()));
    config.start_sync(&sync).await?;

    let (stop_sweeper, sweeper_shutdown) = watch::channel(false);
    let sweeper = spawn_sweeper(dataplane.clone(), sweeper_shutdown);

    info!("starting api server");
    let service = AdminService::new(dataplane.clone(), sync.clone());
    let served = start_api_server(&opt.api, service, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
        }
        info!("received ctrl-c, shutting down");
    })
    .await
    .context("admin api server failed");

    sync.stop_all().await;
    let _ = stop_sweeper.send(true);
    if let Err(e) = sweeper.await {
        warn!("sweeper task failed: {}", e);
    }

    info!("Exiting...");

    served
}
