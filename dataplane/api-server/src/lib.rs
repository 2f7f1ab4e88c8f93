/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

pub mod admin;
pub mod config;
pub mod server;

use std::future::Future;

use anyhow::Error;
use tonic::transport::Server;
use tracing::info;

use admin::admin_server::AdminServer;
use config::ApiConfig;
use server::AdminService;

/// Serves the admin API and its health endpoint until `shutdown` resolves.
pub async fn start<F>(config: &ApiConfig, service: AdminService, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()>,
{
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AdminServer<AdminService>>()
        .await;

    let addr = config.socket_addr();
    info!("admin api listening on {}", addr);
    Server::builder()
        .add_service(health_service)
        .add_service(AdminServer::new(service))
        .serve_with_shutdown(addr, shutdown)
        .await?;
    Ok(())
}
