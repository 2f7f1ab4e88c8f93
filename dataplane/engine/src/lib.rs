/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Layer 4 load balancing engine: virtual services, real server scheduling,
//! per-flow connection tracking with TCP teardown awareness, and master/backup
//! replication of the connection table.

pub mod config;
pub mod conntrack;
pub mod dataplane;
pub mod netutils;
pub mod registry;
pub mod scheduler;
pub mod stats;
pub mod sweeper;
pub mod sync;
pub mod tcp;

use common::{FlowKey, RealServer, ServiceKey, SyncRole};
use thiserror::Error;

pub use config::{EngineConfig, SyncConfig, Timeouts};
pub use dataplane::{ConnectionInfo, Dataplane, DropReason, Packet, Verdict};
pub use scheduler::Algorithm;
pub use stats::StatsSnapshot;
pub use sweeper::spawn_sweeper;
pub use sync::{SyncController, SyncStatus};

#[derive(Error, Debug)]
pub enum Error {
    #[error("service {0} already exists")]
    ServiceExists(ServiceKey),
    #[error("service {0} does not exist")]
    ServiceNotFound(ServiceKey),
    #[error("real server {server} already exists in service {service}")]
    ServerExists {
        service: ServiceKey,
        server: RealServer,
    },
    #[error("real server {server} does not exist in service {service}")]
    ServerNotFound {
        service: ServiceKey,
        server: RealServer,
    },
    #[error("invalid weight {0}, must be at least 1")]
    InvalidWeight(u32),
    #[error("connection {0} is already tracked")]
    ConnectionExists(FlowKey),
    #[error("connection table is full ({0} entries)")]
    TableFull(usize),
    #[error("invalid multicast interface {0:?}")]
    InvalidInterface(String),
    #[error("{0} sync daemon is already running")]
    SyncAlreadyRunning(SyncRole),
    #[error("{0} sync daemon is not running")]
    SyncNotRunning(SyncRole),
    #[error("netlink request failed: {0}")]
    Netlink(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to decode sync frame: {0}")]
    Decode(#[from] prost::DecodeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
