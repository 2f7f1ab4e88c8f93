/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::net::Ipv4Addr;
use std::time::Duration;

use common::{ConnState, Protocol};
use serde::{Deserialize, Serialize};

/// Tunables of the packet-processing engine. Every field has a default so a
/// partial YAML document is enough to override a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeouts: Timeouts,
    /// Upper bound on tracked connections. New flows are rejected once reached.
    pub table_capacity: usize,
    /// Number of shards of the connection table, rounded up to a power of two.
    pub shard_amount: usize,
    pub sweep_interval_ms: u64,
    /// Algorithm used in place of a scheduler name the engine does not support.
    pub fallback_algorithm: String,
    pub sync: SyncConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            timeouts: Timeouts::default(),
            table_capacity: 1 << 20,
            shard_amount: 64,
            sweep_interval_ms: 1000,
            fallback_algorithm: "rr".to_string(),
            sync: SyncConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}

/// Expiry classes, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub tcp_data_secs: u64,
    pub tcp_fin_secs: u64,
    pub tcp_rst_secs: u64,
    pub udp_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            tcp_data_secs: 300,
            tcp_fin_secs: 50,
            tcp_rst_secs: 10,
            udp_secs: 300,
        }
    }
}

impl Timeouts {
    /// Lifetime granted to a connection in `state`.
    pub fn for_state(&self, protocol: Protocol, state: ConnState) -> Duration {
        let secs = match (protocol, state) {
            (Protocol::Udp, _) => self.udp_secs,
            (Protocol::Tcp, ConnState::Active) => self.tcp_data_secs,
            (Protocol::Tcp, ConnState::FinWait) => self.tcp_fin_secs,
            (Protocol::Tcp, ConnState::Closing) => self.tcp_rst_secs,
        };
        Duration::from_secs(secs)
    }
}

/// Multicast channel and batching parameters of the state sync daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub group: Ipv4Addr,
    pub port: u16,
    pub max_records_per_frame: usize,
    pub flush_interval_ms: u64,
    pub queue_depth: usize,
    /// The master re-announces every live connection each time this many
    /// sweeps have run, so a backup started late still converges.
    pub refresh_every_sweeps: u32,
    /// Upper bound on re-announcement frames sent per flush tick.
    pub refresh_frames_per_flush: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            group: Ipv4Addr::new(224, 0, 0, 81),
            port: 8848,
            max_records_per_frame: 50,
            flush_interval_ms: 100,
            queue_depth: 65536,
            refresh_every_sweeps: 30,
            refresh_frames_per_flush: 64,
        }
    }
}

impl SyncConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: EngineConfig = serde_yaml::from_str(
            "timeouts:\n  tcp_rst_secs: 5\nsync:\n  port: 9000\n",
        )
        .unwrap();

        assert_eq!(config.timeouts.tcp_rst_secs, 5);
        assert_eq!(config.timeouts.tcp_fin_secs, 50);
        assert_eq!(config.sync.port, 9000);
        assert_eq!(config.sync.group, Ipv4Addr::new(224, 0, 0, 81));
        assert_eq!(config.sync.refresh_frames_per_flush, 64);
        assert_eq!(config.fallback_algorithm, "rr");
    }

    #[test]
    fn udp_ignores_tcp_states() {
        let timeouts = Timeouts::default();
        assert_eq!(
            timeouts.for_state(Protocol::Udp, ConnState::Closing),
            Duration::from_secs(300)
        );
        assert_eq!(
            timeouts.for_state(Protocol::Tcp, ConnState::Closing),
            Duration::from_secs(10)
        );
    }
}
