/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::Context;
use common::{Protocol, RealServer, ServiceKey, SyncRole};
use engine::{Dataplane, EngineConfig, SyncController};
use serde::Deserialize;
use tracing::info;

/// Contents of the `--config` YAML file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub engine: EngineConfig,
    pub services: Vec<ServiceConfig>,
    pub sync: Vec<SyncRoleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    pub vip: Ipv4Addr,
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,
    #[serde(default = "default_scheduler")]
    pub scheduler: String,
    #[serde(default)]
    pub options: String,
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub ip: Ipv4Addr,
    pub port: u16,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncRoleConfig {
    pub role: SyncRole,
    #[serde(default)]
    pub sync_id: u32,
    pub interface: Option<String>,
}

fn default_protocol() -> Protocol {
    Protocol::Tcp
}

fn default_scheduler() -> String {
    "wrr".to_string()
}

fn default_weight() -> u32 {
    1
}

impl LoaderConfig {
    pub fn load(path: &Path) -> Result<LoaderConfig, anyhow::Error> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Adds the configured services and their real servers to the registry.
    pub fn preload(&self, dataplane: &Dataplane) -> Result<(), anyhow::Error> {
        for service in &self.services {
            let key = ServiceKey::new(service.vip, service.port, service.protocol);
            dataplane
                .registry()
                .add_service(key, &service.scheduler, &service.options)
                .with_context(|| format!("failed to add service {}", key))?;
            for server in &service.servers {
                let real = RealServer::new(server.ip, server.port);
                dataplane
                    .registry()
                    .add_server(&key, real, server.weight)
                    .with_context(|| format!("failed to add real server {} to {}", real, key))?;
            }
        }
        info!("preloaded {} services", self.services.len());
        Ok(())
    }

    pub async fn start_sync(&self, sync: &SyncController) -> Result<(), anyhow::Error> {
        for role in &self.sync {
            sync.start(role.role, role.sync_id, role.interface.as_deref())
                .await
                .with_context(|| format!("failed to start {} sync daemon", role.role))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use engine::sync::{LoopbackFactory, TransportFactory};

    use super::*;

    const CONFIG: &str = r#"
engine:
  timeouts:
    tcp_fin_secs: 30
  table_capacity: 4096
services:
  - vip: 10.0.0.100
    port: 80
    scheduler: sh
    options: sh-port
    servers:
      - ip: 192.168.1.1
        port: 8080
      - ip: 192.168.1.2
        port: 8080
        weight: 3
  - vip: 10.0.0.100
    port: 53
    protocol: udp
sync:
  - role: master
    sync_id: 7
  - role: backup
    sync_id: 9
    interface: lo
"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = write_config(CONFIG);
        let config = LoaderConfig::load(file.path()).unwrap();

        assert_eq!(config.engine.timeouts.tcp_fin_secs, 30);
        assert_eq!(config.engine.timeouts.tcp_rst_secs, 10);
        assert_eq!(config.engine.table_capacity, 4096);

        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[0].protocol, Protocol::Tcp);
        assert_eq!(config.services[0].servers[0].weight, 1);
        assert_eq!(config.services[0].servers[1].weight, 3);
        assert_eq!(config.services[1].protocol, Protocol::Udp);
        assert_eq!(config.services[1].scheduler, "wrr");
        assert!(config.services[1].servers.is_empty());

        assert_eq!(config.sync[0].role, SyncRole::Master);
        assert_eq!(config.sync[0].interface, None);
        assert_eq!(config.sync[1].interface.as_deref(), Some("lo"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = write_config("{}");
        let config = LoaderConfig::load(file.path()).unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let file = write_config("services:\n  - vip: not-an-address\n    port: 80\n");
        let err = LoaderConfig::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config file"));

        let missing = LoaderConfig::load(Path::new("/nonexistent/loader.yaml")).unwrap_err();
        assert!(format!("{:#}", missing).contains("failed to read config file"));
    }

    #[test]
    fn test_preload_services() {
        let file = write_config(CONFIG);
        let config = LoaderConfig::load(file.path()).unwrap();
        let dataplane = Dataplane::new(config.engine.clone());

        config.preload(&dataplane).unwrap();
        let key = ServiceKey::new(Ipv4Addr::new(10, 0, 0, 100), 80, Protocol::Tcp);
        let service = dataplane.registry().lookup(&key).unwrap();
        assert_eq!(service.requested_algorithm(), "sh");
        assert_eq!(service.servers().len(), 2);
        assert_eq!(dataplane.registry().len(), 2);

        // a second preload collides with the services already present
        assert!(config.preload(&dataplane).is_err());
    }

    #[tokio::test]
    async fn test_start_configured_sync_roles() {
        let file = write_config(CONFIG);
        let config = LoaderConfig::load(file.path()).unwrap();
        let dataplane = Arc::new(Dataplane::new(config.engine.clone()));
        let factory: Arc<dyn TransportFactory> = Arc::new(LoopbackFactory::new(["lo"]));
        let sync = SyncController::new(dataplane, factory, "lo");

        config.start_sync(&sync).await.unwrap();
        assert_eq!(sync.status().as_tuple(), (1, 1, 7, 9));
        sync.stop_all().await;
    }
}
