/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Virtual services and their real server pools.
//!
//! The registry is read on every new flow and written only by administrative
//! calls, so it keeps immutable [`Service`] snapshots behind a read-write lock.
//! A mutation builds a new snapshot and swaps it in; packet workers holding the
//! previous snapshot finish with it undisturbed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use common::{FlowKey, RealServer, ServiceKey};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::scheduler::{Algorithm, Scheduler};
use crate::{Error, Result};

/// A real server as stored in a pool. Connections keep an `Arc` to the entry
/// they were assigned, so the live-connection counter stays accurate even
/// after the server leaves the pool.
#[derive(Debug)]
pub struct ServerEntry {
    server: RealServer,
    weight: AtomicU32,
    active_connections: AtomicU32,
}

impl ServerEntry {
    pub fn new(server: RealServer, weight: u32) -> Self {
        ServerEntry {
            server,
            weight: AtomicU32::new(weight),
            active_connections: AtomicU32::new(0),
        }
    }

    pub fn server(&self) -> RealServer {
        self.server
    }

    pub fn weight(&self) -> u32 {
        self.weight.load(Ordering::Relaxed)
    }

    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub(crate) fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }
}

/// One immutable snapshot of a virtual service.
#[derive(Debug)]
pub struct Service {
    key: ServiceKey,
    requested_algorithm: String,
    options: String,
    scheduler: Scheduler,
    servers: Vec<Arc<ServerEntry>>,
}

impl Service {
    pub fn key(&self) -> ServiceKey {
        self.key
    }

    /// The algorithm name as configured by the operator.
    pub fn requested_algorithm(&self) -> &str {
        &self.requested_algorithm
    }

    /// The algorithm actually used for selection.
    pub fn algorithm(&self) -> Algorithm {
        self.scheduler.algorithm()
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    pub fn servers(&self) -> &[Arc<ServerEntry>] {
        &self.servers
    }

    pub fn find_server(&self, server: &RealServer) -> Option<&Arc<ServerEntry>> {
        self.servers.iter().find(|entry| entry.server == *server)
    }

    pub fn select(&self, flow: &FlowKey) -> Option<Arc<ServerEntry>> {
        self.scheduler.select(&self.servers, flow)
    }

    fn with_servers(&self, servers: Vec<Arc<ServerEntry>>) -> Service {
        Service {
            key: self.key,
            requested_algorithm: self.requested_algorithm.clone(),
            options: self.options.clone(),
            scheduler: Scheduler::new(self.algorithm(), &servers),
            servers,
        }
    }
}

#[derive(Debug)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<ServiceKey, Arc<Service>>>,
    fallback: Algorithm,
}

impl ServiceRegistry {
    pub fn new(fallback: Algorithm) -> Self {
        ServiceRegistry {
            services: RwLock::new(HashMap::new()),
            fallback,
        }
    }

    fn resolve(&self, key: &ServiceKey, name: &str, options: &str) -> Algorithm {
        match Algorithm::parse(name, options) {
            Some(algorithm) => algorithm,
            None => {
                warn!(
                    "service {}: scheduling algorithm {:?} is not supported, using {} instead",
                    key, name, self.fallback
                );
                self.fallback
            }
        }
    }

    pub fn lookup(&self, key: &ServiceKey) -> Option<Arc<Service>> {
        self.services.read().get(key).cloned()
    }

    pub fn add_service(&self, key: ServiceKey, algorithm: &str, options: &str) -> Result<()> {
        let mut services = self.services.write();
        if services.contains_key(&key) {
            return Err(Error::ServiceExists(key));
        }

        let effective = self.resolve(&key, algorithm, options);
        services.insert(
            key,
            Arc::new(Service {
                key,
                requested_algorithm: algorithm.to_string(),
                options: options.to_string(),
                scheduler: Scheduler::new(effective, &[]),
                servers: Vec::new(),
            }),
        );
        info!("service {} added, scheduler {}", key, effective);
        Ok(())
    }

    /// Changes the scheduling algorithm of a service, keeping its pool.
    pub fn edit_service(&self, key: ServiceKey, algorithm: &str, options: &str) -> Result<()> {
        let mut services = self.services.write();
        let current = services.get(&key).ok_or(Error::ServiceNotFound(key))?;

        let effective = self.resolve(&key, algorithm, options);
        let servers = current.servers.clone();
        let updated = Service {
            key,
            requested_algorithm: algorithm.to_string(),
            options: options.to_string(),
            scheduler: Scheduler::new(effective, &servers),
            servers,
        };
        services.insert(key, Arc::new(updated));
        info!("service {} edited, scheduler {}", key, effective);
        Ok(())
    }

    /// Removes a service. Its tracked connections are left to expire.
    pub fn remove_service(&self, key: &ServiceKey) -> Result<()> {
        self.services
            .write()
            .remove(key)
            .ok_or(Error::ServiceNotFound(*key))?;
        info!("service {} removed", key);
        Ok(())
    }

    pub fn add_server(&self, key: &ServiceKey, server: RealServer, weight: u32) -> Result<()> {
        if weight == 0 {
            return Err(Error::InvalidWeight(weight));
        }

        let mut services = self.services.write();
        let current = services.get(key).ok_or(Error::ServiceNotFound(*key))?;
        if current.find_server(&server).is_some() {
            return Err(Error::ServerExists {
                service: *key,
                server,
            });
        }

        let mut servers = current.servers.clone();
        servers.push(Arc::new(ServerEntry::new(server, weight)));
        let updated = current.with_servers(servers);
        services.insert(*key, Arc::new(updated));
        info!("service {}: real server {} added, weight {}", key, server, weight);
        Ok(())
    }

    /// Changes the weight of a real server. Existing connections keep their
    /// assignment.
    pub fn edit_server(&self, key: &ServiceKey, server: RealServer, weight: u32) -> Result<()> {
        if weight == 0 {
            return Err(Error::InvalidWeight(weight));
        }

        let mut services = self.services.write();
        let current = services.get(key).ok_or(Error::ServiceNotFound(*key))?;
        let entry = current.find_server(&server).ok_or(Error::ServerNotFound {
            service: *key,
            server,
        })?;

        entry.weight.store(weight, Ordering::Relaxed);
        let updated = current.with_servers(current.servers.clone());
        services.insert(*key, Arc::new(updated));
        info!("service {}: real server {} weight set to {}", key, server, weight);
        Ok(())
    }

    /// Takes a real server out of the pool. Connections already bound to it
    /// are not evicted; the server only stops receiving new flows.
    pub fn delete_server(&self, key: &ServiceKey, server: &RealServer) -> Result<()> {
        let mut services = self.services.write();
        let current = services.get(key).ok_or(Error::ServiceNotFound(*key))?;
        if current.find_server(server).is_none() {
            return Err(Error::ServerNotFound {
                service: *key,
                server: *server,
            });
        }

        let servers = current
            .servers
            .iter()
            .filter(|entry| entry.server != *server)
            .cloned()
            .collect();
        let updated = current.with_servers(servers);
        services.insert(*key, Arc::new(updated));
        info!("service {}: real server {} deleted", key, server);
        Ok(())
    }

    /// Drops every service. Returns how many were configured.
    pub fn flush(&self) -> usize {
        let removed = {
            let mut services = self.services.write();
            let removed = services.len();
            services.clear();
            removed
        };
        info!("registry flushed, {} services removed", removed);
        removed
    }

    /// All services, ordered by key.
    pub fn services(&self) -> Vec<Arc<Service>> {
        let mut services: Vec<Arc<Service>> = self.services.read().values().cloned().collect();
        services.sort_by_key(|service| service.key);
        services
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
