/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use common::{ConnState, FlowKey, RealServer, TcpFlags};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::conntrack::ConnectionTable;
use crate::registry::ServiceRegistry;
use crate::scheduler::Algorithm;
use crate::stats::{self, Stats, StatsSnapshot};
use crate::sync::{SyncOp, SyncQueue, SyncRecord};
use crate::tcp::LifecycleMonitor;
use crate::Error;

// A flow whose slot is claimed by another worker is retried this many times
// before the packet is dropped.
const MAX_ADMISSION_ATTEMPTS: usize = 3;

/// A packet as seen by the engine: its flow, the TCP control bits (empty for
/// UDP) and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub flow: FlowKey,
    pub flags: TcpFlags,
    pub len: usize,
}

impl Packet {
    pub fn new(flow: FlowKey, flags: TcpFlags, len: usize) -> Self {
        Packet { flow, flags, len }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No virtual service matches the flow.
    NoService,
    /// The matching service has an empty pool.
    NoServer,
    /// The connection table is at capacity.
    TableFull,
    /// Admission kept racing with other workers.
    Contended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Forward(RealServer),
    Drop(DropReason),
}

/// Result of a `get_connection` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub server: RealServer,
    pub state: ConnState,
    pub age: Duration,
}

/// The packet-processing engine: registry, scheduler, connection table and
/// the queue feeding the master sync daemon. Shared by every worker.
pub struct Dataplane {
    config: EngineConfig,
    registry: ServiceRegistry,
    table: ConnectionTable,
    stats: Stats,
    sync_queue: SyncQueue,
    sweeps: AtomicU64,
}

impl Dataplane {
    pub fn new(config: EngineConfig) -> Self {
        let fallback = Algorithm::parse(&config.fallback_algorithm, "").unwrap_or_else(|| {
            warn!(
                "fallback algorithm {:?} is not supported, using {}",
                config.fallback_algorithm,
                Algorithm::RoundRobin
            );
            Algorithm::RoundRobin
        });
        let table = ConnectionTable::new(
            config.table_capacity,
            config.shard_amount,
            LifecycleMonitor::new(config.timeouts),
        );
        Dataplane {
            registry: ServiceRegistry::new(fallback),
            table,
            stats: Stats::default(),
            sync_queue: SyncQueue::default(),
            sweeps: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn table(&self) -> &ConnectionTable {
        &self.table
    }

    pub fn sync_queue(&self) -> &SyncQueue {
        &self.sync_queue
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn counters(&self) -> &Stats {
        &self.stats
    }

    pub fn process(&self, packet: &Packet) -> Verdict {
        self.process_at(packet, Instant::now())
    }

    /// Runs one packet through the engine at time `now`.
    ///
    /// A tracked flow is refreshed and forwarded to its server. An untracked
    /// flow is scheduled and admitted if it matches a service, or dropped.
    pub fn process_at(&self, packet: &Packet, now: Instant) -> Verdict {
        stats::incr(&self.stats.packets);
        let flow = packet.flow;

        for _ in 0..MAX_ADMISSION_ATTEMPTS {
            if let Some(touched) = self.table.touch(&flow, packet.flags, now) {
                if touched.transitioned {
                    self.publish_state(&flow, now);
                }
                stats::incr(&self.stats.forwarded);
                return Verdict::Forward(touched.server);
            }

            let Some(service) = self.registry.lookup(&flow.service_key()) else {
                stats::incr(&self.stats.dropped_no_service);
                return Verdict::Drop(DropReason::NoService);
            };
            let Some(server) = service.select(&flow) else {
                stats::incr(&self.stats.dropped_no_server);
                return Verdict::Drop(DropReason::NoServer);
            };

            match self.table.insert(flow, server, packet.flags, now) {
                Ok(conn) => {
                    stats::incr(&self.stats.new_connections);
                    stats::incr(&self.stats.forwarded);
                    if self.sync_queue.is_active() {
                        self.sync_queue.publish(SyncRecord::upsert(&conn, now), &self.stats);
                    }
                    return Verdict::Forward(conn.real_server());
                }
                // Another worker admitted the flow first, go round again and
                // take the fast path.
                Err(Error::ConnectionExists(_)) => continue,
                Err(err) => {
                    stats::incr(&self.stats.table_full);
                    warn!("rejecting new flow {}: {}", flow, err);
                    return Verdict::Drop(DropReason::TableFull);
                }
            }
        }

        Verdict::Drop(DropReason::Contended)
    }

    fn publish_state(&self, flow: &FlowKey, now: Instant) {
        if !self.sync_queue.is_active() {
            return;
        }
        if let Some(conn) = self.table.lookup(flow, now) {
            self.sync_queue.publish(SyncRecord::upsert(&conn, now), &self.stats);
        }
    }

    /// Looks up a tracked flow.
    pub fn get_connection(&self, flow: &FlowKey) -> Option<ConnectionInfo> {
        self.get_connection_at(flow, Instant::now())
    }

    pub fn get_connection_at(&self, flow: &FlowKey, now: Instant) -> Option<ConnectionInfo> {
        self.table.lookup(flow, now).map(|conn| ConnectionInfo {
            server: conn.real_server(),
            state: conn.state,
            age: conn.age(now),
        })
    }

    /// Drops every service and every tracked connection. A running master
    /// announces the removals.
    pub fn flush(&self) {
        self.registry.flush();
        let publishing = self.sync_queue.is_active();
        let removed = self.table.clear(|conn| {
            if publishing {
                self.sync_queue
                    .publish(SyncRecord::delete(&conn.key), &self.stats);
            }
        });
        debug!("flush removed {} tracked connections", removed);
    }

    /// Expires connections whose deadline has passed and, while the master
    /// role runs, asks it to re-announce the survivors every
    /// `refresh_every_sweeps` sweeps. Returns how many connections expired.
    pub fn sweep(&self, now: Instant) -> usize {
        let publishing = self.sync_queue.is_active();
        let removed = self.table.sweep(now, |conn| {
            if publishing {
                self.sync_queue
                    .publish(SyncRecord::delete(&conn.key), &self.stats);
            }
        });
        if removed > 0 {
            stats::add(&self.stats.expired, removed as u64);
            debug!("sweep expired {} connections", removed);
        }

        let sweeps = self.sweeps.fetch_add(1, Ordering::Relaxed) + 1;
        let every = self.config.sync.refresh_every_sweeps.max(1) as u64;
        if publishing && sweeps % every == 0 {
            self.sync_queue.request_refresh();
        }
        removed
    }

    /// Flows admitted by this node that are still live at `now`. Entries
    /// learned from a peer are left to the peer that owns them.
    pub fn local_flows(&self, now: Instant) -> Vec<FlowKey> {
        let mut flows = Vec::new();
        self.table.for_each(|conn| {
            if !conn.replicated && !conn.is_expired(now) {
                flows.push(conn.key);
            }
        });
        flows
    }

    /// The upsert re-announcing a locally owned flow, if it is still live.
    pub fn announcement(&self, flow: &FlowKey, now: Instant) -> Option<SyncRecord> {
        self.table
            .lookup(flow, now)
            .filter(|conn| !conn.replicated)
            .map(|conn| SyncRecord::upsert(&conn, now))
    }

    /// Merges one replicated record into the local table. Records for
    /// services or servers this node does not know are ignored. Returns true
    /// if the record was applied. Deleting an untracked flow is not.
    pub fn apply_sync_record(&self, record: &SyncRecord, now: Instant) -> bool {
        let Some(flow) = record.flow_key() else {
            debug!("ignoring sync record with an invalid flow");
            return false;
        };

        let applied = match record.op() {
            SyncOp::Delete => self.table.remove(&flow).is_some(),
            SyncOp::Upsert => self.apply_upsert(record, flow, now),
        };
        if applied {
            stats::incr(&self.stats.sync_records_applied);
        }
        applied
    }

    fn apply_upsert(&self, record: &SyncRecord, flow: FlowKey, now: Instant) -> bool {
        let (Some(server), Some(state)) = (record.real_server(), record.conn_state()) else {
            debug!("ignoring malformed sync record for {}", flow);
            return false;
        };
        let Some(service) = self.registry.lookup(&flow.service_key()) else {
            debug!("ignoring sync record for unknown service {}", flow.service_key());
            return false;
        };

        // The server may have left the pool since the master scheduled it;
        // an existing entry keeps its own reference.
        let entry = match service.find_server(&server) {
            Some(entry) => entry.clone(),
            None => match self.table.lookup(&flow, now) {
                Some(conn) if conn.real_server() == server => conn.server,
                _ => {
                    debug!("ignoring sync record for unknown server {}", server);
                    return false;
                }
            },
        };

        // Never hold the flow longer than the sender does.
        let deadline =
            self.table
                .monitor()
                .remote_deadline(flow.protocol, state, record.remaining(), now);
        match self.table.merge(flow, entry, state, deadline, now) {
            Ok(_) => true,
            Err(err) => {
                warn!("failed to apply sync record for {}: {}", flow, err);
                false
            }
        }
    }
}
