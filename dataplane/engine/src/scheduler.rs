/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Real server selection for new flows.
//!
//! A [`Scheduler`] is built for one immutable snapshot of a service's pool.
//! Whenever the pool or a weight changes the registry builds a fresh snapshot,
//! which also resets every cursor kept here.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::FlowKey;
use parking_lot::Mutex;

use crate::registry::ServerEntry;

/// Buckets of the source hashing lookup table.
pub const SH_TABLE_BITS: u32 = 8;
pub const SH_TABLE_SIZE: usize = 1 << SH_TABLE_BITS;

const GOLDEN_RATIO_32: u32 = 0x9E37_79B1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    SourceHash,
    SourceHashWithPort,
    WeightedRoundRobin,
    RoundRobin,
    LeastConnections,
}

impl Algorithm {
    /// Resolves an algorithm name and its options. Returns `None` for names
    /// the engine does not implement.
    pub fn parse(name: &str, options: &str) -> Option<Algorithm> {
        let with_port = options
            .split(|c: char| c == ',' || c.is_whitespace())
            .any(|opt| opt.eq_ignore_ascii_case("sh-port"));

        match name.trim().to_ascii_lowercase().as_str() {
            "sh" | "source_hash" if with_port => Some(Algorithm::SourceHashWithPort),
            "sh" | "source_hash" => Some(Algorithm::SourceHash),
            "source_hash_with_port" | "source_hash_with_source_port" => {
                Some(Algorithm::SourceHashWithPort)
            }
            "wrr" | "weighted_round_robin" => Some(Algorithm::WeightedRoundRobin),
            "rr" | "round_robin" => Some(Algorithm::RoundRobin),
            "lc" | "least_connections" => Some(Algorithm::LeastConnections),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::SourceHash => "source_hash",
            Algorithm::SourceHashWithPort => "source_hash_with_port",
            Algorithm::WeightedRoundRobin => "weighted_round_robin",
            Algorithm::RoundRobin => "round_robin",
            Algorithm::LeastConnections => "least_connections",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiplicative hash of the client address, reduced to a table bucket.
pub fn source_hash(client_ip: Ipv4Addr, client_port: Option<u16>) -> usize {
    let mut value = u32::from(client_ip);
    if let Some(port) = client_port {
        value = value.wrapping_add(port as u32);
    }
    (value.wrapping_mul(GOLDEN_RATIO_32) >> (32 - SH_TABLE_BITS)) as usize
}

// Fills the lookup table round-robin, each server keeping its turn for
// `weight` consecutive buckets.
fn build_sh_table(weights: &[u32]) -> Vec<usize> {
    let mut table = Vec::with_capacity(SH_TABLE_SIZE);
    let mut index = 0;
    let mut used = 0;
    for _ in 0..SH_TABLE_SIZE {
        table.push(index);
        used += 1;
        if used >= weights[index] {
            index = (index + 1) % weights.len();
            used = 0;
        }
    }
    table
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[derive(Debug)]
struct WrrCursor {
    index: usize,
    current_weight: i64,
}

#[derive(Debug)]
enum State {
    SourceHash {
        table: Vec<usize>,
        with_port: bool,
    },
    WeightedRoundRobin {
        weights: Vec<u32>,
        max_weight: i64,
        step: i64,
        cursor: Mutex<WrrCursor>,
    },
    RoundRobin {
        cursor: AtomicUsize,
    },
    LeastConnections,
}

/// Selection state for one pool snapshot.
#[derive(Debug)]
pub struct Scheduler {
    algorithm: Algorithm,
    state: State,
}

impl Scheduler {
    pub fn new(algorithm: Algorithm, servers: &[Arc<ServerEntry>]) -> Self {
        let weights: Vec<u32> = servers.iter().map(|s| s.weight().max(1)).collect();
        let state = match algorithm {
            Algorithm::SourceHash | Algorithm::SourceHashWithPort => State::SourceHash {
                table: if weights.is_empty() {
                    Vec::new()
                } else {
                    build_sh_table(&weights)
                },
                with_port: algorithm == Algorithm::SourceHashWithPort,
            },
            Algorithm::WeightedRoundRobin => {
                let max_weight = weights.iter().copied().max().unwrap_or(1) as i64;
                let step = weights.iter().copied().fold(0, gcd).max(1) as i64;
                State::WeightedRoundRobin {
                    cursor: Mutex::new(WrrCursor {
                        index: weights.len().saturating_sub(1),
                        current_weight: 0,
                    }),
                    weights,
                    max_weight,
                    step,
                }
            }
            Algorithm::RoundRobin => State::RoundRobin {
                cursor: AtomicUsize::new(0),
            },
            Algorithm::LeastConnections => State::LeastConnections,
        };
        Scheduler { algorithm, state }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Picks the server for a new flow. `servers` must be the pool this
    /// scheduler was built for.
    pub fn select(&self, servers: &[Arc<ServerEntry>], flow: &FlowKey) -> Option<Arc<ServerEntry>> {
        match servers.len() {
            0 => return None,
            1 => return Some(servers[0].clone()),
            _ => {}
        }

        let index = match &self.state {
            State::SourceHash { table, with_port } => {
                let port = with_port.then_some(flow.client_port);
                table[source_hash(flow.client_ip, port)]
            }
            State::WeightedRoundRobin {
                weights,
                max_weight,
                step,
                cursor,
            } => {
                let mut cursor = cursor.lock();
                loop {
                    cursor.index = (cursor.index + 1) % weights.len();
                    if cursor.index == 0 {
                        cursor.current_weight -= step;
                        if cursor.current_weight <= 0 {
                            cursor.current_weight = *max_weight;
                        }
                    }
                    if weights[cursor.index] as i64 >= cursor.current_weight {
                        break cursor.index;
                    }
                }
            }
            State::RoundRobin { cursor } => cursor.fetch_add(1, Ordering::Relaxed) % servers.len(),
            State::LeastConnections => {
                let mut best = 0;
                let mut best_load = u32::MAX;
                for (index, server) in servers.iter().enumerate() {
                    let load = server.active_connections();
                    if load < best_load {
                        best = index;
                        best_load = load;
                    }
                }
                best
            }
        };

        servers.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use common::{Protocol, RealServer};

    use super::*;

    fn pool(weights: &[u32]) -> Vec<Arc<ServerEntry>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, weight)| {
                Arc::new(ServerEntry::new(
                    RealServer::new(Ipv4Addr::new(10, 0, 1, i as u8 + 1), 80),
                    *weight,
                ))
            })
            .collect()
    }

    fn flow(client_ip: Ipv4Addr, client_port: u16) -> FlowKey {
        FlowKey::new(
            Ipv4Addr::new(10, 0, 0, 100),
            80,
            client_ip,
            client_port,
            Protocol::Tcp,
        )
    }

    fn tally(
        scheduler: &Scheduler,
        servers: &[Arc<ServerEntry>],
        flows: impl Iterator<Item = FlowKey>,
    ) -> HashMap<RealServer, usize> {
        let mut counts = HashMap::new();
        for flow in flows {
            let server = scheduler.select(servers, &flow).unwrap();
            *counts.entry(server.server()).or_default() += 1;
        }
        counts
    }

    #[test]
    fn parses_names_and_options() {
        assert_eq!(Algorithm::parse("sh", ""), Some(Algorithm::SourceHash));
        assert_eq!(
            Algorithm::parse("sh", "sh-port"),
            Some(Algorithm::SourceHashWithPort)
        );
        assert_eq!(
            Algorithm::parse("SOURCE_HASH_WITH_SOURCE_PORT", ""),
            Some(Algorithm::SourceHashWithPort)
        );
        assert_eq!(
            Algorithm::parse("wrr", ""),
            Some(Algorithm::WeightedRoundRobin)
        );
        assert_eq!(
            Algorithm::parse("least_connections", ""),
            Some(Algorithm::LeastConnections)
        );
        assert_eq!(Algorithm::parse("mh", ""), None);
    }

    #[test]
    fn empty_pool_has_no_server() {
        let scheduler = Scheduler::new(Algorithm::WeightedRoundRobin, &[]);
        assert!(scheduler
            .select(&[], &flow(Ipv4Addr::new(192, 168, 0, 1), 1000))
            .is_none());
    }

    #[test]
    fn single_server_always_wins() {
        let servers = pool(&[3]);
        for algorithm in [
            Algorithm::SourceHash,
            Algorithm::SourceHashWithPort,
            Algorithm::WeightedRoundRobin,
            Algorithm::RoundRobin,
            Algorithm::LeastConnections,
        ] {
            let scheduler = Scheduler::new(algorithm, &servers);
            for port in 0..20 {
                let picked = scheduler
                    .select(&servers, &flow(Ipv4Addr::new(192, 168, 0, port as u8), port))
                    .unwrap();
                assert!(Arc::ptr_eq(&picked, &servers[0]));
            }
        }
    }

    #[test]
    fn source_hash_ignores_client_port() {
        let servers = pool(&[1, 1, 1]);
        let scheduler = Scheduler::new(Algorithm::SourceHash, &servers);
        let client = Ipv4Addr::new(192, 168, 17, 1);

        let counts = tally(&scheduler, &servers, (0..50).map(|i| flow(client, 1024 + i)));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.values().sum::<usize>(), 50);
    }

    #[test]
    fn source_hash_spreads_distinct_clients_reproducibly() {
        let servers = pool(&[1, 1, 1]);
        let clients = || {
            (0..50u32).map(|i| flow(Ipv4Addr::from(u32::from(Ipv4Addr::new(192, 168, 18, 2)) + i), 80))
        };

        let first = tally(&Scheduler::new(Algorithm::SourceHash, &servers), &servers, clients());
        let second = tally(&Scheduler::new(Algorithm::SourceHash, &servers), &servers, clients());

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(first.values().sum::<usize>(), 50);
    }

    #[test]
    fn source_hash_with_port_varies_with_port() {
        let servers = pool(&[1, 1, 1]);
        let scheduler = Scheduler::new(Algorithm::SourceHashWithPort, &servers);
        let client = Ipv4Addr::new(192, 168, 17, 1);

        let counts = tally(&scheduler, &servers, (0..50).map(|i| flow(client, 2000 + i)));
        assert!(counts.len() > 1);

        let again = tally(&scheduler, &servers, (0..50).map(|i| flow(client, 2000 + i)));
        assert_eq!(counts, again);
    }

    #[test]
    fn source_hash_table_honours_weights() {
        let table = build_sh_table(&[1, 3]);
        assert_eq!(table.len(), SH_TABLE_SIZE);
        assert_eq!(table.iter().filter(|i| **i == 1).count(), 192);
        assert_eq!(&table[..4], &[0, 1, 1, 1]);
    }

    #[test]
    fn weighted_round_robin_is_proportional() {
        let servers = pool(&[1, 2, 3]);
        let scheduler = Scheduler::new(Algorithm::WeightedRoundRobin, &servers);
        let client = Ipv4Addr::new(192, 168, 0, 1);

        let counts = tally(&scheduler, &servers, (0..1200).map(|i| flow(client, i)));
        assert_eq!(counts[&servers[0].server()], 200);
        assert_eq!(counts[&servers[1].server()], 400);
        assert_eq!(counts[&servers[2].server()], 600);
    }

    #[test]
    fn weighted_round_robin_interleaves() {
        let servers = pool(&[4, 2]);
        let scheduler = Scheduler::new(Algorithm::WeightedRoundRobin, &servers);
        let client = Ipv4Addr::new(192, 168, 0, 1);

        let order: Vec<u8> = (0..6)
            .map(|i| scheduler.select(&servers, &flow(client, i)).unwrap().server().ip.octets()[3])
            .collect();
        assert_eq!(order, vec![1, 1, 2, 1, 1, 2]);
    }

    #[test]
    fn least_connections_prefers_idle_then_pool_order() {
        let servers = pool(&[1, 1, 1]);
        let scheduler = Scheduler::new(Algorithm::LeastConnections, &servers);
        let client = Ipv4Addr::new(192, 168, 0, 1);

        servers[0].connection_opened();
        servers[1].connection_opened();
        let picked = scheduler.select(&servers, &flow(client, 1)).unwrap();
        assert!(Arc::ptr_eq(&picked, &servers[2]));

        servers[2].connection_opened();
        let picked = scheduler.select(&servers, &flow(client, 2)).unwrap();
        assert!(Arc::ptr_eq(&picked, &servers[0]));
    }

    #[test]
    fn round_robin_cycles_in_pool_order() {
        let servers = pool(&[5, 1]);
        let scheduler = Scheduler::new(Algorithm::RoundRobin, &servers);
        let client = Ipv4Addr::new(192, 168, 0, 1);

        let counts = tally(&scheduler, &servers, (0..10).map(|i| flow(client, i)));
        assert_eq!(counts[&servers[0].server()], 5);
        assert_eq!(counts[&servers[1].server()], 5);
    }
}
