/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! The per-flow connection table.
//!
//! Entries live in a sharded concurrent map keyed by the flow 5-tuple. Every
//! mutation of an entry (touch, sweep, sync merge) happens under its shard's
//! write lock, so a sweep can never remove an entry while a packet is
//! refreshing it and readers only ever see complete entries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{ConnState, FlowKey, RealServer, TcpFlags};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::registry::ServerEntry;
use crate::tcp::LifecycleMonitor;
use crate::{Error, Result};

/// A tracked flow.
#[derive(Debug, Clone)]
pub struct Connection {
    pub key: FlowKey,
    pub server: Arc<ServerEntry>,
    pub state: ConnState,
    pub created: Instant,
    pub last_seen: Instant,
    pub deadline: Instant,
    /// Learned from a peer and not seen locally since.
    pub replicated: bool,
}

impl Connection {
    pub fn real_server(&self) -> RealServer {
        self.server.server()
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline <= now
    }
}

/// Outcome of applying a packet to a tracked flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touched {
    pub server: RealServer,
    pub state: ConnState,
    pub transitioned: bool,
}

pub struct ConnectionTable {
    entries: DashMap<FlowKey, Connection>,
    len: AtomicUsize,
    capacity: usize,
    monitor: LifecycleMonitor,
}

impl ConnectionTable {
    pub fn new(capacity: usize, shard_amount: usize, monitor: LifecycleMonitor) -> Self {
        ConnectionTable {
            entries: DashMap::with_shard_amount(shard_amount.max(2).next_power_of_two()),
            len: AtomicUsize::new(0),
            capacity,
            monitor,
        }
    }

    pub fn monitor(&self) -> &LifecycleMonitor {
        &self.monitor
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a copy of the entry for `key` unless it has expired by `now`.
    /// Expired entries wait for the next sweep but are never reported.
    pub fn lookup(&self, key: &FlowKey, now: Instant) -> Option<Connection> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(entry.value().clone())
    }

    // Reserves a slot against the capacity.
    fn reserve(&self) -> Result<()> {
        let previous = self.len.fetch_add(1, Ordering::AcqRel);
        if previous >= self.capacity {
            self.len.fetch_sub(1, Ordering::AcqRel);
            return Err(Error::TableFull(self.capacity));
        }
        Ok(())
    }

    /// Starts tracking a flow. Fails if the flow is already tracked, so
    /// exactly one concurrent caller wins for a given key. An expired entry
    /// still waiting for the sweeper is replaced.
    pub fn insert(
        &self,
        key: FlowKey,
        server: Arc<ServerEntry>,
        flags: TcpFlags,
        now: Instant,
    ) -> Result<Connection> {
        let (state, deadline) = self.monitor.open(key.protocol, flags, now);
        let connection = Connection {
            key,
            server,
            state,
            created: now,
            last_seen: now,
            deadline,
            replicated: false,
        };

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired(now) {
                    return Err(Error::ConnectionExists(key));
                }
                connection.server.connection_opened();
                let stale = occupied.insert(connection.clone());
                stale.server.connection_closed();
            }
            Entry::Vacant(vacant) => {
                self.reserve()?;
                connection.server.connection_opened();
                vacant.insert(connection.clone());
            }
        }
        Ok(connection)
    }

    /// Refreshes a tracked flow with a packet's flags. Expired entries are
    /// left alone and reported as missing.
    pub fn touch(&self, key: &FlowKey, flags: TcpFlags, now: Instant) -> Option<Touched> {
        let mut entry = self.entries.get_mut(key)?;
        let conn = entry.value_mut();
        if conn.is_expired(now) {
            return None;
        }
        let transitioned =
            self.monitor
                .observe(key.protocol, flags, &mut conn.state, &mut conn.deadline, now);
        conn.last_seen = now;
        conn.replicated = false;
        Some(Touched {
            server: conn.server.server(),
            state: conn.state,
            transitioned,
        })
    }

    /// Inserts or updates an entry learned from a peer, which holds it until
    /// `remote_deadline`. Applying the same record twice leaves the table as
    /// after the first application. Returns true if an entry was created or
    /// changed state.
    pub fn merge(
        &self,
        key: FlowKey,
        server: Arc<ServerEntry>,
        state: ConnState,
        remote_deadline: Instant,
        now: Instant,
    ) -> Result<bool> {
        if remote_deadline <= now {
            return Ok(false);
        }
        let connection = Connection {
            key,
            server,
            state,
            created: now,
            last_seen: now,
            deadline: remote_deadline,
            replicated: true,
        };

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) if !occupied.get().is_expired(now) => {
                let conn = occupied.get_mut();
                Ok(self
                    .monitor
                    .merge(state, remote_deadline, &mut conn.state, &mut conn.deadline))
            }
            Entry::Occupied(mut occupied) => {
                connection.server.connection_opened();
                let stale = occupied.insert(connection);
                stale.server.connection_closed();
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                self.reserve()?;
                connection.server.connection_opened();
                vacant.insert(connection);
                Ok(true)
            }
        }
    }

    /// Stops tracking a flow.
    pub fn remove(&self, key: &FlowKey) -> Option<Connection> {
        let (_, conn) = self.entries.remove(key)?;
        self.len.fetch_sub(1, Ordering::AcqRel);
        conn.server.connection_closed();
        Some(conn)
    }

    /// Removes every entry whose deadline is at or before `now`, handing each
    /// one to `on_expired`. Returns the number of entries removed.
    pub fn sweep<F>(&self, now: Instant, on_expired: F) -> usize
    where
        F: FnMut(&Connection),
    {
        self.remove_where(|conn| conn.is_expired(now), on_expired)
    }

    /// Visits every entry, expired or not.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Connection),
    {
        for entry in self.entries.iter() {
            f(entry.value());
        }
    }

    /// Drops every entry, handing each one to `on_removed`. Returns how many
    /// were tracked.
    pub fn clear<F>(&self, on_removed: F) -> usize
    where
        F: FnMut(&Connection),
    {
        self.remove_where(|_| true, on_removed)
    }

    fn remove_where<P, F>(&self, mut predicate: P, mut on_removed: F) -> usize
    where
        P: FnMut(&Connection) -> bool,
        F: FnMut(&Connection),
    {
        let mut removed = 0;
        self.entries.retain(|_, conn| {
            if !predicate(conn) {
                return true;
            }
            conn.server.connection_closed();
            on_removed(conn);
            removed += 1;
            false
        });
        self.len.fetch_sub(removed, Ordering::AcqRel);
        removed
    }
}
