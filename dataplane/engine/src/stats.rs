/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters updated from the packet path and the sync tasks.
#[derive(Debug, Default)]
pub struct Stats {
    pub packets: AtomicU64,
    pub forwarded: AtomicU64,
    pub new_connections: AtomicU64,
    pub dropped_no_service: AtomicU64,
    pub dropped_no_server: AtomicU64,
    pub table_full: AtomicU64,
    pub expired: AtomicU64,
    pub sync_frames_sent: AtomicU64,
    pub sync_records_applied: AtomicU64,
    pub sync_records_dropped: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub packets: u64,
    pub forwarded: u64,
    pub new_connections: u64,
    pub dropped_no_service: u64,
    pub dropped_no_server: u64,
    pub table_full: u64,
    pub expired: u64,
    pub sync_frames_sent: u64,
    pub sync_records_applied: u64,
    pub sync_records_dropped: u64,
}

pub(crate) fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn add(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
}

impl Stats {
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            packets: load(&self.packets),
            forwarded: load(&self.forwarded),
            new_connections: load(&self.new_connections),
            dropped_no_service: load(&self.dropped_no_service),
            dropped_no_server: load(&self.dropped_no_server),
            table_full: load(&self.table_full),
            expired: load(&self.expired),
            sync_frames_sent: load(&self.sync_frames_sent),
            sync_records_applied: load(&self.sync_records_applied),
            sync_records_dropped: load(&self.sync_records_dropped),
        }
    }
}
