/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Master/backup replication of the connection table.
//!
//! The master role drains a bounded queue of table mutations fed by the
//! packet path and multicasts them in batches. The backup role listens for
//! frames carrying its sync id and merges them into the local table. Both
//! roles are independent tasks and either can run alone or together.

mod message;
mod transport;

pub use message::{SyncFrame, SyncOp, SyncRecord};
pub use transport::{
    LoopbackFactory, MulticastFactory, SyncTransport, TransportFactory, MAX_FRAME_SIZE,
};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{FlowKey, SyncRole};
use parking_lot::{Mutex, RwLock};
use prost::Message;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::dataplane::Dataplane;
use crate::stats::{self, Stats};
use crate::{Error, Result};

const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Where the packet path publishes table mutations. Publishing never blocks:
/// with no master running records are discarded, and with a full queue they
/// are dropped and counted. Re-announcing the whole table does not go through
/// the queue; the sweeper only raises a flag and the master pages through the
/// table itself.
#[derive(Debug, Default)]
pub struct SyncQueue {
    sender: RwLock<Option<mpsc::Sender<SyncRecord>>>,
    refresh: AtomicBool,
}

impl SyncQueue {
    pub fn is_active(&self) -> bool {
        self.sender.read().is_some()
    }

    /// True while a re-announcement is pending.
    pub fn refresh_requested(&self) -> bool {
        self.refresh.load(Ordering::Acquire)
    }

    pub(crate) fn request_refresh(&self) {
        self.refresh.store(true, Ordering::Release);
    }

    fn take_refresh_request(&self) -> bool {
        self.refresh.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn publish(&self, record: SyncRecord, stats: &Stats) -> bool {
        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            return false;
        };
        if sender.try_send(record).is_err() {
            stats::incr(&stats.sync_records_dropped);
            return false;
        }
        true
    }

    fn attach(&self, sender: mpsc::Sender<SyncRecord>) {
        self.refresh.store(false, Ordering::Release);
        *self.sender.write() = Some(sender);
    }

    fn detach(&self) {
        *self.sender.write() = None;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoleStatus {
    pub active: bool,
    pub sync_id: u32,
}

/// Replication status of both roles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub master: RoleStatus,
    pub backup: RoleStatus,
}

impl SyncStatus {
    /// `(master_bit, backup_bit, m_sync_id, b_sync_id)`
    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (
            self.master.active as u32,
            self.backup.active as u32,
            self.master.sync_id,
            self.backup.sync_id,
        )
    }
}

struct RoleHandle {
    sync_id: u32,
    interface: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Starts, stops and reports the two sync roles of a node.
pub struct SyncController {
    dataplane: Arc<Dataplane>,
    factory: Arc<dyn TransportFactory>,
    default_interface: String,
    // Serializes start and stop so a role is never opened twice.
    ops: tokio::sync::Mutex<()>,
    master: Mutex<Option<RoleHandle>>,
    backup: Mutex<Option<RoleHandle>>,
}

impl SyncController {
    pub fn new(
        dataplane: Arc<Dataplane>,
        factory: Arc<dyn TransportFactory>,
        default_interface: impl Into<String>,
    ) -> Self {
        SyncController {
            dataplane,
            factory,
            default_interface: default_interface.into(),
            ops: tokio::sync::Mutex::new(()),
            master: Mutex::new(None),
            backup: Mutex::new(None),
        }
    }

    pub fn dataplane(&self) -> &Arc<Dataplane> {
        &self.dataplane
    }

    fn slot(&self, role: SyncRole) -> &Mutex<Option<RoleHandle>> {
        match role {
            SyncRole::Master => &self.master,
            SyncRole::Backup => &self.backup,
        }
    }

    /// Starts a role. `interface` defaults to the controller's interface.
    /// On failure the role stays inactive and nothing else changes.
    pub async fn start(&self, role: SyncRole, sync_id: u32, interface: Option<&str>) -> Result<()> {
        let _ops = self.ops.lock().await;
        if self.slot(role).lock().is_some() {
            return Err(Error::SyncAlreadyRunning(role));
        }

        let interface = interface.unwrap_or(self.default_interface.as_str()).to_string();
        let transport = match self.factory.open(role, &interface).await {
            Ok(transport) => transport,
            Err(err) => {
                warn!("failed to start {} sync daemon on {}: {}", role, interface, err);
                return Err(err);
            }
        };

        let config = self.dataplane.config().sync.clone();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = match role {
            SyncRole::Master => {
                let (sender, receiver) = mpsc::channel(config.queue_depth.max(1));
                self.dataplane.sync_queue().attach(sender);
                tokio::spawn(run_master(
                    transport,
                    receiver,
                    sync_id,
                    config,
                    self.dataplane.clone(),
                    shutdown_rx,
                ))
            }
            SyncRole::Backup => tokio::spawn(run_backup(
                transport,
                sync_id,
                self.dataplane.clone(),
                shutdown_rx,
            )),
        };

        *self.slot(role).lock() = Some(RoleHandle {
            sync_id,
            interface: interface.clone(),
            shutdown,
            task,
        });
        info!("{} sync daemon started, sync id {}, interface {}", role, sync_id, interface);
        Ok(())
    }

    /// Stops a role without touching the other one.
    pub async fn stop(&self, role: SyncRole) -> Result<()> {
        let _ops = self.ops.lock().await;
        let handle = self
            .slot(role)
            .lock()
            .take()
            .ok_or(Error::SyncNotRunning(role))?;

        if role == SyncRole::Master {
            self.dataplane.sync_queue().detach();
        }
        let _ = handle.shutdown.send(());
        let mut task = handle.task;
        if timeout(STOP_TIMEOUT, &mut task).await.is_err() {
            warn!("{} sync daemon did not stop in time, aborting it", role);
            task.abort();
        }

        info!(
            "{} sync daemon stopped, sync id {}, interface {}",
            role, handle.sync_id, handle.interface
        );
        Ok(())
    }

    /// Stops whichever roles are running.
    pub async fn stop_all(&self) {
        for role in [SyncRole::Master, SyncRole::Backup] {
            if self.slot(role).lock().is_some() {
                let _ = self.stop(role).await;
            }
        }
    }

    pub fn status(&self) -> SyncStatus {
        let role_status = |slot: &Mutex<Option<RoleHandle>>| {
            slot.lock()
                .as_ref()
                .map(|handle| RoleStatus {
                    active: true,
                    sync_id: handle.sync_id,
                })
                .unwrap_or_default()
        };
        SyncStatus {
            master: role_status(&self.master),
            backup: role_status(&self.backup),
        }
    }
}

async fn send_frame(
    transport: &dyn SyncTransport,
    sync_id: u32,
    batch: &mut Vec<SyncRecord>,
    stats: &Stats,
) {
    if batch.is_empty() {
        return;
    }
    let frame = SyncFrame {
        sync_id,
        records: std::mem::take(batch),
    };
    match transport.send(&frame.encode_to_vec()).await {
        Ok(()) => stats::incr(&stats.sync_frames_sent),
        Err(err) => {
            warn!("failed to send sync frame: {}", err);
            stats::add(&stats.sync_records_dropped, frame.records.len() as u64);
        }
    }
}

// Sends up to `max_frames` frames of upserts for the flows at the front of
// `pending`. Flows that expired or were handed over meanwhile are skipped.
async fn send_announcements(
    transport: &dyn SyncTransport,
    sync_id: u32,
    dataplane: &Dataplane,
    pending: &mut VecDeque<FlowKey>,
    max_records: usize,
    max_frames: usize,
) {
    let now = Instant::now();
    let mut batch = Vec::with_capacity(max_records);
    for _ in 0..max_frames.max(1) {
        while batch.len() < max_records {
            let Some(flow) = pending.pop_front() else {
                break;
            };
            if let Some(record) = dataplane.announcement(&flow, now) {
                batch.push(record);
            }
        }
        if batch.is_empty() {
            break;
        }
        send_frame(transport, sync_id, &mut batch, dataplane.counters()).await;
    }
}

async fn run_master(
    transport: Box<dyn SyncTransport>,
    mut records: mpsc::Receiver<SyncRecord>,
    sync_id: u32,
    config: SyncConfig,
    dataplane: Arc<Dataplane>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let max_records = config.max_records_per_frame.max(1);
    let mut batch = Vec::with_capacity(max_records);
    let mut ticker = interval(config.flush_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Announce what is already tracked so a running backup catches up.
    let mut pending: VecDeque<FlowKey> = dataplane.local_flows(Instant::now()).into();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            record = records.recv() => match record {
                Some(record) => {
                    batch.push(record);
                    if batch.len() >= max_records {
                        send_frame(transport.as_ref(), sync_id, &mut batch, dataplane.counters()).await;
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {
                send_frame(transport.as_ref(), sync_id, &mut batch, dataplane.counters()).await;
                if pending.is_empty() && dataplane.sync_queue().take_refresh_request() {
                    pending.extend(dataplane.local_flows(Instant::now()));
                    debug!("re-announcing {} connections", pending.len());
                }
                send_announcements(
                    transport.as_ref(),
                    sync_id,
                    &dataplane,
                    &mut pending,
                    max_records,
                    config.refresh_frames_per_flush,
                )
                .await;
            }
        }
    }

    while let Ok(record) = records.try_recv() {
        batch.push(record);
        if batch.len() >= max_records {
            send_frame(transport.as_ref(), sync_id, &mut batch, dataplane.counters()).await;
        }
    }
    send_frame(transport.as_ref(), sync_id, &mut batch, dataplane.counters()).await;
    debug!("master sync task exiting");
}

async fn run_backup(
    transport: Box<dyn SyncTransport>,
    sync_id: u32,
    dataplane: Arc<Dataplane>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; MAX_FRAME_SIZE];
    loop {
        let received = tokio::select! {
            _ = &mut shutdown => break,
            received = transport.recv(&mut buf) => received,
        };
        match received {
            Ok(len) => {
                if let Err(err) = apply_frame(&dataplane, sync_id, &buf[..len]) {
                    debug!("dropping sync frame: {}", err);
                }
            }
            Err(err) => {
                warn!("backup sync transport failed: {}", err);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
    debug!("backup sync task exiting");
}

/// Decodes a frame and merges its records if it belongs to `sync_id`.
/// Returns how many records were applied.
pub fn apply_frame(dataplane: &Dataplane, sync_id: u32, bytes: &[u8]) -> Result<usize> {
    let frame = SyncFrame::decode(bytes)?;
    if frame.sync_id != sync_id {
        debug!(
            "ignoring sync frame for sync id {} (ours is {})",
            frame.sync_id, sync_id
        );
        return Ok(0);
    }

    let now = Instant::now();
    Ok(frame
        .records
        .iter()
        .filter(|record| dataplane.apply_sync_record(record, now))
        .count())
}
