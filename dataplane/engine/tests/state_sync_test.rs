/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{ConnState, FlowKey, Protocol, RealServer, ServiceKey, SyncRole, TcpFlags};
use engine::sync::{apply_frame, LoopbackFactory, SyncFrame, SyncRecord, TransportFactory};
use engine::{Dataplane, EngineConfig, Error, Packet, SyncController, Verdict};
use prost::Message;

const VIP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 100);

fn service() -> ServiceKey {
    ServiceKey::new(VIP, 80, Protocol::Tcp)
}

fn backend() -> RealServer {
    RealServer::new(Ipv4Addr::new(192, 168, 1, 1), 80)
}

fn flow(client_port: u16) -> FlowKey {
    FlowKey::new(VIP, 80, Ipv4Addr::new(192, 168, 17, 1), client_port, Protocol::Tcp)
}

fn fast_flush() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.sync.flush_interval_ms = 10;
    config
}

fn dataplane_with(config: EngineConfig) -> anyhow::Result<Arc<Dataplane>> {
    let dataplane = Dataplane::new(config);
    dataplane.registry().add_service(service(), "rr", "")?;
    dataplane.registry().add_server(&service(), backend(), 1)?;
    Ok(Arc::new(dataplane))
}

fn configured_dataplane() -> anyhow::Result<Arc<Dataplane>> {
    dataplane_with(fast_flush())
}

fn controller_with(
    factory: &Arc<LoopbackFactory>,
    config: EngineConfig,
) -> anyhow::Result<SyncController> {
    let factory: Arc<dyn TransportFactory> = factory.clone();
    Ok(SyncController::new(dataplane_with(config)?, factory, "lo"))
}

fn controller(factory: &Arc<LoopbackFactory>) -> anyhow::Result<SyncController> {
    controller_with(factory, fast_flush())
}

async fn wait_for<F: Fn() -> bool>(condition: F) -> anyhow::Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn roles_are_independently_controllable() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let sync = controller(&factory)?;

    sync.start(SyncRole::Master, 0, None).await?;
    assert_eq!(sync.status().as_tuple(), (1, 0, 0, 0));
    sync.stop(SyncRole::Master).await?;

    sync.start(SyncRole::Backup, 10, None).await?;
    assert_eq!(sync.status().as_tuple(), (0, 1, 0, 10));
    sync.stop(SyncRole::Backup).await?;

    sync.start(SyncRole::Master, 7, None).await?;
    sync.start(SyncRole::Backup, 17, Some("lo")).await?;
    assert_eq!(sync.status().as_tuple(), (1, 1, 7, 17));

    sync.stop(SyncRole::Master).await?;
    assert_eq!(sync.status().as_tuple(), (0, 1, 0, 17));
    sync.stop(SyncRole::Backup).await?;
    assert_eq!(sync.status().as_tuple(), (0, 0, 0, 0));

    sync.start(SyncRole::Master, 5, None).await?;
    sync.start(SyncRole::Backup, 3, None).await?;
    assert_eq!(sync.status().as_tuple(), (1, 1, 5, 3));

    sync.stop_all().await;
    assert_eq!(sync.status().as_tuple(), (0, 0, 0, 0));
    Ok(())
}

#[tokio::test]
async fn invalid_interface_leaves_status_untouched() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let sync = controller(&factory)?;

    let err = sync
        .start(SyncRole::Master, 0, Some("no-such-nic"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInterface(_)));
    assert_eq!(sync.status().as_tuple(), (0, 0, 0, 0));
    Ok(())
}

#[tokio::test]
async fn start_and_stop_report_role_conflicts() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let sync = controller(&factory)?;

    assert!(matches!(
        sync.stop(SyncRole::Backup).await,
        Err(Error::SyncNotRunning(SyncRole::Backup))
    ));

    sync.start(SyncRole::Backup, 4, None).await?;
    assert!(matches!(
        sync.start(SyncRole::Backup, 9, None).await,
        Err(Error::SyncAlreadyRunning(SyncRole::Backup))
    ));
    assert_eq!(sync.status().as_tuple(), (0, 1, 0, 4));

    sync.stop_all().await;
    Ok(())
}

#[tokio::test]
async fn backup_converges_on_master_table() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let master = controller(&factory)?;
    let backup = controller(&factory)?;

    backup.start(SyncRole::Backup, 1, None).await?;
    master.start(SyncRole::Master, 1, None).await?;

    let master_dp = master.dataplane().clone();
    let backup_dp = backup.dataplane().clone();

    master_dp.process(&Packet::new(flow(1), TcpFlags::SYN, 60));
    master_dp.process(&Packet::new(flow(2), TcpFlags::SYN, 60));
    wait_for(|| backup_dp.table().len() == 2).await?;
    assert_eq!(
        backup_dp.get_connection(&flow(1)).map(|info| info.server),
        Some(backend())
    );

    master_dp.process(&Packet::new(flow(2), TcpFlags::FIN, 60));
    wait_for(|| {
        backup_dp
            .get_connection(&flow(2))
            .is_some_and(|info| info.state == ConnState::FinWait)
    })
    .await?;

    master.stop_all().await;
    backup.stop_all().await;
    assert!(master_dp.stats().sync_frames_sent > 0);
    assert!(backup_dp.stats().sync_records_applied >= 3);
    Ok(())
}

#[tokio::test]
async fn backup_ignores_other_sync_domains() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let master = controller(&factory)?;
    let backup = controller(&factory)?;

    backup.start(SyncRole::Backup, 2, None).await?;
    master.start(SyncRole::Master, 1, None).await?;

    let master_dp = master.dataplane().clone();
    let backup_dp = backup.dataplane().clone();
    master_dp.process(&Packet::new(flow(1), TcpFlags::SYN, 60));
    wait_for(|| master_dp.stats().sync_frames_sent > 0).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(backup_dp.table().is_empty());

    master.stop_all().await;
    backup.stop_all().await;
    Ok(())
}

#[test]
fn replayed_and_reordered_frames_are_absorbed() -> anyhow::Result<()> {
    let dataplane = configured_dataplane()?;
    let now = Instant::now();
    let source = configured_dataplane()?;
    source.process_at(&Packet::new(flow(1), TcpFlags::SYN, 60), now);
    source.process_at(&Packet::new(flow(1), TcpFlags::RST, 60), now);
    let closing = source.table().lookup(&flow(1), now).expect("tracked");

    let upsert = SyncFrame {
        sync_id: 9,
        records: vec![SyncRecord::upsert(&closing, now)],
    }
    .encode_to_vec();
    let delete = SyncFrame {
        sync_id: 9,
        records: vec![SyncRecord::delete(&flow(1))],
    }
    .encode_to_vec();

    assert_eq!(apply_frame(&dataplane, 9, &upsert)?, 1);
    assert_eq!(apply_frame(&dataplane, 9, &upsert)?, 1);
    assert_eq!(dataplane.table().len(), 1);
    assert_eq!(
        dataplane.get_connection(&flow(1)).map(|info| info.state),
        Some(ConnState::Closing)
    );

    assert_eq!(apply_frame(&dataplane, 9, &delete)?, 1);
    assert_eq!(apply_frame(&dataplane, 9, &delete)?, 0);
    assert!(dataplane.table().is_empty());
    assert_eq!(dataplane.stats().sync_records_applied, 3);

    assert_eq!(apply_frame(&dataplane, 8, &upsert)?, 0);
    assert!(matches!(
        apply_frame(&dataplane, 9, &[0xff, 0xff, 0xff]),
        Err(Error::Decode(_))
    ));
    assert!(dataplane.table().is_empty());
    Ok(())
}

#[test]
fn records_for_unknown_services_are_ignored() -> anyhow::Result<()> {
    let dataplane = Dataplane::new(EngineConfig::default());
    let source = configured_dataplane()?;
    let now = Instant::now();
    source.process_at(&Packet::new(flow(1), TcpFlags::SYN, 60), now);
    let conn = source.table().lookup(&flow(1), now).expect("tracked");

    assert!(!dataplane.apply_sync_record(&SyncRecord::upsert(&conn, now), now));
    assert!(dataplane.table().is_empty());
    Ok(())
}

#[test]
fn deleting_an_untracked_flow_is_not_counted() -> anyhow::Result<()> {
    let dataplane = configured_dataplane()?;
    let now = Instant::now();

    assert!(!dataplane.apply_sync_record(&SyncRecord::delete(&flow(1)), now));
    assert_eq!(dataplane.stats().sync_records_applied, 0);
    Ok(())
}

// Both nodes run master and backup and announce to each other every 30s.
// Neither side may extend the other's deadline, so an idle flow still expires.
#[test]
fn mutual_refreshes_do_not_keep_idle_flows_alive() -> anyhow::Result<()> {
    let a = configured_dataplane()?;
    let b = configured_dataplane()?;
    let start = Instant::now();
    a.process_at(&Packet::new(flow(1), TcpFlags::SYN, 60), start);

    let exchange = |from: &Dataplane, to: &Dataplane, now: Instant| {
        for key in from.local_flows(now) {
            if let Some(record) = from.announcement(&key, now) {
                to.apply_sync_record(&record, now);
            }
        }
        // a peer that echoes everything it holds, learned entries included
        let mut held = Vec::new();
        from.table()
            .for_each(|conn| held.push(SyncRecord::upsert(conn, now)));
        for record in held {
            to.apply_sync_record(&record, now);
        }
    };

    for step in 1..=40u64 {
        let now = start + Duration::from_secs(30 * step);
        a.sweep(now);
        b.sweep(now);
        exchange(&a, &b, now);
        exchange(&b, &a, now);

        if now < start + Duration::from_secs(300) {
            assert!(a.get_connection_at(&flow(1), now).is_some());
            assert!(b.get_connection_at(&flow(1), now).is_some());
            assert!(b.local_flows(now).is_empty());
            assert_eq!(a.local_flows(now), vec![flow(1)]);
        } else {
            assert!(a.table().is_empty(), "flow outlived its idle timeout at {:?}", now - start);
            assert!(b.table().is_empty(), "replica outlived its idle timeout at {:?}", now - start);
        }
    }
    Ok(())
}

#[test]
fn replicated_deadline_follows_the_sender() -> anyhow::Result<()> {
    let source = configured_dataplane()?;
    let replica = configured_dataplane()?;
    let start = Instant::now();
    source.process_at(&Packet::new(flow(1), TcpFlags::SYN, 60), start);

    let later = start + Duration::from_secs(200);
    let conn = source.table().lookup(&flow(1), later).expect("tracked");
    assert!(replica.apply_sync_record(&SyncRecord::upsert(&conn, later), later));

    let replicated = replica.table().lookup(&flow(1), later).expect("replicated");
    assert!(replicated.replicated);
    assert_eq!(replicated.deadline, start + Duration::from_secs(300));
    assert!(replica.announcement(&flow(1), later).is_none());

    // local traffic makes the replica the owner
    replica.process_at(&Packet::new(flow(1), TcpFlags::ACK, 60), later);
    assert_eq!(replica.local_flows(later), vec![flow(1)]);
    Ok(())
}

#[tokio::test]
async fn full_queue_drops_and_counts_without_blocking() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let mut config = fast_flush();
    config.sync.queue_depth = 4;
    let master = controller_with(&factory, config)?;
    master.start(SyncRole::Master, 1, None).await?;
    let dataplane = master.dataplane().clone();

    // nothing drains the queue until this task yields
    for port in 0..10 {
        let verdict = dataplane.process(&Packet::new(flow(port), TcpFlags::SYN, 60));
        assert_eq!(verdict, Verdict::Forward(backend()));
    }
    assert_eq!(dataplane.stats().sync_records_dropped, 6);
    assert_eq!(dataplane.table().len(), 10);

    master.stop_all().await;
    Ok(())
}

#[tokio::test]
async fn sweeps_request_periodic_refreshes() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let mut config = fast_flush();
    config.sync.refresh_every_sweeps = 3;
    let master = controller_with(&factory, config)?;
    let dataplane = master.dataplane().clone();
    let now = Instant::now();

    // without a master there is nobody to refresh for
    for _ in 0..3 {
        dataplane.sweep(now);
    }
    assert!(!dataplane.sync_queue().refresh_requested());

    master.start(SyncRole::Master, 1, None).await?;
    dataplane.sweep(now);
    dataplane.sweep(now);
    assert!(!dataplane.sync_queue().refresh_requested());
    dataplane.sweep(now);
    assert!(dataplane.sync_queue().refresh_requested());

    // the master picks the request up on its next flush
    wait_for(|| !dataplane.sync_queue().refresh_requested()).await?;
    master.stop_all().await;
    Ok(())
}

#[tokio::test]
async fn late_backup_converges_through_a_small_queue() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let mut config = fast_flush();
    config.sync.queue_depth = 4;
    config.sync.refresh_every_sweeps = 1;
    config.sync.max_records_per_frame = 3;
    config.sync.refresh_frames_per_flush = 2;
    let master = controller_with(&factory, config)?;
    let backup = controller(&factory)?;
    let master_dp = master.dataplane().clone();
    let backup_dp = backup.dataplane().clone();

    master.start(SyncRole::Master, 1, None).await?;
    for port in 0..10 {
        master_dp.process(&Packet::new(flow(port), TcpFlags::SYN, 60));
    }
    assert!(master_dp.stats().sync_records_dropped > 0);

    // let the master flush its queue and its startup announcement to nobody
    tokio::time::sleep(Duration::from_millis(200)).await;
    backup.start(SyncRole::Backup, 1, None).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(backup_dp.table().is_empty());

    wait_for(|| {
        master_dp.sweep(Instant::now());
        backup_dp.table().len() == 10
    })
    .await?;
    for port in 0..10 {
        assert_eq!(
            backup_dp.get_connection(&flow(port)).map(|info| info.server),
            Some(backend())
        );
    }

    master.stop_all().await;
    backup.stop_all().await;
    Ok(())
}

#[tokio::test]
async fn flush_is_replicated() -> anyhow::Result<()> {
    let factory = Arc::new(LoopbackFactory::new(["lo"]));
    let master = controller(&factory)?;
    let backup = controller(&factory)?;
    let master_dp = master.dataplane().clone();
    let backup_dp = backup.dataplane().clone();

    backup.start(SyncRole::Backup, 3, None).await?;
    master.start(SyncRole::Master, 3, None).await?;
    for port in 0..3 {
        master_dp.process(&Packet::new(flow(port), TcpFlags::SYN, 60));
    }
    wait_for(|| backup_dp.table().len() == 3).await?;

    master_dp.flush();
    assert!(master_dp.table().is_empty());
    wait_for(|| backup_dp.table().is_empty()).await?;

    master.stop_all().await;
    backup.stop_all().await;
    Ok(())
}
