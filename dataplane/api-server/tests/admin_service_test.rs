/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Result;
use api_server::admin::admin_server::Admin;
use api_server::admin::{
    Empty, Flow, Server, Service, ServiceKey, SyncRequest, SyncRoleRequest,
};
use api_server::server::AdminService;
use common::{FlowKey, Protocol, TcpFlags};
use engine::sync::{LoopbackFactory, TransportFactory};
use engine::{Dataplane, EngineConfig, Packet, SyncController};
use tonic::{Code, Request};

const VIP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 100);

fn setup() -> (Arc<Dataplane>, AdminService) {
    let dataplane = Arc::new(Dataplane::new(EngineConfig::default()));
    let factory: Arc<dyn TransportFactory> = Arc::new(LoopbackFactory::new(["lo"]));
    let sync = Arc::new(SyncController::new(dataplane.clone(), factory, "lo"));
    let admin = AdminService::new(dataplane.clone(), sync);
    (dataplane, admin)
}

fn key() -> ServiceKey {
    ServiceKey {
        vip: VIP.into(),
        port: 80,
        protocol: 6,
    }
}

fn server(last: u8, weight: Option<u32>) -> Server {
    Server {
        service: Some(key()),
        ip: Ipv4Addr::new(192, 168, 1, last).into(),
        port: 8080,
        weight,
    }
}

fn service(scheduler: &str) -> Service {
    Service {
        key: Some(key()),
        scheduler: scheduler.to_string(),
        options: String::new(),
    }
}

#[tokio::test]
async fn test_service_and_server_lifecycle() -> Result<()> {
    let (_, admin) = setup();

    admin.add_service(Request::new(service("wrr"))).await?;
    let err = admin
        .add_service(Request::new(service("sh")))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::AlreadyExists);

    admin.add_server(Request::new(server(1, None))).await?;
    admin.add_server(Request::new(server(2, Some(3)))).await?;
    let err = admin
        .add_server(Request::new(server(3, Some(0))))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);

    admin.edit_server(Request::new(server(1, Some(2)))).await?;
    admin.delete_server(Request::new(server(2, None))).await?;
    let err = admin
        .delete_server(Request::new(server(2, None)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);

    let list = admin
        .list_services(Request::new(Empty {}))
        .await?
        .into_inner();
    assert_eq!(list.services.len(), 1);
    let info = &list.services[0];
    assert_eq!(info.scheduler, "wrr");
    assert_eq!(info.effective_scheduler, "weighted_round_robin");
    assert_eq!(info.servers.len(), 1);
    assert_eq!(info.servers[0].weight, 2);

    admin.remove_service(Request::new(key())).await?;
    let err = admin
        .remove_service(Request::new(key()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_unsupported_scheduler_is_accepted() -> Result<()> {
    let (_, admin) = setup();

    admin.add_service(Request::new(service("mh"))).await?;
    let list = admin
        .list_services(Request::new(Empty {}))
        .await?
        .into_inner();
    assert_eq!(list.services[0].scheduler, "mh");
    assert_eq!(list.services[0].effective_scheduler, "round_robin");
    Ok(())
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected() -> Result<()> {
    let (_, admin) = setup();

    let missing_key = Service {
        key: None,
        scheduler: "rr".to_string(),
        options: String::new(),
    };
    let err = admin
        .add_service(Request::new(missing_key))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);

    let bad_protocol = Service {
        key: Some(ServiceKey {
            protocol: 1,
            ..key()
        }),
        ..service("rr")
    };
    let err = admin
        .add_service(Request::new(bad_protocol))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);

    let bad_port = ServiceKey {
        port: 70000,
        ..key()
    };
    let err = admin.remove_service(Request::new(bad_port)).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    Ok(())
}

#[tokio::test]
async fn test_get_connection() -> Result<()> {
    let (dataplane, admin) = setup();
    admin.add_service(Request::new(service("rr"))).await?;
    admin.add_server(Request::new(server(1, None))).await?;

    let client = Ipv4Addr::new(192, 168, 17, 1);
    let flow = Flow {
        vip: VIP.into(),
        vport: 80,
        client_ip: client.into(),
        client_port: 40000,
        protocol: 6,
    };

    let reply = admin
        .get_connection(Request::new(flow.clone()))
        .await?
        .into_inner();
    assert!(reply.connection.is_none());

    let key = FlowKey::new(VIP, 80, client, 40000, Protocol::Tcp);
    dataplane.process(&Packet::new(key, TcpFlags::SYN, 60));
    dataplane.process(&Packet::new(key, TcpFlags::FIN | TcpFlags::ACK, 60));

    let connection = admin
        .get_connection(Request::new(flow))
        .await?
        .into_inner()
        .connection
        .expect("connection is tracked");
    assert_eq!(connection.server_ip, u32::from(Ipv4Addr::new(192, 168, 1, 1)));
    assert_eq!(connection.server_port, 8080);
    assert_eq!(connection.state, "FIN_WAIT");

    let stats = admin.get_stats(Request::new(Empty {})).await?.into_inner();
    assert_eq!(stats.packets, 2);
    assert_eq!(stats.new_connections, 1);
    assert_eq!(stats.tracked_connections, 1);

    admin.flush(Request::new(Empty {})).await?;
    let stats = admin.get_stats(Request::new(Empty {})).await?.into_inner();
    assert_eq!(stats.tracked_connections, 0);
    Ok(())
}

async fn status(admin: &AdminService) -> Result<(u32, u32, u32, u32)> {
    let status = admin
        .get_sync_status(Request::new(Empty {}))
        .await?
        .into_inner();
    Ok((
        status.master_bit,
        status.backup_bit,
        status.m_sync_id,
        status.b_sync_id,
    ))
}

#[tokio::test]
async fn test_state_sync_status() -> Result<()> {
    let (_, admin) = setup();
    let err = admin
        .start_state_sync(Request::new(SyncRequest {
            role: "master".to_string(),
            sync_id: 0,
            interface: Some("eth42".to_string()),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    assert_eq!(status(&admin).await?, (0, 0, 0, 0));

    admin
        .start_state_sync(Request::new(SyncRequest {
            role: "master".to_string(),
            sync_id: 7,
            interface: None,
        }))
        .await?;
    admin
        .start_state_sync(Request::new(SyncRequest {
            role: "backup".to_string(),
            sync_id: 17,
            interface: Some("lo".to_string()),
        }))
        .await?;
    assert_eq!(status(&admin).await?, (1, 1, 7, 17));

    let err = admin
        .start_state_sync(Request::new(SyncRequest {
            role: "backup".to_string(),
            sync_id: 1,
            interface: None,
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::FailedPrecondition);

    admin
        .stop_state_sync(Request::new(SyncRoleRequest {
            role: "master".to_string(),
        }))
        .await?;
    assert_eq!(status(&admin).await?, (0, 1, 0, 17));

    let err = admin
        .stop_state_sync(Request::new(SyncRoleRequest {
            role: "primary".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);

    admin
        .stop_state_sync(Request::new(SyncRoleRequest {
            role: "backup".to_string(),
        }))
        .await?;
    assert_eq!(status(&admin).await?, (0, 0, 0, 0));
    Ok(())
}
