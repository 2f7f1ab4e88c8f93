/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::net::Ipv4Addr;
use std::sync::Arc;

use common::{FlowKey, Protocol, RealServer, ServiceKey, SyncRole};
use engine::{Dataplane, Error as EngineError, SyncController};
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::admin::admin_server::Admin;
use crate::admin::{
    Confirmation, Connection, ConnectionReply, Empty, Flow, Server, ServerInfo, Service,
    ServiceInfo, ServiceKey as ServiceKeyMsg, ServiceList, Stats, SyncRequest, SyncRoleRequest,
    SyncStatus,
};

pub struct AdminService {
    dataplane: Arc<Dataplane>,
    sync: Arc<SyncController>,
}

impl AdminService {
    pub fn new(dataplane: Arc<Dataplane>, sync: Arc<SyncController>) -> AdminService {
        AdminService { dataplane, sync }
    }
}

fn status_from(err: EngineError) -> Status {
    match err {
        EngineError::ServiceExists(_)
        | EngineError::ServerExists { .. }
        | EngineError::ConnectionExists(_) => Status::already_exists(err.to_string()),
        EngineError::ServiceNotFound(_) | EngineError::ServerNotFound { .. } => {
            Status::not_found(err.to_string())
        }
        EngineError::InvalidWeight(_) | EngineError::InvalidInterface(_) => {
            Status::invalid_argument(err.to_string())
        }
        EngineError::TableFull(_) => Status::resource_exhausted(err.to_string()),
        EngineError::SyncAlreadyRunning(_) | EngineError::SyncNotRunning(_) => {
            Status::failed_precondition(err.to_string())
        }
        EngineError::Netlink(_) | EngineError::Io(_) | EngineError::Decode(_) => {
            Status::internal(format!("failure: {}", err))
        }
    }
}

fn port(value: u32, what: &str) -> Result<u16, Status> {
    u16::try_from(value)
        .map_err(|_| Status::invalid_argument(format!("{} {} is out of range", what, value)))
}

fn protocol(value: u32) -> Result<Protocol, Status> {
    Protocol::try_from(value).map_err(|err| Status::invalid_argument(err.to_string()))
}

fn service_key(key: Option<ServiceKeyMsg>) -> Result<ServiceKey, Status> {
    let key = key.ok_or_else(|| Status::invalid_argument("missing service vip, port and protocol"))?;
    Ok(ServiceKey::new(
        Ipv4Addr::from(key.vip),
        port(key.port, "service port")?,
        protocol(key.protocol)?,
    ))
}

fn sync_role(role: &str) -> Result<SyncRole, Status> {
    role.parse()
        .map_err(|err: common::ParseError| Status::invalid_argument(err.to_string()))
}

fn confirm(message: String) -> Response<Confirmation> {
    Response::new(Confirmation {
        confirmation: message,
    })
}

#[tonic::async_trait]
impl Admin for AdminService {
    async fn add_service(&self, request: Request<Service>) -> Result<Response<Confirmation>, Status> {
        let service = request.into_inner();
        let key = service_key(service.key)?;

        self.dataplane
            .registry()
            .add_service(key, &service.scheduler, &service.options)
            .map_err(status_from)?;
        Ok(confirm(format!("success, service {} was added", key)))
    }

    async fn edit_service(&self, request: Request<Service>) -> Result<Response<Confirmation>, Status> {
        let service = request.into_inner();
        let key = service_key(service.key)?;

        self.dataplane
            .registry()
            .edit_service(key, &service.scheduler, &service.options)
            .map_err(status_from)?;
        Ok(confirm(format!("success, service {} was updated", key)))
    }

    async fn remove_service(
        &self,
        request: Request<ServiceKeyMsg>,
    ) -> Result<Response<Confirmation>, Status> {
        let key = service_key(Some(request.into_inner()))?;

        self.dataplane
            .registry()
            .remove_service(&key)
            .map_err(status_from)?;
        Ok(confirm(format!("success, service {} was removed", key)))
    }

    async fn add_server(&self, request: Request<Server>) -> Result<Response<Confirmation>, Status> {
        let server = request.into_inner();
        let key = service_key(server.service)?;
        let real = RealServer::new(Ipv4Addr::from(server.ip), port(server.port, "server port")?);

        self.dataplane
            .registry()
            .add_server(&key, real, server.weight.unwrap_or(1))
            .map_err(status_from)?;
        Ok(confirm(format!(
            "success, real server {} was added to service {}",
            real, key
        )))
    }

    async fn edit_server(&self, request: Request<Server>) -> Result<Response<Confirmation>, Status> {
        let server = request.into_inner();
        let key = service_key(server.service)?;
        let real = RealServer::new(Ipv4Addr::from(server.ip), port(server.port, "server port")?);
        let weight = server
            .weight
            .ok_or_else(|| Status::invalid_argument("missing weight"))?;

        self.dataplane
            .registry()
            .edit_server(&key, real, weight)
            .map_err(status_from)?;
        Ok(confirm(format!(
            "success, real server {} of service {} now has weight {}",
            real, key, weight
        )))
    }

    async fn delete_server(&self, request: Request<Server>) -> Result<Response<Confirmation>, Status> {
        let server = request.into_inner();
        let key = service_key(server.service)?;
        let real = RealServer::new(Ipv4Addr::from(server.ip), port(server.port, "server port")?);

        self.dataplane
            .registry()
            .delete_server(&key, &real)
            .map_err(status_from)?;
        Ok(confirm(format!(
            "success, real server {} was deleted from service {}",
            real, key
        )))
    }

    async fn list_services(&self, _request: Request<Empty>) -> Result<Response<ServiceList>, Status> {
        let services = self
            .dataplane
            .registry()
            .services()
            .iter()
            .map(|service| {
                let key = service.key();
                ServiceInfo {
                    key: Some(ServiceKeyMsg {
                        vip: key.vip.into(),
                        port: key.port as u32,
                        protocol: key.protocol.number() as u32,
                    }),
                    scheduler: service.requested_algorithm().to_string(),
                    effective_scheduler: service.algorithm().to_string(),
                    options: service.options().to_string(),
                    servers: service
                        .servers()
                        .iter()
                        .map(|entry| ServerInfo {
                            ip: entry.server().ip.into(),
                            port: entry.server().port as u32,
                            weight: entry.weight(),
                            active_connections: entry.active_connections(),
                        })
                        .collect(),
                }
            })
            .collect();
        Ok(Response::new(ServiceList { services }))
    }

    async fn flush(&self, _request: Request<Empty>) -> Result<Response<Confirmation>, Status> {
        self.dataplane.flush();
        Ok(confirm("success, all services and connections were flushed".to_string()))
    }

    async fn get_connection(&self, request: Request<Flow>) -> Result<Response<ConnectionReply>, Status> {
        let flow = request.into_inner();
        let key = FlowKey::new(
            Ipv4Addr::from(flow.vip),
            port(flow.vport, "virtual port")?,
            Ipv4Addr::from(flow.client_ip),
            port(flow.client_port, "client port")?,
            protocol(flow.protocol)?,
        );

        let connection = self.dataplane.get_connection(&key).map(|info| Connection {
            server_ip: info.server.ip.into(),
            server_port: info.server.port as u32,
            state: info.state.to_string(),
            age_ms: info.age.as_millis() as u64,
        });
        debug!("connection lookup for {}: {:?}", key, connection);
        Ok(Response::new(ConnectionReply { connection }))
    }

    async fn start_state_sync(
        &self,
        request: Request<SyncRequest>,
    ) -> Result<Response<Confirmation>, Status> {
        let sync = request.into_inner();
        let role = sync_role(&sync.role)?;

        self.sync
            .start(role, sync.sync_id, sync.interface.as_deref())
            .await
            .map_err(status_from)?;
        Ok(confirm(format!(
            "success, {} sync daemon started with sync id {}",
            role, sync.sync_id
        )))
    }

    async fn stop_state_sync(
        &self,
        request: Request<SyncRoleRequest>,
    ) -> Result<Response<Confirmation>, Status> {
        let role = sync_role(&request.into_inner().role)?;

        self.sync.stop(role).await.map_err(status_from)?;
        Ok(confirm(format!("success, {} sync daemon stopped", role)))
    }

    async fn get_sync_status(&self, _request: Request<Empty>) -> Result<Response<SyncStatus>, Status> {
        let (master_bit, backup_bit, m_sync_id, b_sync_id) = self.sync.status().as_tuple();
        Ok(Response::new(SyncStatus {
            master_bit,
            backup_bit,
            m_sync_id,
            b_sync_id,
        }))
    }

    async fn get_stats(&self, _request: Request<Empty>) -> Result<Response<Stats>, Status> {
        let stats = self.dataplane.stats();
        Ok(Response::new(Stats {
            packets: stats.packets,
            forwarded: stats.forwarded,
            new_connections: stats.new_connections,
            dropped_no_service: stats.dropped_no_service,
            dropped_no_server: stats.dropped_no_server,
            table_full: stats.table_full,
            expired: stats.expired,
            sync_frames_sent: stats.sync_frames_sent,
            sync_records_applied: stats.sync_records_applied,
            sync_records_dropped: stats.sync_records_dropped,
            tracked_connections: self.dataplane.table().len() as u64,
        }))
    }
}
