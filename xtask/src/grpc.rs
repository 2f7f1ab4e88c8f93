/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Error;
use clap::{Args, Parser, Subcommand};
use tonic::transport::Channel;

use api_server::admin::admin_client::AdminClient;
use api_server::admin::{
    Empty, Flow, Server, Service, ServiceKey, SyncRequest, SyncRoleRequest,
};
use common::Protocol;

#[derive(Debug, Parser)]
pub struct Options {
    #[clap(default_value = "127.0.0.1", long)]
    pub server_ip: Ipv4Addr,
    #[clap(default_value = "9874", long)]
    pub server_port: u16,
    #[clap(subcommand)]
    pub command: AdminCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    AddService(ServiceArgs),
    EditService(ServiceArgs),
    RemoveService(KeyArgs),
    AddServer(ServerArgs),
    EditServer(ServerArgs),
    DeleteServer(ServerArgs),
    ListServices,
    Flush,
    GetConnection(FlowArgs),
    StartSync(SyncArgs),
    StopSync(RoleArgs),
    SyncStatus,
    Stats,
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    #[clap(default_value = "127.0.0.1", long)]
    pub vip: Ipv4Addr,
    #[clap(default_value = "8080", long)]
    pub port: u16,
    #[clap(default_value = "tcp", long)]
    pub protocol: Protocol,
}

impl KeyArgs {
    fn message(&self) -> ServiceKey {
        ServiceKey {
            vip: self.vip.into(),
            port: self.port.into(),
            protocol: self.protocol.number().into(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ServiceArgs {
    #[clap(flatten)]
    pub key: KeyArgs,
    #[clap(default_value = "wrr", long)]
    pub scheduler: String,
    #[clap(default_value = "", long)]
    pub options: String,
}

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[clap(flatten)]
    pub key: KeyArgs,
    #[clap(default_value = "127.0.0.1", long)]
    pub daddr: Ipv4Addr,
    #[clap(default_value = "8080", long)]
    pub dport: u16,
    #[clap(long)]
    pub weight: Option<u32>,
}

#[derive(Debug, Args)]
pub struct FlowArgs {
    #[clap(flatten)]
    pub key: KeyArgs,
    #[clap(long)]
    pub client_ip: Ipv4Addr,
    #[clap(long)]
    pub client_port: u16,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[clap(long)]
    pub role: String,
    #[clap(default_value = "0", long)]
    pub sync_id: u32,
    #[clap(long)]
    pub interface: Option<String>,
}

#[derive(Debug, Args)]
pub struct RoleArgs {
    #[clap(long)]
    pub role: String,
}

fn server_message(args: &ServerArgs) -> Server {
    Server {
        service: Some(args.key.message()),
        ip: args.daddr.into(),
        port: args.dport.into(),
        weight: args.weight,
    }
}

fn print_confirmation(verb: &str, confirmation: String) {
    println!("grpc server responded to {}: {}", verb, confirmation);
}

pub async fn run(opts: Options) -> Result<(), Error> {
    let server_addr = SocketAddr::from((opts.server_ip, opts.server_port));
    let mut client: AdminClient<Channel> =
        AdminClient::connect(format!("http://{server_addr}")).await?;

    use AdminCommand::*;
    match opts.command {
        AddService(args) => {
            let res = client
                .add_service(Service {
                    key: Some(args.key.message()),
                    scheduler: args.scheduler,
                    options: args.options,
                })
                .await?;
            print_confirmation("ADD SERVICE", res.into_inner().confirmation);
        }
        EditService(args) => {
            let res = client
                .edit_service(Service {
                    key: Some(args.key.message()),
                    scheduler: args.scheduler,
                    options: args.options,
                })
                .await?;
            print_confirmation("EDIT SERVICE", res.into_inner().confirmation);
        }
        RemoveService(args) => {
            let res = client.remove_service(args.message()).await?;
            print_confirmation("REMOVE SERVICE", res.into_inner().confirmation);
        }
        AddServer(args) => {
            let res = client.add_server(server_message(&args)).await?;
            print_confirmation("ADD SERVER", res.into_inner().confirmation);
        }
        EditServer(args) => {
            let res = client.edit_server(server_message(&args)).await?;
            print_confirmation("EDIT SERVER", res.into_inner().confirmation);
        }
        DeleteServer(args) => {
            let res = client.delete_server(server_message(&args)).await?;
            print_confirmation("DELETE SERVER", res.into_inner().confirmation);
        }
        ListServices => {
            let list = client.list_services(Empty {}).await?.into_inner();
            for service in list.services {
                let Some(key) = service.key else { continue };
                println!(
                    "{}:{} proto {} scheduler {} (effective {}) options {:?}",
                    Ipv4Addr::from(key.vip),
                    key.port,
                    key.protocol,
                    service.scheduler,
                    service.effective_scheduler,
                    service.options,
                );
                for server in service.servers {
                    println!(
                        "  -> {}:{} weight {} active {}",
                        Ipv4Addr::from(server.ip),
                        server.port,
                        server.weight,
                        server.active_connections,
                    );
                }
            }
        }
        Flush => {
            let res = client.flush(Empty {}).await?;
            print_confirmation("FLUSH", res.into_inner().confirmation);
        }
        GetConnection(args) => {
            let reply = client
                .get_connection(Flow {
                    vip: args.key.vip.into(),
                    vport: args.key.port.into(),
                    client_ip: args.client_ip.into(),
                    client_port: args.client_port.into(),
                    protocol: args.key.protocol.number().into(),
                })
                .await?
                .into_inner();
            match reply.connection {
                Some(conn) => println!(
                    "{}:{} state {} age {}ms",
                    Ipv4Addr::from(conn.server_ip),
                    conn.server_port,
                    conn.state,
                    conn.age_ms,
                ),
                None => println!("connection is not tracked"),
            }
        }
        StartSync(args) => {
            let res = client
                .start_state_sync(SyncRequest {
                    role: args.role,
                    sync_id: args.sync_id,
                    interface: args.interface,
                })
                .await?;
            print_confirmation("START SYNC", res.into_inner().confirmation);
        }
        StopSync(args) => {
            let res = client
                .stop_state_sync(SyncRoleRequest { role: args.role })
                .await?;
            print_confirmation("STOP SYNC", res.into_inner().confirmation);
        }
        SyncStatus => {
            let status = client.get_sync_status(Empty {}).await?.into_inner();
            println!(
                "master {} (sync id {}), backup {} (sync id {})",
                status.master_bit, status.m_sync_id, status.backup_bit, status.b_sync_id
            );
        }
        Stats => {
            let stats = client.get_stats(Empty {}).await?.into_inner();
            println!("{:#?}", stats);
        }
    }

    Ok(())
}
