/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Datagram channels carrying sync frames between nodes.

use std::collections::HashSet;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};

use async_trait::async_trait;
use common::SyncRole;
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::config::SyncConfig;
use crate::netutils::{if_ipv4_addr, if_nametoindex, set_multicast_if};
use crate::{Error, Result};

/// Largest frame a backup accepts.
pub const MAX_FRAME_SIZE: usize = 65_507;

/// An open channel for one sync role.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn send(&self, frame: &[u8]) -> io::Result<()>;

    /// Waits for the next frame and copies it into `buf`.
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens transports for the daemon. Opening validates the interface, so a
/// failed open leaves no state behind.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn open(&self, role: SyncRole, interface: &str) -> Result<Box<dyn SyncTransport>>;
}

/// UDP multicast, the transport used between real nodes.
#[derive(Debug, Clone)]
pub struct MulticastFactory {
    group: Ipv4Addr,
    port: u16,
}

impl MulticastFactory {
    pub fn new(config: &SyncConfig) -> Self {
        MulticastFactory {
            group: config.group,
            port: config.port,
        }
    }
}

#[async_trait]
impl TransportFactory for MulticastFactory {
    async fn open(&self, role: SyncRole, interface: &str) -> Result<Box<dyn SyncTransport>> {
        let ifindex = if_nametoindex(interface)?;
        let local = if_ipv4_addr(interface)?;
        debug!(
            "opening {} sync transport on {} (index {}, {})",
            role, interface, ifindex, local
        );

        let socket = match role {
            SyncRole::Master => {
                let socket = UdpSocket::bind(SocketAddrV4::new(local, 0)).await?;
                socket.set_multicast_ttl_v4(1)?;
                socket.set_multicast_loop_v4(true)?;
                set_multicast_if(&socket, local)?;
                socket
            }
            SyncRole::Backup => {
                let socket =
                    UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.port)).await?;
                socket.join_multicast_v4(self.group, local)?;
                socket
            }
        };

        Ok(Box::new(MulticastTransport {
            socket,
            destination: SocketAddrV4::new(self.group, self.port),
        }))
    }
}

struct MulticastTransport {
    socket: UdpSocket,
    destination: SocketAddrV4,
}

#[async_trait]
impl SyncTransport for MulticastTransport {
    async fn send(&self, frame: &[u8]) -> io::Result<()> {
        self.socket.send_to(frame, self.destination).await?;
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let (len, _) = self.socket.recv_from(buf).await?;
        Ok(len)
    }
}

/// An in-process bus. Every transport opened from the same factory sees the
/// frames sent by the others, which lets a master and a backup talk without
/// a multicast capable network.
#[derive(Debug, Clone)]
pub struct LoopbackFactory {
    bus: broadcast::Sender<Vec<u8>>,
    interfaces: HashSet<String>,
}

impl LoopbackFactory {
    /// A bus on which only the listed interface names are considered valid.
    pub fn new<I, S>(interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (bus, _) = broadcast::channel(1024);
        LoopbackFactory {
            bus,
            interfaces: interfaces.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl TransportFactory for LoopbackFactory {
    async fn open(&self, _role: SyncRole, interface: &str) -> Result<Box<dyn SyncTransport>> {
        if !self.interfaces.contains(interface) {
            return Err(Error::InvalidInterface(interface.to_string()));
        }
        Ok(Box::new(LoopbackTransport {
            bus: self.bus.clone(),
            inbox: Mutex::new(self.bus.subscribe()),
        }))
    }
}

struct LoopbackTransport {
    bus: broadcast::Sender<Vec<u8>>,
    inbox: Mutex<broadcast::Receiver<Vec<u8>>>,
}

#[async_trait]
impl SyncTransport for LoopbackTransport {
    async fn send(&self, frame: &[u8]) -> io::Result<()> {
        // Nobody listening is not an error for a datagram transport.
        let _ = self.bus.send(frame.to_vec());
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inbox = self.inbox.lock().await;
        loop {
            match inbox.recv().await {
                Ok(frame) => {
                    let len = frame.len().min(buf.len());
                    buf[..len].copy_from_slice(&frame[..len]);
                    return Ok(len);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("loopback sync transport lagged, {} frames lost", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "loopback bus closed",
                    ));
                }
            }
        }
    }
}
