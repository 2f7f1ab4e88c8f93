/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Value types shared by the dataplane engine, the admin API and the loader.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported ip protocol: {0}")]
    Protocol(String),
    #[error("unknown sync role: {0}")]
    SyncRole(String),
    #[error("unknown connection state: {0}")]
    ConnState(u32),
}

/// Transport protocol of a virtual service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn number(self) -> u8 {
        match self {
            Protocol::Tcp => IPPROTO_TCP,
            Protocol::Udp => IPPROTO_UDP,
        }
    }
}

impl TryFrom<u32> for Protocol {
    type Error = ParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            v if v == IPPROTO_TCP as u32 => Ok(Protocol::Tcp),
            v if v == IPPROTO_UDP as u32 => Ok(Protocol::Udp),
            other => Err(ParseError::Protocol(other.to_string())),
        }
    }
}

impl FromStr for Protocol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" | "6" => Ok(Protocol::Tcp),
            "udp" | "17" => Ok(Protocol::Udp),
            _ => Err(ParseError::Protocol(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Udp => f.write_str("udp"),
        }
    }
}

/// Identifies a virtual service: unique by VIP, port and protocol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceKey {
    pub vip: Ipv4Addr,
    pub port: u16,
    pub protocol: Protocol,
}

impl ServiceKey {
    pub fn new(vip: Ipv4Addr, port: u16, protocol: Protocol) -> Self {
        ServiceKey {
            vip,
            port,
            protocol,
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.protocol, self.vip, self.port)
    }
}

/// A backend endpoint traffic can be forwarded to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RealServer {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl RealServer {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        RealServer { ip, port }
    }
}

impl fmt::Display for RealServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// The 5-tuple identifying a client flow towards a virtual service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowKey {
    pub vip: Ipv4Addr,
    pub vport: u16,
    pub client_ip: Ipv4Addr,
    pub client_port: u16,
    pub protocol: Protocol,
}

impl FlowKey {
    pub fn new(
        vip: Ipv4Addr,
        vport: u16,
        client_ip: Ipv4Addr,
        client_port: u16,
        protocol: Protocol,
    ) -> Self {
        FlowKey {
            vip,
            vport,
            client_ip,
            client_port,
            protocol,
        }
    }

    pub fn service_key(&self) -> ServiceKey {
        ServiceKey {
            vip: self.vip,
            port: self.vport,
            protocol: self.protocol,
        }
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} -> {}:{}",
            self.protocol, self.client_ip, self.client_port, self.vip, self.vport
        )
    }
}

/// TCP control bits as they appear in byte 13 of the TCP header.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct TcpFlags(u8);

impl TcpFlags {
    pub const FIN: TcpFlags = TcpFlags(0x01);
    pub const SYN: TcpFlags = TcpFlags(0x02);
    pub const RST: TcpFlags = TcpFlags(0x04);
    pub const PSH: TcpFlags = TcpFlags(0x08);
    pub const ACK: TcpFlags = TcpFlags(0x10);
    pub const URG: TcpFlags = TcpFlags(0x20);

    pub const fn empty() -> Self {
        TcpFlags(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        TcpFlags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: TcpFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn fin(self) -> bool {
        self.contains(TcpFlags::FIN)
    }

    pub const fn syn(self) -> bool {
        self.contains(TcpFlags::SYN)
    }

    pub const fn rst(self) -> bool {
        self.contains(TcpFlags::RST)
    }

    pub const fn ack(self) -> bool {
        self.contains(TcpFlags::ACK)
    }
}

impl BitOr for TcpFlags {
    type Output = TcpFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        TcpFlags(self.0 | rhs.0)
    }
}

impl fmt::Debug for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TcpFlags, &str); 6] = [
            (TcpFlags::SYN, "SYN"),
            (TcpFlags::FIN, "FIN"),
            (TcpFlags::RST, "RST"),
            (TcpFlags::PSH, "PSH"),
            (TcpFlags::ACK, "ACK"),
            (TcpFlags::URG, "URG"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "[{}]", names.join(","))
    }
}

/// Lifecycle of a tracked connection. Each state selects the expiry class used to
/// compute the entry's deadline: `Active` is the DATA idle class, `FinWait` is
/// FIN_SEEN and `Closing` is RST_SEEN.
///
/// The ordering is by severity, a connection only ever moves towards `Closing`.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConnState {
    #[default]
    Active,
    FinWait,
    Closing,
}

impl ConnState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnState::Active => "ACTIVE",
            ConnState::FinWait => "FIN_WAIT",
            ConnState::Closing => "CLOSING",
        }
    }
}

impl From<ConnState> for u32 {
    fn from(state: ConnState) -> u32 {
        match state {
            ConnState::Active => 0,
            ConnState::FinWait => 1,
            ConnState::Closing => 2,
        }
    }
}

impl TryFrom<u32> for ConnState {
    type Error = ParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ConnState::Active),
            1 => Ok(ConnState::FinWait),
            2 => Ok(ConnState::Closing),
            other => Err(ParseError::ConnState(other)),
        }
    }
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// High-availability role of the connection state sync daemon.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncRole {
    Master,
    Backup,
}

impl FromStr for SyncRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "master" => Ok(SyncRole::Master),
            "backup" => Ok(SyncRole::Backup),
            _ => Err(ParseError::SyncRole(s.to_string())),
        }
    }
}

impl fmt::Display for SyncRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncRole::Master => f.write_str("master"),
            SyncRole::Backup => f.write_str("backup"),
        }
    }
}
