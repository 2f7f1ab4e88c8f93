/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Protobuf frames exchanged between the master and backup daemons.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use common::{ConnState, FlowKey, Protocol, RealServer};

use crate::conntrack::Connection;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SyncFrame {
    #[prost(uint32, tag = "1")]
    pub sync_id: u32,
    #[prost(message, repeated, tag = "2")]
    pub records: ::prost::alloc::vec::Vec<SyncRecord>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SyncRecord {
    #[prost(enumeration = "SyncOp", tag = "1")]
    pub op: i32,
    #[prost(uint32, tag = "2")]
    pub vip: u32,
    #[prost(uint32, tag = "3")]
    pub vport: u32,
    #[prost(uint32, tag = "4")]
    pub client_ip: u32,
    #[prost(uint32, tag = "5")]
    pub client_port: u32,
    #[prost(uint32, tag = "6")]
    pub protocol: u32,
    #[prost(uint32, tag = "7")]
    pub server_ip: u32,
    #[prost(uint32, tag = "8")]
    pub server_port: u32,
    #[prost(uint32, tag = "9")]
    pub state: u32,
    /// Milliseconds the entry has left on the sender.
    #[prost(uint64, tag = "10")]
    pub remaining_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SyncOp {
    Upsert = 0,
    Delete = 1,
}

impl SyncRecord {
    /// Snapshot of `conn` as of `now`.
    pub fn upsert(conn: &Connection, now: Instant) -> Self {
        let server = conn.real_server();
        let remaining = conn.deadline.saturating_duration_since(now);
        SyncRecord {
            op: SyncOp::Upsert as i32,
            server_ip: server.ip.into(),
            server_port: server.port as u32,
            state: conn.state.into(),
            remaining_ms: u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            ..SyncRecord::for_flow(&conn.key)
        }
    }

    pub fn delete(key: &FlowKey) -> Self {
        SyncRecord {
            op: SyncOp::Delete as i32,
            ..SyncRecord::for_flow(key)
        }
    }

    fn for_flow(key: &FlowKey) -> Self {
        SyncRecord {
            op: SyncOp::Upsert as i32,
            vip: key.vip.into(),
            vport: key.vport as u32,
            client_ip: key.client_ip.into(),
            client_port: key.client_port as u32,
            protocol: key.protocol.number() as u32,
            server_ip: 0,
            server_port: 0,
            state: 0,
            remaining_ms: 0,
        }
    }

    /// The flow this record refers to, if its fields are in range.
    pub fn flow_key(&self) -> Option<FlowKey> {
        Some(FlowKey::new(
            Ipv4Addr::from(self.vip),
            u16::try_from(self.vport).ok()?,
            Ipv4Addr::from(self.client_ip),
            u16::try_from(self.client_port).ok()?,
            Protocol::try_from(self.protocol).ok()?,
        ))
    }

    pub fn real_server(&self) -> Option<RealServer> {
        Some(RealServer::new(
            Ipv4Addr::from(self.server_ip),
            u16::try_from(self.server_port).ok()?,
        ))
    }

    pub fn conn_state(&self) -> Option<ConnState> {
        ConnState::try_from(self.state).ok()
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prost::Message;

    use super::*;
    use crate::registry::ServerEntry;

    #[test]
    fn frame_survives_the_wire() {
        let key = FlowKey::new(
            Ipv4Addr::new(10, 0, 0, 100),
            80,
            Ipv4Addr::new(192, 168, 0, 7),
            40123,
            Protocol::Tcp,
        );
        let now = Instant::now();
        let conn = Connection {
            key,
            server: Arc::new(ServerEntry::new(
                RealServer::new(Ipv4Addr::new(10, 0, 1, 2), 8080),
                1,
            )),
            state: ConnState::FinWait,
            created: now,
            last_seen: now,
            deadline: now + Duration::from_secs(42),
            replicated: false,
        };

        let frame = SyncFrame {
            sync_id: 7,
            records: vec![SyncRecord::upsert(&conn, now), SyncRecord::delete(&key)],
        };
        let decoded = SyncFrame::decode(frame.encode_to_vec().as_slice()).unwrap();

        assert_eq!(decoded.sync_id, 7);
        let upsert = &decoded.records[0];
        assert_eq!(upsert.op(), SyncOp::Upsert);
        assert_eq!(upsert.flow_key(), Some(key));
        assert_eq!(
            upsert.real_server(),
            Some(RealServer::new(Ipv4Addr::new(10, 0, 1, 2), 8080))
        );
        assert_eq!(upsert.conn_state(), Some(ConnState::FinWait));
        assert_eq!(upsert.remaining(), Duration::from_secs(42));
        assert_eq!(decoded.records[1].op(), SyncOp::Delete);
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let record = SyncRecord {
            vport: 70000,
            protocol: 6,
            ..Default::default()
        };
        assert!(record.flow_key().is_none());

        let record = SyncRecord {
            protocol: 1,
            ..Default::default()
        };
        assert!(record.flow_key().is_none());
    }
}
