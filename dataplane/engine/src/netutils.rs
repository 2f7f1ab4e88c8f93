/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::net::{IpAddr, Ipv4Addr};
use std::os::fd::AsFd;

use netlink_packet_core::{
    NetlinkHeader, NetlinkMessage, NetlinkPayload, NLM_F_DUMP, NLM_F_REQUEST,
};
use netlink_packet_route::{
    address::{AddressAttribute, AddressMessage},
    link::{LinkAttribute, LinkMessage},
    AddressFamily, RouteNetlinkMessage,
};
use netlink_sys::{protocols::NETLINK_ROUTE, Socket, SocketAddr};
use socket2::SockRef;

use crate::{Error, Result};

// Sends a dump request over rtnetlink and collects every reply until the
// kernel reports the end of the dump.
fn dump(request: RouteNetlinkMessage) -> Result<Vec<RouteNetlinkMessage>> {
    let mut socket = Socket::new(NETLINK_ROUTE)?;
    socket.bind_auto()?;
    socket.connect(&SocketAddr::new(0, 0))?;

    let mut nl_hdr = NetlinkHeader::default();
    nl_hdr.flags = NLM_F_REQUEST | NLM_F_DUMP;
    let mut packet = NetlinkMessage::new(nl_hdr, NetlinkPayload::from(request));
    packet.finalize();
    let mut buf = vec![0; packet.header.length as usize];
    if buf.len() != packet.buffer_len() {
        return Err(Error::Netlink("construct packet failed".to_string()));
    }
    packet.serialize(&mut buf[..]);
    socket.send(&buf[..], 0)?;

    let mut replies = Vec::new();
    let mut receive_buffer = vec![0; 32768];
    loop {
        let size = socket.recv(&mut &mut receive_buffer[..], 0)?;
        let mut offset = 0;
        while offset < size {
            let bytes = &receive_buffer[offset..size];
            let message = <NetlinkMessage<RouteNetlinkMessage>>::deserialize(bytes)
                .map_err(|e| Error::Netlink(format!("malformed reply: {}", e)))?;
            let length = message.header.length as usize;
            match message.payload {
                NetlinkPayload::Done(_) => return Ok(replies),
                NetlinkPayload::Error(err) => {
                    return Err(Error::Netlink(format!("kernel error: {:?}", err)))
                }
                NetlinkPayload::InnerMessage(inner) => replies.push(inner),
                _ => {}
            }
            if length == 0 {
                return Err(Error::Netlink("zero length reply".to_string()));
            }
            offset += length;
        }
    }
}

/// Returns the index of a network interface, failing if it does not exist.
pub fn if_nametoindex(ifname: &str) -> Result<u32> {
    let links = dump(RouteNetlinkMessage::GetLink(LinkMessage::default()))?;
    links
        .into_iter()
        .find_map(|reply| match reply {
            RouteNetlinkMessage::NewLink(link) => link
                .attributes
                .iter()
                .any(|attr| matches!(attr, LinkAttribute::IfName(name) if name == ifname))
                .then_some(link.header.index),
            _ => None,
        })
        .ok_or_else(|| Error::InvalidInterface(ifname.to_string()))
}

/// Returns the first IPv4 address configured on an interface.
pub fn if_ipv4_addr(ifname: &str) -> Result<Ipv4Addr> {
    let ifindex = if_nametoindex(ifname)?;

    let mut request = AddressMessage::default();
    request.header.family = AddressFamily::Inet;
    let addresses = dump(RouteNetlinkMessage::GetAddress(request))?;
    addresses
        .into_iter()
        .filter_map(|reply| match reply {
            RouteNetlinkMessage::NewAddress(address) if address.header.index == ifindex => {
                Some(address)
            }
            _ => None,
        })
        .find_map(|address| {
            address.attributes.iter().find_map(|attr| match attr {
                AddressAttribute::Local(IpAddr::V4(ip))
                | AddressAttribute::Address(IpAddr::V4(ip)) => Some(*ip),
                _ => None,
            })
        })
        .ok_or_else(|| Error::InvalidInterface(ifname.to_string()))
}

/// Sends multicast traffic of `socket` out of the interface owning `addr`.
pub fn set_multicast_if<S: AsFd>(socket: &S, addr: Ipv4Addr) -> Result<()> {
    SockRef::from(socket).set_multicast_if_v4(&addr)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::UdpSocket;

    use super::*;

    #[test]
    fn unknown_interface_is_invalid() {
        assert!(matches!(
            if_nametoindex("does-not-exist0"),
            Err(Error::InvalidInterface(_))
        ));
        assert!(matches!(
            if_ipv4_addr("does-not-exist0"),
            Err(Error::InvalidInterface(_))
        ));
    }

    #[test]
    fn loopback_resolves() {
        assert!(if_nametoindex("lo").unwrap() > 0);
        assert_eq!(if_ipv4_addr("lo").unwrap(), Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn multicast_interface_is_applied() {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        set_multicast_if(&socket, Ipv4Addr::LOCALHOST).unwrap();
        assert_eq!(
            SockRef::from(&socket).multicast_if_v4().unwrap(),
            Ipv4Addr::LOCALHOST
        );
    }
}
