/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use clap::Parser;

/// Where the admin gRPC API listens.
#[derive(Debug, Parser, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    #[clap(long, default_value = "0.0.0.0")]
    pub api_addr: Ipv4Addr,
    #[clap(long, default_value_t = 9874)]
    pub api_port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            api_addr: Ipv4Addr::UNSPECIFIED,
            api_port: 9874,
        }
    }
}

impl ApiConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddrV4::new(self.api_addr, self.api_port).into()
    }
}
