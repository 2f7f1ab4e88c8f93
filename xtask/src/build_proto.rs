/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Options {}

/// Generates `dataplane/api-server/src/admin.rs` from the admin proto, the same
/// output the api-server build script writes.
pub(crate) fn build_proto(_opts: Options) -> Result<(), anyhow::Error> {
    let proto_file = "./dataplane/api-server/proto/admin.proto";

    println!("building proto {}", proto_file);

    tonic_build::configure()
        .protoc_arg("--experimental_allow_proto3_optional")
        .build_client(true)
        .build_server(true)
        .out_dir("./dataplane/api-server/src")
        .compile(&[proto_file], &["./dataplane/api-server/proto"])?;

    Ok(())
}
