/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

mod build_proto;
mod grpc;
#[cfg(unix)]
mod run;

use std::process::exit;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Options {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    #[cfg(unix)]
    RunDataplane(run::Options),

    BuildProto(build_proto::Options),
    GrpcClient(grpc::Options),
}

#[tokio::main]
async fn main() {
    let opts = Options::parse();

    use Command::*;
    let ret = match opts.command {
        #[cfg(unix)]
        RunDataplane(opts) => run::run_dataplane(opts),
        BuildProto(opts) => build_proto::build_proto(opts),
        GrpcClient(opts) => grpc::run(opts).await,
    };

    if let Err(e) = ret {
        eprintln!("{:#}", e);
        exit(1);
    }
}
