/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

use std::{os::unix::process::CommandExt, process::Command};

use anyhow::{bail, Context as _};
use clap::Parser;

#[derive(Debug, Parser)]
pub struct Options {
    /// Build and run the release target
    #[clap(long)]
    pub release: bool,
    /// The command used to wrap your application
    #[clap(short, long, default_value = "")]
    pub runner: String,
    /// Arguments to pass to your application
    #[clap(name = "args", last = true)]
    pub run_args: Vec<String>,
}

/// Build the dataplane
fn build_dataplane(opts: &Options) -> Result<(), anyhow::Error> {
    let mut args = vec!["build", "--package", "loader"];
    if opts.release {
        args.push("--release")
    }
    let status = Command::new("cargo")
        .args(&args)
        .status()
        .context("failed to run cargo")?;
    if !status.success() {
        bail!("cargo build exited with {}", status);
    }
    Ok(())
}

/// Build and run the dataplane
pub fn run_dataplane(opts: Options) -> Result<(), anyhow::Error> {
    build_dataplane(&opts).context("Error while building the dataplane loader")?;

    // profile we are building (release or debug)
    let profile = if opts.release { "release" } else { "debug" };
    let bin_path = format!("target/{}/loader", profile);

    // arguments to pass to the application
    let mut run_args: Vec<_> = opts.run_args.iter().map(String::as_str).collect();

    // configure args
    let mut args: Vec<_> = opts.runner.split_whitespace().collect();
    args.push(bin_path.as_str());
    args.append(&mut run_args);

    // spawn the command
    let err = Command::new(args[0])
        .args(&args[1..])
        .env("RUST_LOG", "info,engine=debug,api_server=debug")
        .exec();

    // we shouldn't get here unless the command failed to spawn
    Err(anyhow::Error::from(err).context(format!("Failed to run `{}`", args.join(" "))))
}
