// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use mmwavecfg::{dispatch::SUCCESS_MARKER, service::ZenohArgs};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// mmWave sensor CLI configuration file
    #[arg(env = "MMWAVE_CONFIG")]
    pub config: PathBuf,

    /// Key expression of the command service queryable
    #[arg(long, env, default_value = "mmWaveCommSrv/mmWaveCLI")]
    pub service: String,

    /// Namespace the derived parameters are published under
    #[arg(long, env, default_value = "mmWave_Manager")]
    pub namespace: String,

    /// Text the device response must contain for a command to succeed
    #[arg(long, env, default_value = SUCCESS_MARKER)]
    pub success_marker: String,

    /// Time in milliseconds to wait for the command service at startup
    #[arg(long, env, default_value = "100000")]
    pub wait_timeout: u64,

    /// Time in milliseconds to wait for the response to a single command
    #[arg(long, env, default_value = "30000")]
    pub query_timeout: u64,

    /// Talk to the sensor CLI port directly instead of the command service
    #[cfg(feature = "serial")]
    #[arg(long, env)]
    pub serial: Option<String>,

    /// Baud rate of the sensor CLI port
    #[cfg(feature = "serial")]
    #[arg(long, env, default_value_t = mmwavecfg::serial::DEFAULT_BAUD)]
    pub baud: u32,

    /// Accept every command and only log the derived parameters
    #[arg(long, env)]
    pub dry_run: bool,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,

    /// Enable Tracy profiler broadcast
    #[arg(long, env)]
    pub tracy: bool,

    #[command(flatten)]
    pub zenoh: ZenohArgs,
}

impl Args {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout)
    }
}
