// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use mmwavecfg::{
    config,
    dispatch::{CommandEndpoint, Driver, DryRunEndpoint, LogStore, ParameterStore, RunSummary},
    service::{ZenohEndpoint, ZenohStore},
    Error,
};
use std::process::ExitCode;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};
use zenoh::{config::Config, Session};

#[cfg(feature = "profiling")]
#[global_allocator]
static GLOBAL: tracy_client::ProfiledAllocator<std::alloc::System> =
    tracy_client::ProfiledAllocator::new(std::alloc::System, 100);

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_tracing(&args) {
        eprintln!("failed to initialize logging: {}", err);
        return ExitCode::FAILURE;
    }

    info!(
        "configuring mmWave device using config file: {}",
        args.config.display()
    );

    match configure(&args).await {
        Ok(summary) => {
            info!(
                "done configuring mmWave device using config file: {} ({} commands, {} skipped lines, {} parameters, {} tx antennas)",
                args.config.display(),
                summary.commands,
                summary.skipped,
                summary.parameters,
                summary.tx_antennas
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    args.tracy.then(tracy_client::Client::start);

    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(args.rust_log);

    let journald = match tracing_journald::layer() {
        Ok(journald) => Some(journald.with_filter(args.rust_log)),
        Err(_) => None,
    };

    let tracy = match args.tracy {
        true => Some(tracing_tracy::TracyLayer::default().with_filter(args.rust_log)),
        false => None,
    };

    let subscriber = Registry::default()
        .with(stdout_log)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(())
}

async fn configure(args: &Args) -> Result<RunSummary, Error> {
    // opened before the zenoh session
    let lines = config::open(&args.config)?;

    if args.dry_run {
        let store = LogStore {
            namespace: args.namespace.clone(),
        };
        let endpoint = DryRunEndpoint::new(&args.success_marker);
        return run(args, endpoint, store, lines).await;
    }

    let session = zenoh::open(Config::try_from(&args.zenoh)?).await?;
    let store = ZenohStore::new(session.clone(), &args.namespace);

    #[cfg(feature = "serial")]
    {
        if let Some(port) = &args.serial {
            let endpoint =
                mmwavecfg::serial::SerialEndpoint::open(port, args.baud, args.query_timeout())?;
            return finish(session, run(args, endpoint, store, lines).await).await;
        }
    }

    let endpoint = ZenohEndpoint::new(session.clone(), &args.service, args.query_timeout());
    finish(session, run(args, endpoint, store, lines).await).await
}

async fn run<E, S, I>(args: &Args, endpoint: E, store: S, lines: I) -> Result<RunSummary, Error>
where
    E: CommandEndpoint,
    S: ParameterStore,
    I: IntoIterator<Item = Result<config::ConfigLine, Error>>,
{
    let mut driver = Driver::with_marker(endpoint, store, &args.success_marker);
    driver.wait_ready(args.wait_timeout()).await;

    let span = info_span!("configure", config = %args.config.display());
    driver.run(lines).instrument(span).await
}

async fn finish(
    session: Session,
    result: Result<RunSummary, Error>,
) -> Result<RunSummary, Error> {
    if let Err(err) = session.close().await {
        error!("failed to close zenoh session: {}", err);
    }
    result
}
