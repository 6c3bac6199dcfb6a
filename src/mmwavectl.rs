use clap::Parser;
use log::{debug, error};
use mmwavecfg::{
    dispatch::{CommandEndpoint, Driver, LogStore, Status},
    service::{ZenohArgs, ZenohEndpoint},
};
use std::{process::ExitCode, time::Duration};
use zenoh::config::Config;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Key expression of the command service queryable
    #[arg(short, long, default_value = "mmWaveCommSrv/mmWaveCLI")]
    service: String,

    /// Response timeout in milliseconds
    #[arg(short, long, default_value = "30000")]
    timeout: u64,

    /// Retry once if the response lacks the success marker
    #[arg(short, long)]
    retry: bool,

    #[command(flatten)]
    zenoh: ZenohArgs,

    /// Command to send to the device, e.g. sensorStop
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let command = args.command.join(" ");

    let config = match Config::try_from(&args.zenoh) {
        Ok(config) => config,
        Err(err) => {
            error!("invalid zenoh configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    debug!("opening zenoh session");
    let session = match zenoh::open(config).await {
        Ok(session) => session,
        Err(err) => {
            error!("failed to open zenoh session: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let timeout = Duration::from_millis(args.timeout);
    let mut endpoint = ZenohEndpoint::new(session, &args.service, timeout);

    if !args.retry {
        return match endpoint.send(&command).await {
            Ok(response) => {
                println!("{}", response);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("{}", err);
                ExitCode::FAILURE
            }
        };
    }

    let mut driver = Driver::new(endpoint, LogStore::default());
    match driver.dispatch(&command).await {
        Ok(outcome) => {
            println!("{}", outcome.response);
            match outcome.status {
                Status::Succeeded => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            }
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
