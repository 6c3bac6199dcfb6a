// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Zenoh command service client and parameter publisher.
//!
//! The command service is a queryable which takes the command text as the
//! query payload and replies with the sensor CLI output. Derived parameters
//! are published as JSON scalars under a namespace.

use crate::{
    dispatch::{CommandEndpoint, ParameterStore},
    error::Error,
    extract::ParamValue,
};
use log::{debug, trace};
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use zenoh::{
    bytes::{Encoding, ZBytes},
    config::{Config, WhatAmI},
    Session,
};

const READY_POLL: Duration = Duration::from_millis(500);

/// Zenoh session options shared by the command line tools.
#[derive(clap::Args, Debug, Clone)]
pub struct ZenohArgs {
    /// zenoh connection mode
    #[arg(long, env, default_value = "peer")]
    pub mode: WhatAmI,

    /// connect to zenoh endpoints
    #[arg(long, env)]
    pub connect: Vec<String>,

    /// listen to zenoh endpoints
    #[arg(long, env)]
    pub listen: Vec<String>,

    /// disable zenoh multicast scouting
    #[arg(long, env)]
    pub no_multicast_scouting: bool,
}

impl TryFrom<&ZenohArgs> for Config {
    type Error = zenoh::Error;

    fn try_from(args: &ZenohArgs) -> Result<Self, Self::Error> {
        let mut config = Config::default();

        config.insert_json5("mode", &json!(args.mode).to_string())?;

        if !args.connect.is_empty() {
            config.insert_json5("connect/endpoints", &json!(args.connect).to_string())?;
        }

        if !args.listen.is_empty() {
            config.insert_json5("listen/endpoints", &json!(args.listen).to_string())?;
        }

        if args.no_multicast_scouting {
            config.insert_json5("scouting/multicast/enabled", &json!(false).to_string())?;
        }

        Ok(config)
    }
}

fn payload_text(payload: &ZBytes) -> String {
    match payload.try_to_string() {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(&payload.to_bytes()).into_owned(),
    }
}

/// Sends commands to the sensor through a zenoh queryable.
pub struct ZenohEndpoint {
    session: Session,
    service: String,
    timeout: Duration,
}

impl ZenohEndpoint {
    pub fn new(session: Session, service: &str, timeout: Duration) -> Self {
        ZenohEndpoint {
            session,
            service: service.to_string(),
            timeout,
        }
    }

    async fn alive(&self) -> bool {
        let replies = match self
            .session
            .liveliness()
            .get(self.service.as_str())
            .timeout(READY_POLL)
            .await
        {
            Ok(replies) => replies,
            Err(err) => {
                debug!("liveliness query on {} failed: {}", self.service, err);
                return false;
            }
        };

        while let Ok(reply) = replies.recv_async().await {
            if reply.result().is_ok() {
                return true;
            }
        }
        false
    }
}

impl CommandEndpoint for ZenohEndpoint {
    async fn send(&mut self, command: &str) -> Result<String, Error> {
        let transport = |reason: String| Error::Transport(command.to_string(), reason);

        let replies = self
            .session
            .get(self.service.as_str())
            .payload(command)
            .timeout(self.timeout)
            .await
            .map_err(|err| transport(err.to_string()))?;

        let reply = replies
            .recv_async()
            .await
            .map_err(|_| transport(format!("no reply from {}", self.service)))?;

        match reply.result() {
            Ok(sample) => {
                let response = payload_text(sample.payload());
                trace!("{} replied '{}'", self.service, response);
                Ok(response)
            }
            Err(err) => Err(transport(payload_text(err.payload()))),
        }
    }

    /// The command service declares a liveliness token on its own key.
    async fn wait_ready(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline {
            if self.alive().await {
                debug!("{} is alive", self.service);
                return true;
            }
            tokio::time::sleep(READY_POLL).await;
        }
        false
    }
}

/// Publishes derived parameters as `<namespace>/<key>`.
pub struct ZenohStore {
    session: Session,
    namespace: String,
}

impl ZenohStore {
    pub fn new(session: Session, namespace: &str) -> Self {
        ZenohStore {
            session,
            namespace: namespace.trim_matches('/').to_string(),
        }
    }

    pub fn topic(&self, key: &str) -> String {
        format!("{}/{}", self.namespace, key)
    }
}

impl ParameterStore for ZenohStore {
    async fn set(&mut self, key: &str, value: ParamValue) -> Result<(), Error> {
        let topic = self.topic(key);
        let payload = serde_json::Value::from(value).to_string();
        self.session
            .put(&topic, payload)
            .encoding(Encoding::APPLICATION_JSON)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        zenoh: ZenohArgs,
    }

    #[test]
    fn test_zenoh_args() {
        let cli = Cli::parse_from([
            "test",
            "--mode",
            "client",
            "--connect",
            "tcp/127.0.0.1:7447",
            "--no-multicast-scouting",
        ]);
        assert_eq!(cli.zenoh.mode, WhatAmI::Client);
        assert_eq!(cli.zenoh.connect, vec!["tcp/127.0.0.1:7447"]);
        assert!(cli.zenoh.listen.is_empty());

        let config = Config::try_from(&cli.zenoh).unwrap();
        assert_eq!(config.get_json("mode").unwrap(), "\"client\"");
    }

    #[test]
    fn test_param_payload() {
        assert_eq!(serde_json::Value::from(ParamValue::Int(4)).to_string(), "4");
        assert_eq!(
            serde_json::Value::from(ParamValue::Float(57.14)).to_string(),
            "57.14"
        );
    }
}
