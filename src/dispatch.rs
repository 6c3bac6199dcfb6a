// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Command dispatch state machine.
//!
//! Each command line is sent to the device, the response is validated
//! against the success marker and a failed validation is retried exactly
//! once. Transport failures are never retried. Comments and blank lines are
//! never dispatched.

use crate::{
    config::ConfigLine,
    error::Error,
    extract::{extract, AntennaTally, Command, ParamValue},
};
use log::{debug, error, info, warn};
use std::{future::Future, time::Duration};

/// Marker the sensor CLI prints when a command was accepted.
pub const SUCCESS_MARKER: &str = "Done";

/// Delivery attempts per command, the second only after a response without
/// the success marker.
pub const MAX_ATTEMPTS: u8 = 2;

/// Remote interface accepting a command string and returning the device
/// response.
pub trait CommandEndpoint {
    /// Deliver a command and return the response text.
    ///
    /// # Errors
    /// Returns `Error::Transport` if the command could not be delivered.
    fn send(&mut self, command: &str) -> impl Future<Output = Result<String, Error>>;

    /// Wait up to `timeout` for the endpoint to become available. Returns
    /// false if it did not.
    fn wait_ready(&mut self, _timeout: Duration) -> impl Future<Output = bool> {
        async { true }
    }
}

/// Write-only key/value store for derived parameters.
pub trait ParameterStore {
    fn set(&mut self, key: &str, value: ParamValue) -> impl Future<Output = Result<(), Error>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Succeeded,
    Failed,
}

/// Delivery state of a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub attempts: u8,
    pub status: Status,
    /// Last response received from the device
    pub response: String,
}

impl Default for DispatchOutcome {
    fn default() -> Self {
        DispatchOutcome {
            attempts: 0,
            status: Status::Pending,
            response: String::new(),
        }
    }
}

/// Totals of a completed configuration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands validated by the device
    pub commands: usize,
    /// Comment and blank lines
    pub skipped: usize,
    /// Parameter writes issued, including the antenna tally
    pub parameters: usize,
    pub tx_antennas: i64,
}

/// Sends configuration lines to a device in order and publishes the
/// parameters derived from them.
pub struct Driver<E, S> {
    endpoint: E,
    store: S,
    marker: String,
}

impl<E: CommandEndpoint, S: ParameterStore> Driver<E, S> {
    pub fn new(endpoint: E, store: S) -> Self {
        Self::with_marker(endpoint, store, SUCCESS_MARKER)
    }

    pub fn with_marker(endpoint: E, store: S, marker: &str) -> Self {
        Driver {
            endpoint,
            store,
            marker: marker.to_string(),
        }
    }

    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }

    pub fn into_parts(self) -> (E, S) {
        (self.endpoint, self.store)
    }

    /// Wait for the endpoint before the first dispatch. Not becoming ready
    /// is only logged, every later call will then fail on its own.
    pub async fn wait_ready(&mut self, timeout: Duration) -> bool {
        info!("waiting up to {:?} for command endpoint", timeout);
        let ready = self.endpoint.wait_ready(timeout).await;
        if !ready {
            warn!("command endpoint not ready after {:?}", timeout);
        }
        ready
    }

    /// Deliver one command until validated or retries are exhausted.
    ///
    /// # Errors
    /// Returns `Error::Transport` if the endpoint could not be reached; this
    /// is never retried.
    pub async fn dispatch(&mut self, command: &str) -> Result<DispatchOutcome, Error> {
        let mut outcome = DispatchOutcome::default();

        while outcome.status == Status::Pending {
            outcome.attempts += 1;
            debug!("sending '{}' attempt {}", command, outcome.attempts);
            outcome.response = self.endpoint.send(command).await?;

            if outcome.response.contains(&self.marker) {
                info!("'{}' accepted", command);
                outcome.status = Status::Succeeded;
            } else if outcome.attempts < MAX_ATTEMPTS {
                warn!(
                    "'{}' not accepted (no '{}'), response: '{}'",
                    command, self.marker, outcome.response
                );
            } else {
                error!(
                    "'{}' not accepted (no '{}'), response: '{}'",
                    command, self.marker, outcome.response
                );
                outcome.status = Status::Failed;
            }
        }

        Ok(outcome)
    }

    async fn publish(&mut self, name: &str, value: ParamValue) {
        debug!("{} = {}", name, value);
        if let Err(err) = self.store.set(name, value).await {
            warn!("failed to set parameter {}: {}", name, err);
        }
    }

    /// Process every line of a configuration source in order.
    ///
    /// Stops at the first fatal condition; parameters written by earlier
    /// lines are left in place. The antenna tally is written once, after
    /// the last line.
    pub async fn run<I>(&mut self, lines: I) -> Result<RunSummary, Error>
    where
        I: IntoIterator<Item = Result<ConfigLine, Error>>,
    {
        let mut summary = RunSummary::default();
        let mut tally = AntennaTally::default();

        for line in lines {
            let line = line?;
            let text = match line.command() {
                Some(text) => text,
                None => {
                    debug!("line {}: ignored '{}'", line.number, line.text);
                    summary.skipped += 1;
                    continue;
                }
            };

            info!("line {}: sending '{}'", line.number, text);
            let outcome = self.dispatch(text).await?;
            if outcome.status != Status::Succeeded {
                return Err(Error::ValidationFailure {
                    command: text.to_string(),
                    response: outcome.response,
                    attempts: outcome.attempts,
                });
            }
            summary.commands += 1;

            let command = match Command::parse(text) {
                Some(command) => command,
                None => continue,
            };
            for param in extract(&command)? {
                self.publish(param.name, param.value).await;
                summary.parameters += 1;
            }
            tally.observe(&command);
        }

        let param = tally.parameter();
        self.publish(param.name, param.value).await;
        summary.parameters += 1;
        summary.tx_antennas = tally.count();

        Ok(summary)
    }
}

/// Endpoint which accepts every command without a device attached.
#[derive(Debug)]
pub struct DryRunEndpoint {
    pub sent: usize,
    marker: String,
}

impl DryRunEndpoint {
    pub fn new(marker: &str) -> Self {
        DryRunEndpoint {
            sent: 0,
            marker: marker.to_string(),
        }
    }
}

impl Default for DryRunEndpoint {
    fn default() -> Self {
        Self::new(SUCCESS_MARKER)
    }
}

impl CommandEndpoint for DryRunEndpoint {
    async fn send(&mut self, command: &str) -> Result<String, Error> {
        self.sent += 1;
        Ok(format!("{}\n{}", command, self.marker))
    }
}

/// Store which only logs the parameters it is given.
#[derive(Debug, Default)]
pub struct LogStore {
    pub namespace: String,
}

impl ParameterStore for LogStore {
    async fn set(&mut self, key: &str, value: ParamValue) -> Result<(), Error> {
        info!("{}/{} = {}", self.namespace, key, value);
        Ok(())
    }
}
