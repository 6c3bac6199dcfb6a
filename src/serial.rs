// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Direct UART connection to the mmWave sensor CLI port.

use crate::{dispatch::CommandEndpoint, error::Error};
use log::{debug, trace};
use std::{
    io::{self, Read, Write},
    time::{Duration, Instant},
};

/// Default baud rate of the sensor CLI port.
pub const DEFAULT_BAUD: u32 = 115200;

/// Prompt printed by the sensor CLI once a command has completed.
pub const PROMPT: &str = "mmwDemo:/>";

/// Sends commands to the sensor over its CLI serial port.
pub struct SerialEndpoint {
    port: Box<dyn serialport::SerialPort>,
    timeout: Duration,
}

impl SerialEndpoint {
    /// Open the CLI port.
    ///
    /// # Errors
    /// Returns `Error::Transport` if the port cannot be opened.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, Error> {
        debug!("opening serial port {} at {} baud", path, baud);
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|err| Error::Transport(path.to_string(), err.to_string()))?;
        Ok(SerialEndpoint { port, timeout })
    }

    fn read_response(&mut self) -> io::Result<String> {
        let deadline = Instant::now() + self.timeout;
        let mut response = Vec::new();
        let mut buf = [0u8; 256];

        while Instant::now() < deadline {
            match self.port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    response.extend_from_slice(&buf[..n]);
                    if String::from_utf8_lossy(&response).contains(PROMPT) {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::TimedOut => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

impl CommandEndpoint for SerialEndpoint {
    async fn send(&mut self, command: &str) -> Result<String, Error> {
        let transport = |err: io::Error| Error::Transport(command.to_string(), err.to_string());

        // serial I/O blocks, requires the multi-threaded runtime
        let response = tokio::task::block_in_place(|| {
            if let Err(err) = self.port.clear(serialport::ClearBuffer::Input) {
                debug!("failed to clear serial input buffer: {}", err);
            }
            self.port
                .write_all(format!("{}\n", command).as_bytes())
                .and_then(|_| self.port.flush())
                .and_then(|_| self.read_response())
        })
        .map_err(transport)?;
        trace!("serial response '{}'", response);
        Ok(response)
    }
}
