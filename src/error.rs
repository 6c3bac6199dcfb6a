// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{fmt, io, path::PathBuf};

/// Numeric kind a positional field was expected to hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Expected {
    Int,
    Float,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Int => write!(f, "integer"),
            Expected::Float => write!(f, "float"),
        }
    }
}

/// A positional field of a command could not be converted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub keyword: String,
    pub index: usize,
    pub token: String,
    pub expected: Expected,
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} field {}: expected {} but got '{}'",
            self.keyword, self.index, self.expected, self.token
        )
    }
}

/// Errors which stop a configuration run.
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading the configuration source
    Io(io::Error),
    /// The configuration file could not be opened
    FileOpen(PathBuf, io::Error),
    /// The command could not be delivered to the endpoint
    Transport(String, String),
    /// The device never answered with the success marker
    ValidationFailure {
        command: String,
        response: String,
        attempts: u8,
    },
    /// A positional field expected to be numeric is not
    Parse(ParseError),
    #[cfg(feature = "zenoh")]
    /// Zenoh session or configuration error
    Zenoh(zenoh::Error),
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

#[cfg(feature = "zenoh")]
impl From<zenoh::Error> for Error {
    fn from(err: zenoh::Error) -> Error {
        Error::Zenoh(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::FileOpen(path, err) => {
                write!(f, "failed to open {}: {}", path.display(), err)
            }
            Error::Transport(command, reason) => {
                write!(f, "failed to deliver '{}': {}", command, reason)
            }
            Error::ValidationFailure {
                command,
                response,
                attempts,
            } => write!(
                f,
                "'{}' failed after {} attempts, last response: '{}'",
                command, attempts, response
            ),
            Error::Parse(err) => write!(f, "parse error: {}", err),
            #[cfg(feature = "zenoh")]
            Error::Zenoh(err) => write!(f, "zenoh error: {}", err),
        }
    }
}
