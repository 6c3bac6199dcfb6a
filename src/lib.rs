// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! mmWave Quick-Config Library
//!
//! This library interprets mmWave sensor CLI configuration profiles, sends
//! each command to the device and derives the frame, profile and antenna
//! parameters other nodes need to decode the sensor output.
//!
//! # Features
//!
//! - **Line Normalizer** - Comment, blank and command classification
//! - **Field Schema** - Declarative token position to parameter table
//! - **Dispatch** - Send, validate and retry-once state machine
//! - **Zenoh Service** - Command queryable client and parameter publisher
//! - **Serial** - Direct connection to the sensor CLI port

/// Configuration file reading and line classification
pub mod config;

/// Command dispatch to the device
pub mod dispatch;

/// Error types
pub mod error;

/// Command tokenizing, parameter extraction and antenna tally
pub mod extract;

/// Positional field schema of the sensor CLI commands
pub mod schema;

/// Direct serial connection to the sensor CLI
#[cfg(feature = "serial")]
pub mod serial;

/// Zenoh command service and parameter store
#[cfg(feature = "zenoh")]
pub mod service;

pub use error::Error;
