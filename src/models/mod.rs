// Fast IP Change - Data Model
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! # Data Model
//!
//! Shared types used across the application:
//!
//! - **Profile**: A named static IPv4 configuration for one NIC
//! - **Config**: The persisted document (profiles + settings)
//! - **Adapter**: Runtime adapter, route and interface records
//! - **Result**: Step and report types for apply sequences
//! - **Validation**: Structural and command-line safety checks
//! - **Error**: Shared error types with stable codes

pub mod adapter;
pub mod config;
pub mod error;
pub mod profile;
pub mod result;
pub mod validation;

pub use adapter::{ConnectionState, DhcpState, InterfaceEntry, IpConfig, NicStatus, RouteEntry};
pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use profile::Profile;
pub use result::{ApplyReport, ApplyStep, FailurePolicy, StepRecord, StepStatus};

/// Application name used for notifications and the config directory.
pub const APP_NAME: &str = "Fast IP Change";

/// Configuration directory name (under the user config dir).
pub const CONFIG_DIR_NAME: &str = "FastIPChange";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "settings.json";

/// Log directory name (under the configuration directory).
pub const LOG_DIR_NAME: &str = "logs";
