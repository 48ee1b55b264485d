// Fast IP Change - Services
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Long-lived services.
//!
//! This module contains:
//! - Applier: Runs apply plans (snapshot, address, DNS, verify) and DHCP switches
//! - Coordinator: Cancel-and-replace supervisor for menu trigger handlers
//! - Activator: Connects triggers to the applier and the notifier
//! - Notifier: Operator notifications

pub mod activator;
pub mod applier;
pub mod coordinator;
pub mod notifier;

pub use activator::ProfileActivator;
pub use applier::Applier;
pub use coordinator::MenuCoordinator;
pub use notifier::{ConsoleNotifier, Notifier, SilentNotifier};
