// Fast IP Change - Profile Activation
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Turns menu triggers into apply runs and reports the outcome.

use std::sync::Arc;

use tracing::{error, info};

use super::applier::Applier;
use super::coordinator::TriggerHandler;
use super::notifier::Notifier;
use crate::models::{ApplyReport, Error, Result};
use crate::storage::SharedConfig;

/// Looks a profile up, applies it and notifies the operator.
///
/// Failed attempts are never retried; the operator has to trigger again.
pub struct ProfileActivator {
    config: SharedConfig,
    applier: Applier,
    notifier: Arc<dyn Notifier>,
}

impl ProfileActivator {
    pub fn new(config: SharedConfig, applier: Applier, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            applier,
            notifier,
        }
    }

    /// Apply the profile with this ID (or exact name).
    pub fn activate(&self, profile_id: &str) -> Result<ApplyReport> {
        // Copy out of the lock before any command runs
        let Some(profile) = self.config.find_profile(profile_id) else {
            let err = Error::ProfileNotFound(profile_id.to_string());
            self.report_failure("Apply failed", &err);
            return Err(err);
        };

        match self.applier.apply_profile(&profile) {
            Ok(report) => {
                let mut message = format!(
                    "{} applied to {} ({})",
                    profile.name, profile.nic_name, profile.ip_address
                );
                append_warnings(&mut message, &report);
                self.notify("Profile applied", &message, true);
                Ok(report)
            }
            Err(e) => {
                self.report_failure("Apply failed", &e);
                Err(e)
            }
        }
    }

    /// Switch an adapter to DHCP.
    pub fn switch_dhcp(&self, nic_name: &str) -> Result<ApplyReport> {
        match self.applier.apply_dhcp(nic_name) {
            Ok(report) => {
                let mut message = format!("{nic_name} now uses DHCP");
                append_warnings(&mut message, &report);
                self.notify("DHCP enabled", &message, true);
                Ok(report)
            }
            Err(e) => {
                self.report_failure("DHCP switch failed", &e);
                Err(e)
            }
        }
    }

    fn report_failure(&self, title: &str, err: &Error) {
        error!(code = err.code(), "{}: {}", title, err);
        self.notify(title, &format!("[{}] {}", err.code(), err), false);
    }

    fn notify(&self, title: &str, message: &str, success: bool) {
        if self.config.settings().enable_notifications {
            self.notifier.notify(title, message, success);
        } else {
            info!("{}: {}", title, message);
        }
    }
}

fn append_warnings(message: &mut String, report: &ApplyReport) {
    match report.warning_count() {
        0 => {}
        1 => message.push_str(" with 1 warning"),
        n => message.push_str(&format!(" with {n} warnings")),
    }
}

impl TriggerHandler for ProfileActivator {
    fn activate_profile(&self, profile_id: &str) {
        // Outcome already logged and notified
        let _ = self.activate(profile_id);
    }

    fn switch_to_dhcp(&self, nic_name: &str) {
        let _ = self.switch_dhcp(nic_name);
    }
}
