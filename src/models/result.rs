// Fast IP Change - Apply Results
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Step and report types for apply sequences.

use chrono::{DateTime, Utc};

/// What happens to the sequence when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the sequence and return the error.
    Fatal,
    /// Log the failure and continue.
    Warning,
}

/// One step of an apply sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStep {
    /// Reject NIC names that are unsafe on a command line.
    CheckNicName,
    /// Capture the current adapter configuration.
    Snapshot,
    /// Set static address, mask and optional gateway.
    SetStaticAddress,
    /// Set the preferred DNS server.
    SetPrimaryDns,
    /// Add the alternate DNS server.
    AddSecondaryDns,
    /// Re-query the adapter and compare the address.
    Verify,
    /// Switch the address source to DHCP.
    SetDhcpAddress,
    /// Switch the DNS source to DHCP.
    SetDhcpDns,
}

impl ApplyStep {
    /// The failure policy of this step.
    pub fn policy(&self) -> FailurePolicy {
        match self {
            Self::CheckNicName | Self::SetStaticAddress | Self::SetDhcpAddress => FailurePolicy::Fatal,
            Self::Snapshot
            | Self::SetPrimaryDns
            | Self::AddSecondaryDns
            | Self::Verify
            | Self::SetDhcpDns => FailurePolicy::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckNicName => "check_nic_name",
            Self::Snapshot => "snapshot",
            Self::SetStaticAddress => "set_static_address",
            Self::SetPrimaryDns => "set_primary_dns",
            Self::AddSecondaryDns => "add_secondary_dns",
            Self::Verify => "verify",
            Self::SetDhcpAddress => "set_dhcp_address",
            Self::SetDhcpDns => "set_dhcp_dns",
        }
    }
}

/// Status of a single executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step completed successfully.
    Success,
    /// Step failed under a warning policy.
    Warning,
}

/// Record of one executed step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: ApplyStep,
    pub status: StepStatus,
    /// Error text for failed steps.
    pub detail: Option<String>,
    pub duration_ms: u64,
}

/// Overall result of a successful apply sequence.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Adapter the sequence ran against.
    pub nic_name: String,
    /// Executed steps, in order.
    pub steps: Vec<StepRecord>,
    /// Address before the change, when the snapshot succeeded.
    pub previous_ip: Option<String>,
    /// Requested address (None for DHCP).
    pub applied_ip: Option<String>,
    /// Whether the post-apply re-query confirmed the address.
    pub verified: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ApplyReport {
    pub fn new(nic_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            nic_name: nic_name.into(),
            steps: Vec::new(),
            previous_ip: None,
            applied_ip: None,
            verified: false,
            started_at: now,
            completed_at: now,
        }
    }

    /// Add a step record.
    pub fn record(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    /// Stamp the completion time.
    pub fn finalize(&mut self) {
        self.completed_at = Utc::now();
    }

    /// Count steps that failed under a warning policy.
    pub fn warning_count(&self) -> usize {
        self.steps.iter().filter(|s| s.status == StepStatus::Warning).count()
    }

    /// Total duration in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        (self.completed_at - self.started_at).num_milliseconds().max(0) as u64
    }
}
