// Fast IP Change - Profile Applier
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Applies profiles and DHCP switches to an adapter.
//!
//! A request becomes an ordered list of [`ApplyStep`]s, each tagged with a
//! [`FailurePolicy`](crate::models::FailurePolicy). One generic executor
//! runs the list: a failing `Fatal` step aborts with its error, a failing
//! `Warning` step is logged and the sequence continues. Errors for which
//! [`Error::is_always_fatal`] holds abort regardless of the step policy.
//!
//! The pre-apply snapshot is only logged. Nothing is rolled back.

use std::time::Instant;

use tracing::{error, info, warn};

use crate::models::validation::is_valid_nic_name;
use crate::models::{
    ApplyReport, ApplyStep, Error, FailurePolicy, Profile, Result, StepRecord, StepStatus,
};
use crate::models::adapter::PLACEHOLDER;
use crate::network::NetworkTools;

/// What a plan is being run for.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Static(&'a Profile),
    Dhcp(&'a str),
}

impl Target<'_> {
    fn nic_name(&self) -> &str {
        match self {
            Self::Static(profile) => &profile.nic_name,
            Self::Dhcp(nic_name) => nic_name,
        }
    }
}

/// Runs apply plans against the network tools.
#[derive(Clone)]
pub struct Applier {
    tools: NetworkTools,
}

impl Applier {
    pub fn new(tools: NetworkTools) -> Self {
        Self { tools }
    }

    /// Steps for a static profile. DNS steps appear only for configured
    /// servers.
    pub fn profile_plan(profile: &Profile) -> Vec<ApplyStep> {
        let mut plan = vec![ApplyStep::Snapshot, ApplyStep::SetStaticAddress];
        if profile.dns_primary.is_some() {
            plan.push(ApplyStep::SetPrimaryDns);
        }
        if profile.dns_secondary.is_some() {
            plan.push(ApplyStep::AddSecondaryDns);
        }
        plan.push(ApplyStep::Verify);
        plan
    }

    /// Steps for a DHCP switch.
    pub fn dhcp_plan() -> Vec<ApplyStep> {
        vec![
            ApplyStep::CheckNicName,
            ApplyStep::SetDhcpAddress,
            ApplyStep::SetDhcpDns,
        ]
    }

    /// Validate and apply a static profile.
    pub fn apply_profile(&self, profile: &Profile) -> Result<ApplyReport> {
        profile.validate()?;

        info!(
            profile = %profile.name,
            nic = %profile.nic_name,
            "Applying profile: {} {}/{}",
            profile.ip_address,
            profile.subnet_mask,
            profile.gateway.as_deref().unwrap_or(PLACEHOLDER)
        );

        let mut report = ApplyReport::new(&profile.nic_name);
        report.applied_ip = Some(profile.ip_address.clone());
        self.execute(Target::Static(profile), &Self::profile_plan(profile), &mut report)?;
        report.finalize();

        info!(
            profile = %profile.name,
            nic = %profile.nic_name,
            previous_ip = report.previous_ip.as_deref().unwrap_or(PLACEHOLDER),
            applied_ip = %profile.ip_address,
            verified = report.verified,
            "Profile applied in {} ms ({} warnings)",
            report.total_duration_ms(),
            report.warning_count()
        );
        Ok(report)
    }

    /// Switch an adapter to DHCP for both address and DNS.
    pub fn apply_dhcp(&self, nic_name: &str) -> Result<ApplyReport> {
        info!(nic = %nic_name, "Switching adapter to DHCP");

        let mut report = ApplyReport::new(nic_name);
        self.execute(Target::Dhcp(nic_name), &Self::dhcp_plan(), &mut report)?;
        report.finalize();

        info!(
            nic = %nic_name,
            "DHCP enabled in {} ms ({} warnings)",
            report.total_duration_ms(),
            report.warning_count()
        );
        Ok(report)
    }

    /// Run a plan in order, applying each step's failure policy.
    fn execute(&self, target: Target<'_>, plan: &[ApplyStep], report: &mut ApplyReport) -> Result<()> {
        for &step in plan {
            let started = Instant::now();
            let outcome = self.run_step(step, target, report);
            let duration_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => report.record(StepRecord {
                    step,
                    status: StepStatus::Success,
                    detail: None,
                    duration_ms,
                }),
                Err(e) if step.policy() == FailurePolicy::Warning && !e.is_always_fatal() => {
                    warn!(
                        nic = %target.nic_name(),
                        step = step.as_str(),
                        code = e.code(),
                        "Step failed, continuing: {}",
                        e
                    );
                    report.record(StepRecord {
                        step,
                        status: StepStatus::Warning,
                        detail: Some(e.to_string()),
                        duration_ms,
                    });
                }
                Err(e) => {
                    error!(
                        nic = %target.nic_name(),
                        step = step.as_str(),
                        code = e.code(),
                        "Step failed, aborting: {}",
                        e
                    );
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn run_step(&self, step: ApplyStep, target: Target<'_>, report: &mut ApplyReport) -> Result<()> {
        let nic_name = target.nic_name();
        match (step, target) {
            (ApplyStep::CheckNicName, _) => {
                if is_valid_nic_name(nic_name) {
                    Ok(())
                } else {
                    Err(Error::InvalidNicName(nic_name.to_string()))
                }
            }
            (ApplyStep::Snapshot, _) => {
                let current = self.tools.ip_config(nic_name)?;
                info!(
                    nic = %nic_name,
                    "Backup configuration: ip={} mask={} gateway={} dns={}",
                    current.ip_address.as_deref().unwrap_or(PLACEHOLDER),
                    current.subnet_mask.as_deref().unwrap_or(PLACEHOLDER),
                    current.gateway.as_deref().unwrap_or(PLACEHOLDER),
                    current.dns_primary.as_deref().unwrap_or(PLACEHOLDER)
                );
                report.previous_ip = current.ip_address;
                Ok(())
            }
            (ApplyStep::SetStaticAddress, Target::Static(profile)) => self.tools.set_static_address(
                nic_name,
                &profile.ip_address,
                &profile.subnet_mask,
                profile.gateway.as_deref(),
            ),
            (ApplyStep::SetPrimaryDns, Target::Static(profile)) => match &profile.dns_primary {
                Some(dns) => self.tools.set_primary_dns(nic_name, dns),
                None => Ok(()),
            },
            (ApplyStep::AddSecondaryDns, Target::Static(profile)) => match &profile.dns_secondary {
                Some(dns) => self.tools.add_secondary_dns(nic_name, dns),
                None => Ok(()),
            },
            (ApplyStep::Verify, Target::Static(profile)) => {
                let applied = self.tools.ip_config(nic_name)?;
                let actual = applied.ip_address.unwrap_or_default();
                if actual.trim() != profile.ip_address {
                    return Err(Error::VerificationMismatch {
                        expected: profile.ip_address.clone(),
                        actual: if actual.is_empty() { PLACEHOLDER.to_string() } else { actual },
                    });
                }
                report.verified = true;
                Ok(())
            }
            (ApplyStep::SetDhcpAddress, _) => self.tools.set_dhcp_address(nic_name),
            (ApplyStep::SetDhcpDns, _) => self.tools.set_dhcp_dns(nic_name),
            (step, Target::Dhcp(_)) => {
                warn!(step = step.as_str(), "Static-only step in a DHCP plan, skipped");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::network::testing::ScriptedRunner;
    use std::sync::Arc;

    fn config_dump(ip: &str) -> CommandOutput {
        CommandOutput::ok(format!(
            "Configuration for interface \"Ethernet\"\n    IP Address:  {ip}\n    Subnet Prefix:  192.168.1.0/24 (mask 255.255.255.0)\n"
        ))
    }

    fn office() -> Profile {
        Profile::new("Office", "Ethernet", "192.168.1.10", "255.255.255.0")
            .with_gateway("192.168.1.1")
            .with_dns("8.8.8.8", "8.8.4.4")
    }

    fn applier(runner: &Arc<ScriptedRunner>) -> Applier {
        Applier::new(NetworkTools::new(runner.clone()))
    }

    #[test]
    fn test_profile_plan_shape() {
        assert_eq!(
            Applier::profile_plan(&office()),
            vec![
                ApplyStep::Snapshot,
                ApplyStep::SetStaticAddress,
                ApplyStep::SetPrimaryDns,
                ApplyStep::AddSecondaryDns,
                ApplyStep::Verify,
            ]
        );

        let bare = Profile::new("Lab", "Ethernet", "10.0.0.2", "255.0.0.0");
        assert_eq!(
            Applier::profile_plan(&bare),
            vec![ApplyStep::Snapshot, ApplyStep::SetStaticAddress, ApplyStep::Verify]
        );
    }

    #[test]
    fn test_successful_apply_runs_steps_in_order() {
        let runner = ScriptedRunner::new();
        runner
            .on("show config", config_dump("10.0.0.7"))
            .on("show config", config_dump("192.168.1.10"));

        let report = applier(&runner).apply_profile(&office()).unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "netsh interface ipv4 show config name=Ethernet",
                "netsh interface ipv4 set address name=Ethernet static 192.168.1.10 255.255.255.0 192.168.1.1",
                "netsh interface ipv4 set dns name=Ethernet static 8.8.8.8",
                "netsh interface ipv4 add dns name=Ethernet 8.8.4.4 index=2",
                "netsh interface ipv4 show config name=Ethernet",
            ]
        );
        assert_eq!(report.previous_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(report.applied_ip.as_deref(), Some("192.168.1.10"));
        assert!(report.verified);
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.steps.len(), 5);
    }

    #[test]
    fn test_address_failure_halts_before_dns() {
        let runner = ScriptedRunner::new();
        runner
            .on("show config", config_dump("10.0.0.7"))
            .on("set address", CommandOutput::failed(1, "The requested operation requires elevation."));

        let err = applier(&runner).apply_profile(&office()).unwrap_err();

        assert_eq!(err.code(), "APPLY_IP_FAILED");
        assert!(matches!(err, Error::Command { .. }));
        assert_eq!(runner.count("set dns"), 0);
        assert_eq!(runner.count("add dns"), 0);
        assert_eq!(runner.count("show config"), 1);
    }

    #[test]
    fn test_dns_failures_are_warnings() {
        let runner = ScriptedRunner::new();
        runner
            .on("show config", config_dump("10.0.0.7"))
            .on("show config", config_dump("192.168.1.10"))
            .on("set dns", CommandOutput::failed(1, "The DNS server is not responding."))
            .on("add dns", CommandOutput::failed(1, "The object already exists."));

        let report = applier(&runner).apply_profile(&office()).unwrap();

        assert_eq!(runner.count("set dns"), 1);
        assert_eq!(runner.count("add dns"), 1);
        assert_eq!(report.warning_count(), 2);
        assert!(report.verified);
        let dns_step = report
            .steps
            .iter()
            .find(|s| s.step == ApplyStep::SetPrimaryDns)
            .unwrap();
        assert_eq!(dns_step.status, StepStatus::Warning);
        assert!(dns_step.detail.as_deref().unwrap().contains("not responding"));
    }

    #[test]
    fn test_verification_mismatch_is_fatal() {
        let runner = ScriptedRunner::new();
        runner.on("show config", config_dump("169.254.10.20"));

        let err = applier(&runner).apply_profile(&office()).unwrap_err();

        assert_eq!(err.code(), "VERIFY_FAILED");
        match err {
            Error::VerificationMismatch { expected, actual } => {
                assert_eq!(expected, "192.168.1.10");
                assert_eq!(actual, "169.254.10.20");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_verify_with_no_address_reports_placeholder() {
        let runner = ScriptedRunner::new();
        runner.on("show config", CommandOutput::ok("Configuration for interface \"Ethernet\"\n"));

        let err = applier(&runner).apply_profile(&office()).unwrap_err();
        assert!(matches!(err, Error::VerificationMismatch { ref actual, .. } if actual == "-"));
    }

    #[test]
    fn test_verify_query_failure_is_a_warning() {
        let runner = ScriptedRunner::new();
        runner
            .on("show config", config_dump("10.0.0.7"))
            .on("show config", CommandOutput::failed(1, "Element not found."));

        let report = applier(&runner).apply_profile(&office()).unwrap();

        assert!(!report.verified);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.steps.last().unwrap().step, ApplyStep::Verify);
    }

    #[test]
    fn test_snapshot_failure_is_a_warning() {
        let runner = ScriptedRunner::new();
        runner
            .on("show config", CommandOutput::failed(1, "Element not found."))
            .on("show config", config_dump("192.168.1.10"));

        let report = applier(&runner).apply_profile(&office()).unwrap();

        assert_eq!(report.previous_ip, None);
        assert_eq!(report.steps[0].status, StepStatus::Warning);
        assert_eq!(runner.count("set address"), 1);
    }

    #[test]
    fn test_invalid_profile_runs_nothing() {
        let runner = ScriptedRunner::new();
        let mut profile = office();
        profile.subnet_mask = "255.0.255.0".into();

        let err = applier(&runner).apply_profile(&profile).unwrap_err();

        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_unsafe_nic_name_rejected_everywhere() {
        for nic in ["eth0 & calc", "eth0; shutdown", "eth`whoami`"] {
            let runner = ScriptedRunner::new();
            let applier = applier(&runner);

            let mut profile = office();
            profile.nic_name = nic.to_string();
            let err = applier.apply_profile(&profile).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_FAILED");

            let err = applier.apply_dhcp(nic).unwrap_err();
            assert_eq!(err.code(), "INVALID_NIC_NAME");

            assert!(runner.calls().is_empty(), "{nic} reached the command runner");
        }
    }

    #[test]
    fn test_dhcp_switch() {
        let runner = ScriptedRunner::new();
        let report = applier(&runner).apply_dhcp("Wi-Fi").unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "netsh interface ipv4 set address name=Wi-Fi source=dhcp",
                "netsh interface ipv4 set dns name=Wi-Fi source=dhcp",
            ]
        );
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.applied_ip, None);
    }

    #[test]
    fn test_dhcp_dns_failure_is_a_warning() {
        let runner = ScriptedRunner::new();
        runner.on("set dns", CommandOutput::failed(1, "DHCP is already enabled on this interface."));

        let report = applier(&runner).apply_dhcp("Ethernet").unwrap();
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_dhcp_address_failure_is_fatal() {
        let runner = ScriptedRunner::new();
        runner.on("set address", CommandOutput::failed(1, "Access is denied."));

        let err = applier(&runner).apply_dhcp("Ethernet").unwrap_err();
        assert_eq!(err.code(), "APPLY_DHCP_FAILED");
        assert_eq!(runner.count("set dns"), 0);
    }
}
