// Fast IP Change - Network Tools
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Typed wrappers around the Windows network tools.
//!
//! [`NetworkTools`] builds each command line, runs it through a
//! [`CommandRunner`] and maps failures to coded errors. Queries hand their
//! text to the parser; configuration changes only report success.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::command::{display_command, CommandOutput, CommandRunner};
use crate::models::validation::is_valid_nic_name;
use crate::models::{Error, InterfaceEntry, IpConfig, NicStatus, Result, RouteEntry};
use crate::parser;

const NETSH: &str = "netsh";
const IPCONFIG: &str = "ipconfig";
const ROUTE: &str = "route";

/// Front end to `netsh`, `ipconfig` and `route`.
#[derive(Clone)]
pub struct NetworkTools {
    runner: Arc<dyn CommandRunner>,
}

impl NetworkTools {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    // ========================================
    // Queries
    // ========================================

    /// IPv4 configuration of one adapter.
    pub fn ip_config(&self, nic_name: &str) -> Result<IpConfig> {
        let args = netsh_args(&["interface", "ipv4", "show", "config"], nic_name, &[]);
        let output = self.exec(NETSH, &args, "GET_IP_CONFIG_FAILED", "Failed to query IP configuration")?;
        Ok(parser::parse_ip_config(nic_name, &output.stdout))
    }

    /// Status of every adapter.
    pub fn nic_status(&self) -> Result<Vec<NicStatus>> {
        let args = vec!["/all".to_string()];
        let output = self.exec(IPCONFIG, &args, "GET_NIC_STATUS_FAILED", "Failed to query adapter status")?;
        Ok(parser::parse_nic_status(&output.stdout))
    }

    /// The adapter list with admin and connection state.
    pub fn interfaces(&self) -> Result<Vec<InterfaceEntry>> {
        let args = owned(&["interface", "show", "interface"]);
        let output = self.exec(NETSH, &args, "GET_NIC_LIST_FAILED", "Failed to list adapters")?;
        Ok(parser::parse_interface_list(&output.stdout))
    }

    /// Names of every adapter, in list order.
    pub fn nic_names(&self) -> Result<Vec<String>> {
        Ok(self.interfaces()?.into_iter().map(|entry| entry.name).collect())
    }

    /// Active IPv4 routes.
    pub fn routes(&self) -> Result<Vec<RouteEntry>> {
        let args = owned(&["print", "-4"]);
        let output = self.exec(ROUTE, &args, "GET_ROUTES_FAILED", "Failed to query route table")?;
        Ok(parser::parse_route_table(&output.stdout))
    }

    // ========================================
    // Configuration changes
    // ========================================

    /// Set a static address, mask and optional gateway.
    pub fn set_static_address(
        &self,
        nic_name: &str,
        ip: &str,
        mask: &str,
        gateway: Option<&str>,
    ) -> Result<()> {
        let mut tail = vec!["static", ip, mask];
        if let Some(gateway) = gateway {
            tail.push(gateway);
        }
        let args = netsh_args(&["interface", "ipv4", "set", "address"], nic_name, &tail);
        self.exec(NETSH, &args, "APPLY_IP_FAILED", "Failed to set IP address")?;
        Ok(())
    }

    /// Set the preferred DNS server.
    pub fn set_primary_dns(&self, nic_name: &str, dns: &str) -> Result<()> {
        let args = netsh_args(&["interface", "ipv4", "set", "dns"], nic_name, &["static", dns]);
        self.exec(NETSH, &args, "APPLY_DNS_FAILED", "Failed to set DNS server")?;
        Ok(())
    }

    /// Add the alternate DNS server at index 2.
    pub fn add_secondary_dns(&self, nic_name: &str, dns: &str) -> Result<()> {
        let args = netsh_args(&["interface", "ipv4", "add", "dns"], nic_name, &[dns, "index=2"]);
        self.exec(NETSH, &args, "APPLY_SECONDARY_DNS_FAILED", "Failed to add secondary DNS server")?;
        Ok(())
    }

    /// Switch the address source to DHCP.
    pub fn set_dhcp_address(&self, nic_name: &str) -> Result<()> {
        let args = netsh_args(&["interface", "ipv4", "set", "address"], nic_name, &["source=dhcp"]);
        self.exec(NETSH, &args, "APPLY_DHCP_FAILED", "Failed to enable DHCP")?;
        Ok(())
    }

    /// Switch the DNS source to DHCP.
    pub fn set_dhcp_dns(&self, nic_name: &str) -> Result<()> {
        let args = netsh_args(&["interface", "ipv4", "set", "dns"], nic_name, &["source=dhcp"]);
        self.exec(NETSH, &args, "APPLY_DNS_DHCP_FAILED", "Failed to enable DHCP for DNS")?;
        Ok(())
    }

    /// Run one command, turning start failures and non-zero exits into a
    /// coded error.
    fn exec(
        &self,
        program: &str,
        args: &[String],
        code: &'static str,
        message: &str,
    ) -> Result<CommandOutput> {
        // Every NIC name reaching a command line has already passed this check
        if let Some(name) = args.iter().find_map(|a| a.strip_prefix("name=")) {
            if !is_valid_nic_name(name) {
                return Err(Error::InvalidNicName(name.to_string()));
            }
        }

        let line = display_command(program, args);
        match self.runner.run(program, args) {
            Ok(output) if output.success => {
                debug!("Command succeeded: {}", line);
                Ok(output)
            }
            Ok(output) => {
                let detail = output.combined();
                warn!(code, "Command failed: {}: {}", line, detail);
                Err(Error::command(code, message, detail))
            }
            Err(e) => {
                warn!(code, "Command could not start: {}: {}", line, e);
                Err(Error::command(code, message, e.to_string()))
            }
        }
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// `<head...> name=<nic> <tail...>`
fn netsh_args(head: &[&str], nic_name: &str, tail: &[&str]) -> Vec<String> {
    let mut args = owned(head);
    args.push(format!("name={nic_name}"));
    args.extend(tail.iter().map(|a| a.to_string()));
    args
}
