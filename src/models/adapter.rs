// Fast IP Change - Adapter State
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Runtime adapter records produced by the parser.
//!
//! None of these are persisted; they are rebuilt from tool output on every
//! query.

/// Placeholder shown for fields the tool output did not provide.
pub const PLACEHOLDER: &str = "-";

/// Connection state of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    #[default]
    Unknown,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Unknown => "Unknown",
        }
    }
}

/// Whether DHCP is enabled on an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DhcpState {
    Enabled,
    Disabled,
    #[default]
    Unknown,
}

impl DhcpState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::Unknown => PLACEHOLDER,
        }
    }
}

/// Status of one adapter, from the adapter-detail dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicStatus {
    /// Adapter name (header text without the adapter keyword).
    pub name: String,
    pub connection_state: ConnectionState,
    pub ip_address: String,
    pub subnet_mask: String,
    pub gateway: String,
    /// DNS servers joined with ", ".
    pub dns: String,
    pub dhcp: DhcpState,
}

impl NicStatus {
    /// Create a status with every field at its placeholder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection_state: ConnectionState::Unknown,
            ip_address: PLACEHOLDER.to_string(),
            subnet_mask: PLACEHOLDER.to_string(),
            gateway: PLACEHOLDER.to_string(),
            dns: PLACEHOLDER.to_string(),
            dhcp: DhcpState::Unknown,
        }
    }
}

/// IPv4 configuration of one adapter, from the per-adapter config dump.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IpConfig {
    pub nic_name: String,
    pub ip_address: Option<String>,
    pub subnet_mask: Option<String>,
    pub gateway: Option<String>,
    pub dns_primary: Option<String>,
}

impl IpConfig {
    pub fn new(nic_name: impl Into<String>) -> Self {
        Self {
            nic_name: nic_name.into(),
            ..Self::default()
        }
    }
}

/// One row of the adapter-list dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceEntry {
    pub admin_state: String,
    pub state: String,
    pub interface_type: String,
    pub name: String,
}

/// One IPv4 active route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub destination: String,
    pub netmask: String,
    pub gateway: String,
    pub interface: String,
    pub metric: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_status_uses_placeholders() {
        let status = NicStatus::new("Ethernet");
        assert_eq!(status.connection_state, ConnectionState::Unknown);
        assert_eq!(status.ip_address, PLACEHOLDER);
        assert_eq!(status.dns, PLACEHOLDER);
        assert_eq!(status.dhcp.as_str(), PLACEHOLDER);
    }
}
