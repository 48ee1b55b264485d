// Fast IP Change - Profile Data Model
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Profile data model and serialization.
//!
//! A Profile is a named static IPv4 configuration bound to one NIC:
//! address, subnet mask, and optional gateway and DNS servers.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::error::ValidationError;
use super::validation;

/// A named static IP configuration for one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique profile identifier, assigned once at creation.
    id: String,
    /// Profile name (user-visible).
    pub name: String,
    /// Static IPv4 address.
    pub ip_address: String,
    /// Subnet mask in dotted-quad form.
    pub subnet_mask: String,
    /// Default gateway.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub gateway: Option<String>,
    /// Preferred DNS server.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub dns_primary: Option<String>,
    /// Alternate DNS server.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub dns_secondary: Option<String>,
    /// Adapter name as enumerated by the OS.
    pub nic_name: String,
}

impl Profile {
    /// Create a new profile with a freshly generated ID.
    pub fn new(
        name: impl Into<String>,
        nic_name: impl Into<String>,
        ip_address: impl Into<String>,
        subnet_mask: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            ip_address: ip_address.into(),
            subnet_mask: subnet_mask.into(),
            gateway: None,
            dns_primary: None,
            dns_secondary: None,
            nic_name: nic_name.into(),
        }
    }

    /// Get the profile ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replacement record for this profile: new field values, same ID.
    ///
    /// Optional fields start out absent.
    pub fn edited(
        &self,
        name: impl Into<String>,
        nic_name: impl Into<String>,
        ip_address: impl Into<String>,
        subnet_mask: impl Into<String>,
    ) -> Self {
        Self {
            id: self.id.clone(),
            ..Self::new(name, nic_name, ip_address, subnet_mask)
        }
    }

    /// Set the gateway, treating an empty string as absent.
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = non_empty(gateway.into());
        self
    }

    /// Set the DNS servers, treating empty strings as absent.
    pub fn with_dns(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.dns_primary = non_empty(primary.into());
        self.dns_secondary = non_empty(secondary.into());
        self
    }

    /// Validate this profile (first failing reason only).
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_profile(self)
    }

    /// Menu label for this profile.
    pub fn menu_label(&self) -> String {
        format!("{} [{}]", self.name, self.nic_name)
    }
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Hand-edited files may carry `""` for an unset optional field.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(non_empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_creation() {
        let profile = Profile::new("Office", "Ethernet", "192.168.1.10", "255.255.255.0");
        assert_eq!(profile.name, "Office");
        assert!(Uuid::parse_str(profile.id()).is_ok());
        assert!(profile.gateway.is_none());
        assert_eq!(profile.menu_label(), "Office [Ethernet]");
    }

    #[test]
    fn test_edited_keeps_id() {
        let office = Profile::new("Office", "Ethernet", "192.168.1.10", "255.255.255.0")
            .with_dns("8.8.8.8", "");
        let moved = office.edited("Office 2F", "Wi-Fi", "10.0.0.5", "255.0.0.0");
        assert_eq!(moved.id(), office.id());
        assert_eq!(moved.nic_name, "Wi-Fi");
        assert!(moved.dns_primary.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Profile::new("A", "Ethernet", "10.0.0.1", "255.0.0.0");
        let b = Profile::new("A", "Ethernet", "10.0.0.1", "255.0.0.0");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_clone_preserves_id() {
        let profile = Profile::new("Original", "Wi-Fi", "10.0.0.1", "255.0.0.0");
        let cloned = profile.clone();
        assert_eq!(cloned.id(), profile.id());
    }

    #[test]
    fn test_serialization_uses_camel_case_and_omits_absent() {
        let profile = Profile::new("Home", "Wi-Fi", "192.168.0.20", "255.255.255.0")
            .with_gateway("192.168.0.1");
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["ipAddress"], "192.168.0.20");
        assert_eq!(json["subnetMask"], "255.255.255.0");
        assert_eq!(json["nicName"], "Wi-Fi");
        assert_eq!(json["gateway"], "192.168.0.1");
        assert!(json.get("dnsPrimary").is_none());
        assert!(json.get("dnsSecondary").is_none());
    }

    #[test]
    fn test_empty_optional_strings_load_as_absent() {
        let json = r#"{
            "id": "abc",
            "name": "Lab",
            "ipAddress": "10.1.1.1",
            "subnetMask": "255.255.0.0",
            "gateway": "",
            "dnsPrimary": "1.1.1.1",
            "nicName": "Ethernet 2"
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id(), "abc");
        assert!(profile.gateway.is_none());
        assert_eq!(profile.dns_primary.as_deref(), Some("1.1.1.1"));
        assert!(profile.dns_secondary.is_none());
    }

    #[test]
    fn test_builder_trims_values() {
        let profile = Profile::new("Lab", "Ethernet", "10.1.1.1", "255.255.0.0").with_dns(" 8.8.8.8 ", "");
        assert_eq!(profile.dns_primary.as_deref(), Some("8.8.8.8"));
        assert!(profile.dns_secondary.is_none());
    }
}
