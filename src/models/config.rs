// Fast IP Change - Application Configuration
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Application configuration model.
//!
//! The whole document is persisted as one JSON file; see
//! [`crate::storage::JsonConfigStore`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::profile::Profile;

/// Version written to new configuration files.
pub const DEFAULT_CONFIG_VERSION: &str = "1.0";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Log level (DEBUG, INFO, WARN, ERROR).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Show notifications after apply attempts.
    #[serde(default = "default_true")]
    pub enable_notifications: bool,

    /// NICs offered in the DHCP menu. Empty means every NIC.
    #[serde(
        rename = "enabledDHCPNICs",
        default,
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub enabled_dhcp_nics: BTreeSet<String>,
}

impl Settings {
    /// Check whether a NIC should appear in the DHCP menu.
    ///
    /// An empty set enables every NIC, which keeps files written before the
    /// setting existed working unchanged.
    pub fn is_nic_enabled_for_dhcp(&self, nic_name: &str) -> bool {
        self.enabled_dhcp_nics.is_empty() || self.enabled_dhcp_nics.contains(nic_name)
    }

    /// Replace the DHCP menu selection.
    pub fn set_enabled_dhcp_nics<I, S>(&mut self, nics: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_dhcp_nics = nics.into_iter().map(Into::into).collect();
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            enable_notifications: true,
            enabled_dhcp_nics: BTreeSet::new(),
        }
    }
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_true() -> bool {
    true
}

/// Complete persisted configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Document version.
    #[serde(default)]
    pub version: String,

    /// Start with the user session.
    #[serde(default)]
    pub auto_start: bool,

    /// Profiles in menu order.
    #[serde(default)]
    pub profiles: Vec<Profile>,

    /// Application settings.
    #[serde(default)]
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            auto_start: false,
            profiles: Vec::new(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Parse a configuration document, filling in a missing version.
    pub fn from_json(s: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(s)?;
        if config.version.trim().is_empty() {
            config.version = DEFAULT_CONFIG_VERSION.to_string();
        }
        Ok(config)
    }

    /// Serialize with 2-space indentation.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ConfigWriteFailed(e.to_string()))
    }

    /// Get a profile by ID.
    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id() == id)
    }

    /// Find a profile by ID, falling back to an exact name match.
    pub fn find_profile(&self, id_or_name: &str) -> Option<&Profile> {
        self.profile(id_or_name)
            .or_else(|| self.profiles.iter().find(|p| p.name == id_or_name))
    }

    /// Append a profile. Its ID must not already be present.
    pub fn add_profile(&mut self, profile: Profile) -> Result<()> {
        if self.profile(profile.id()).is_some() {
            return Err(Error::DuplicateProfileId(profile.id().to_string()));
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Replace the profile with the same ID, keeping its position.
    pub fn update_profile(&mut self, profile: Profile) -> Result<()> {
        match self.profiles.iter_mut().find(|p| p.id() == profile.id()) {
            Some(slot) => {
                *slot = profile;
                Ok(())
            }
            None => Err(Error::ProfileNotFound(profile.id().to_string())),
        }
    }

    /// Remove a profile by ID.
    pub fn remove_profile(&mut self, id: &str) -> Result<Profile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| Error::ProfileNotFound(id.to_string()))?;
        Ok(self.profiles.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut config = Config::default();
        config
            .add_profile(Profile::new("Office", "Ethernet", "192.168.1.10", "255.255.255.0"))
            .unwrap();
        config
            .add_profile(Profile::new("Lab", "Wi-Fi", "10.0.0.2", "255.0.0.0"))
            .unwrap();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert!(config.profiles.is_empty());
        assert_eq!(config.settings.log_level, "INFO");
        assert!(config.settings.enable_notifications);
        assert!(!config.auto_start);
    }

    #[test]
    fn test_missing_version_defaults() {
        let config = Config::from_json(r#"{"autoStart": true, "profiles": []}"#).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(config.auto_start);

        let config = Config::from_json(r#"{"version": "", "profiles": []}"#).unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_empty_dhcp_set_enables_all() {
        let mut settings = Settings::default();
        assert!(settings.is_nic_enabled_for_dhcp("Ethernet"));
        assert!(settings.is_nic_enabled_for_dhcp("Wi-Fi"));

        settings.set_enabled_dhcp_nics(["Wi-Fi"]);
        assert!(!settings.is_nic_enabled_for_dhcp("Ethernet"));
        assert!(settings.is_nic_enabled_for_dhcp("Wi-Fi"));
    }

    #[test]
    fn test_json_field_names() {
        let mut config = sample();
        config.settings.set_enabled_dhcp_nics(["Ethernet"]);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"autoStart\""));
        assert!(json.contains("\"enabledDHCPNICs\""));
        assert!(json.contains("\"enableNotifications\""));
        assert!(json.contains("\n  \"version\""));
    }

    #[test]
    fn test_empty_dhcp_set_is_omitted() {
        let json = Config::default().to_json().unwrap();
        assert!(!json.contains("enabledDHCPNICs"));
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut config = sample();
        let duplicate = config.profiles[0].clone();
        let err = config.add_profile(duplicate).unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_PROFILE_ID");
        assert_eq!(config.profiles.len(), 2);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut config = sample();
        let mut edited = config.profiles[0].clone();
        edited.name = "Office 2F".into();
        edited.ip_address = "192.168.2.10".into();
        config.update_profile(edited.clone()).unwrap();

        assert_eq!(config.profiles[0], edited);
        assert_eq!(config.profiles[1].name, "Lab");
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let mut config = sample();
        let stranger = Profile::new("X", "Ethernet", "1.2.3.4", "255.0.0.0");
        assert!(matches!(config.update_profile(stranger), Err(Error::ProfileNotFound(_))));
    }

    #[test]
    fn test_remove_and_find() {
        let mut config = sample();
        let lab_id = config.profiles[1].id().to_string();
        assert_eq!(config.find_profile("Lab").map(|p| p.id()), Some(lab_id.as_str()));
        assert_eq!(config.find_profile(&lab_id).map(|p| p.name.as_str()), Some("Lab"));

        let removed = config.remove_profile(&lab_id).unwrap();
        assert_eq!(removed.name, "Lab");
        assert!(config.find_profile("Lab").is_none());
        assert!(config.remove_profile(&lab_id).is_err());
    }
}
