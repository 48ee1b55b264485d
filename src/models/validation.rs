// Fast IP Change - Validation Utilities
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Input validation for profiles and NIC names.
//!
//! Profiles loaded from the settings file are untrusted: their values end up
//! on an external command line, so every field is checked before use.

use std::net::Ipv4Addr;
use std::str::FromStr;

use super::error::ValidationError;
use super::profile::Profile;

/// Maximum accepted NIC name length, in characters.
pub const MAX_NIC_NAME_LEN: usize = 256;

/// Characters that may never appear in a NIC name.
pub const FORBIDDEN_NIC_CHARS: &[char] = &[
    '&', '|', ';', '$', '`', '!', '<', '>', '(', ')', '{', '}', '[', ']', '"', '\'', '\\', '\n',
    '\r', '\t', '\0',
];

/// Check whether a string is a well-formed IPv4 dotted-quad literal.
pub fn is_valid_ipv4(s: &str) -> bool {
    Ipv4Addr::from_str(s).is_ok()
}

/// Check whether a 32-bit pattern is a contiguous-prefix netmask.
///
/// A run of 1-bits followed by a run of 0-bits; the all-zero pattern is
/// rejected.
pub fn is_contiguous_mask(bits: u32) -> bool {
    if bits == 0 {
        return false;
    }
    let inverted = !bits;
    inverted & inverted.wrapping_add(1) == 0
}

/// Check whether a dotted-quad string is a valid subnet mask.
pub fn is_valid_subnet_mask(mask: &str) -> bool {
    match Ipv4Addr::from_str(mask) {
        Ok(addr) => is_contiguous_mask(u32::from(addr)),
        Err(_) => false,
    }
}

/// Check whether a NIC name is safe to place on a command line.
pub fn is_valid_nic_name(name: &str) -> bool {
    if name.is_empty() || name.chars().count() > MAX_NIC_NAME_LEN {
        return false;
    }
    !name.contains(FORBIDDEN_NIC_CHARS)
}

/// Validate a profile, returning the first failing check.
///
/// The order is fixed so that error messages are deterministic.
pub fn validate_profile(profile: &Profile) -> Result<(), ValidationError> {
    if profile.name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if profile.ip_address.is_empty() {
        return Err(ValidationError::EmptyIpAddress);
    }
    if profile.subnet_mask.is_empty() {
        return Err(ValidationError::EmptySubnetMask);
    }
    if profile.nic_name.is_empty() {
        return Err(ValidationError::EmptyNicName);
    }
    if !is_valid_nic_name(&profile.nic_name) {
        return Err(ValidationError::UnsafeNicName);
    }
    if !is_valid_ipv4(&profile.ip_address) {
        return Err(ValidationError::InvalidIpAddress(profile.ip_address.clone()));
    }
    if !is_valid_subnet_mask(&profile.subnet_mask) {
        return Err(ValidationError::InvalidSubnetMask(profile.subnet_mask.clone()));
    }
    if let Some(gateway) = profile.gateway.as_deref() {
        if !is_valid_ipv4(gateway) {
            return Err(ValidationError::InvalidGateway(gateway.to_string()));
        }
    }
    if let Some(dns) = profile.dns_primary.as_deref() {
        if !is_valid_ipv4(dns) {
            return Err(ValidationError::InvalidDnsPrimary(dns.to_string()));
        }
    }
    if let Some(dns) = profile.dns_secondary.as_deref() {
        if !is_valid_ipv4(dns) {
            return Err(ValidationError::InvalidDnsSecondary(dns.to_string()));
        }
    }
    Ok(())
}
