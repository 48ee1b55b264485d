// Fast IP Change - Tool Output Parsers
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! # Tool Output Parsers
//!
//! Turns decoded text from the Windows network tools into structured
//! records:
//!
//! - **ipconfig**: per-adapter status from `ipconfig /all`
//! - **netsh**: single-adapter config and the adapter list
//! - **route**: active IPv4 routes from `route print -4`
//!
//! Parsers never fail. Malformed or unexpected input yields empty or
//! partially filled records with their placeholder defaults.

pub mod ipconfig;
pub mod netsh;
pub mod patterns;
pub mod route;

use std::net::Ipv4Addr;

pub use ipconfig::parse_nic_status;
pub use netsh::{parse_interface_list, parse_ip_config};
pub use route::parse_route_table;

/// Mask used when a prefix length is missing or out of range.
pub const FALLBACK_SUBNET_MASK: &str = "255.255.255.0";

/// Convert a CIDR prefix length ("24" or "/24") to a dotted mask.
///
/// Lengths outside 1..=32 and non-numeric input give
/// [`FALLBACK_SUBNET_MASK`].
pub fn prefix_to_subnet_mask(prefix: &str) -> String {
    let digits = prefix.trim().trim_start_matches('/');
    match digits.parse::<u32>() {
        Ok(len) if (1..=32).contains(&len) => {
            let bits = u32::MAX << (32 - len);
            Ipv4Addr::from(bits).to_string()
        }
        _ => FALLBACK_SUBNET_MASK.to_string(),
    }
}

/// Normalize a subnet value that may be dotted or CIDR.
///
/// "/24", "24" and "192.168.1.0/24" become dotted masks; anything else is
/// returned unchanged.
pub(crate) fn normalize_subnet(value: &str) -> String {
    let value = value.trim();
    if let Some((_, prefix)) = value.rsplit_once('/') {
        return prefix_to_subnet_mask(prefix);
    }
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return prefix_to_subnet_mask(value);
    }
    value.to_string()
}
