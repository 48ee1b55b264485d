// Fast IP Change - Adapter Status Parser
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Parser for the adapter-detail dump (`ipconfig /all`).
//!
//! The dump is split into sections at adapter header lines; each section
//! becomes one [`NicStatus`]. Text before the first header (the host
//! block) is ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::normalize_subnet;
use super::patterns::{
    matches_any, split_after_last, ADAPTER_HEADER, CONNECTION_SPECIFIC_KEY, DHCP_ENABLED_KEY, DNS_SERVERS_KEY,
    GATEWAY_KEY, IPV4_ADDRESS_KEY, MEDIA_DISCONNECTED, SUBNET_KEY, YES_VALUE,
};
use crate::models::validation::is_valid_ipv4;
use crate::models::{ConnectionState, DhcpState, NicStatus};

/// Trailing annotation such as "(Preferred)" or "(優先)".
static TRAILING_ANNOTATION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*$").ok());

fn strip_annotation(value: &str) -> String {
    match TRAILING_ANNOTATION.as_ref() {
        Some(re) => re.replace(value, "").into_owned(),
        None => value.to_string(),
    }
}

/// Parse every adapter section of an `ipconfig /all` dump.
pub fn parse_nic_status(text: &str) -> Vec<NicStatus> {
    let mut result = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(name) = adapter_header_name(line) {
            if let Some((name, body)) = current.take() {
                result.push(parse_section(name, &body));
            }
            current = Some((name, Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((name, body)) = current {
        result.push(parse_section(name, &body));
    }

    result
}

/// Return the adapter name if the line is a section header.
///
/// A header starts in column 0, mentions an adapter word and ends with a
/// colon. The name is everything after the last adapter word.
fn adapter_header_name(line: &str) -> Option<String> {
    if line.is_empty() || line.starts_with(char::is_whitespace) {
        return None;
    }
    let line = line.trim_end();
    let without_colon = line.strip_suffix(':')?;

    let (locale, rest) = split_after_last(ADAPTER_HEADER, without_colon)?;
    debug!(?locale, "Adapter section header: {}", without_colon);

    let name = rest.trim();
    if name.is_empty() {
        Some(without_colon.trim().to_string())
    } else {
        Some(name.to_string())
    }
}

fn parse_section(name: String, body: &[&str]) -> NicStatus {
    let mut status = NicStatus::new(name);

    if body.iter().any(|line| matches_any(MEDIA_DISCONNECTED, line)) {
        status.connection_state = ConnectionState::Disconnected;
        return status;
    }

    let mut ip: Option<String> = None;
    let mut subnet: Option<String> = None;
    let mut gateway: Option<String> = None;
    let mut dhcp: Option<DhcpState> = None;
    let mut dns: Vec<String> = Vec::new();
    let mut awaiting_gateway = false;

    for raw in body {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once(':') else {
            // Continuation line holding only an address
            if is_valid_ipv4(line) {
                if awaiting_gateway && gateway.is_none() {
                    gateway = Some(line.to_string());
                } else if !dns.is_empty() {
                    dns.push(line.to_string());
                }
            }
            continue;
        };

        let key = normalize_key(raw_key);
        let value = raw_value.trim();
        awaiting_gateway = false;

        if matches_any(CONNECTION_SPECIFIC_KEY, key) {
            status.connection_state = ConnectionState::Connected;
            continue;
        }

        if matches_any(IPV4_ADDRESS_KEY, key) {
            status.connection_state = ConnectionState::Connected;
            if ip.is_none() && !value.is_empty() {
                ip = Some(strip_annotation(value));
            }
        } else if matches_any(SUBNET_KEY, key) {
            if subnet.is_none() && !value.is_empty() {
                subnet = Some(normalize_subnet(value));
            }
        } else if matches_any(GATEWAY_KEY, key) {
            // IPv6 gateways come first; the IPv4 one may follow on its own line
            if gateway.is_none() {
                if is_valid_ipv4(value) {
                    gateway = Some(value.to_string());
                } else {
                    awaiting_gateway = true;
                }
            }
        } else if matches_any(DNS_SERVERS_KEY, key) {
            if !value.is_empty() {
                dns.push(value.to_string());
            }
        } else if matches_any(DHCP_ENABLED_KEY, key) && dhcp.is_none() {
            dhcp = Some(if matches_any(YES_VALUE, value) {
                DhcpState::Enabled
            } else {
                DhcpState::Disabled
            });
        }
    }

    if let Some(ip) = ip {
        status.ip_address = ip;
    }
    if let Some(subnet) = subnet {
        status.subnet_mask = subnet;
    }
    if let Some(gateway) = gateway {
        status.gateway = gateway;
    }
    if !dns.is_empty() {
        status.dns = dns.join(", ");
    }
    if let Some(dhcp) = dhcp {
        status.dhcp = dhcp;
    }

    status
}

/// Strip the dot leaders ipconfig pads keys with.
fn normalize_key(key: &str) -> &str {
    key.trim().trim_end_matches(|c: char| c == '.' || c.is_whitespace())
}
