// Fast IP Change - Route Table Parser
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Parser for the IPv4 route dump (`route print -4`).

use std::net::Ipv4Addr;

use super::patterns::{
    matches_any, ACTIVE_ROUTES_HEADER, PERSISTENT_ROUTES_HEADER, ROUTE_COLUMN_HEADER,
};
use crate::models::RouteEntry;

/// Parse the active routes between the "Active Routes" and "Persistent
/// Routes" headers.
pub fn parse_route_table(text: &str) -> Vec<RouteEntry> {
    let mut routes = Vec::new();
    let mut in_active = false;

    for raw in text.lines() {
        let line = raw.trim();

        if matches_any(ACTIVE_ROUTES_HEADER, line) {
            in_active = true;
            continue;
        }
        if !in_active {
            continue;
        }
        if matches_any(PERSISTENT_ROUTES_HEADER, line) {
            break;
        }
        if line.is_empty()
            || line.starts_with("==")
            || line.starts_with("--")
            || matches_any(ROUTE_COLUMN_HEADER, line)
        {
            continue;
        }

        if let Some(route) = parse_route_line(line) {
            routes.push(route);
        }
    }

    routes
}

fn parse_route_line(line: &str) -> Option<RouteEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 || fields[0].parse::<Ipv4Addr>().is_err() {
        return None;
    }

    Some(RouteEntry {
        destination: fields[0].to_string(),
        netmask: fields[1].to_string(),
        gateway: fields[2].to_string(),
        interface: fields[3].to_string(),
        metric: fields[4].parse().unwrap_or(0),
    })
}
