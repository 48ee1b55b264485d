// Fast IP Change - Locale Pattern Tables
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Locale tables for the labels printed by the Windows network tools.
//!
//! Each semantic field has an ordered list of `(Locale, MatchRule)` rows.
//! Parsers test lines with [`matches_any`] and cut adapter names out of
//! header lines with [`split_after_last`]; supporting another display
//! language means adding rows here.

/// Display language of the tool output a row matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    English,
    Japanese,
}

/// How a row matches a piece of text.
#[derive(Debug, Clone, Copy)]
pub enum MatchRule {
    /// Text starts with the needle.
    Prefix(&'static str),
    /// Text contains the needle.
    Contains(&'static str),
    /// Lowercased text contains the (lowercase) needle.
    ContainsIgnoreCase(&'static str),
    /// Text contains every needle.
    AllOf(&'static [&'static str]),
    /// Lowercased text contains every (lowercase) needle.
    AllOfIgnoreCase(&'static [&'static str]),
    /// Text equals the needle.
    Equals(&'static str),
}

impl MatchRule {
    pub fn matches(&self, text: &str) -> bool {
        match *self {
            Self::Prefix(needle) => text.starts_with(needle),
            Self::Contains(needle) => text.contains(needle),
            Self::ContainsIgnoreCase(needle) => text.to_lowercase().contains(needle),
            Self::AllOf(needles) => needles.iter().all(|n| text.contains(n)),
            Self::AllOfIgnoreCase(needles) => {
                let lower = text.to_lowercase();
                needles.iter().all(|n| lower.contains(n))
            }
            Self::Equals(needle) => text == needle,
        }
    }

    /// Byte offset just past the last occurrence of the needle.
    ///
    /// Only single-needle, case-sensitive rules can locate their match.
    fn end_of_last_match(&self, text: &str) -> Option<usize> {
        match *self {
            Self::Prefix(needle) => text.starts_with(needle).then_some(needle.len()),
            Self::Contains(needle) => text.rfind(needle).map(|pos| pos + needle.len()),
            Self::Equals(needle) => (text == needle).then_some(needle.len()),
            Self::ContainsIgnoreCase(_) | Self::AllOf(_) | Self::AllOfIgnoreCase(_) => None,
        }
    }
}

/// One table row.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub locale: Locale,
    pub rule: MatchRule,
}

const fn row(locale: Locale, rule: MatchRule) -> Pattern {
    Pattern { locale, rule }
}

/// Check whether any row of a table matches the text.
pub fn matches_any(table: &[Pattern], text: &str) -> bool {
    table.iter().any(|p| p.rule.matches(text))
}

/// Text following the right-most match of any row, with that row's locale.
pub fn split_after_last<'a>(table: &[Pattern], text: &'a str) -> Option<(Locale, &'a str)> {
    table
        .iter()
        .filter_map(|p| p.rule.end_of_last_match(text).map(|end| (end, p.locale)))
        .max_by_key(|(end, _)| *end)
        .map(|(end, locale)| (locale, &text[end..]))
}

use Locale::{English, Japanese};
use MatchRule::{AllOf, AllOfIgnoreCase, Contains, ContainsIgnoreCase, Equals, Prefix};

// ============================================================================
// ipconfig /all
// ============================================================================

/// Words marking an adapter section header. The adapter name follows the
/// right-most match.
pub const ADAPTER_HEADER: &[Pattern] = &[
    row(Japanese, Contains("アダプター")),
    row(English, Contains("adapter")),
    row(English, Contains("Adapter")),
];

/// Section-level marker for an unplugged adapter.
pub const MEDIA_DISCONNECTED: &[Pattern] = &[
    row(Japanese, Contains("メディアは接続されていません")),
    row(English, Contains("Media disconnected")),
    row(English, AllOf(&["Media State", "disconnected"])),
];

pub const CONNECTION_SPECIFIC_KEY: &[Pattern] = &[
    row(Japanese, Contains("接続固有")),
    row(English, ContainsIgnoreCase("connection-specific")),
];

pub const IPV4_ADDRESS_KEY: &[Pattern] = &[
    row(English, Contains("IPv4")),
    row(English, Contains("IP Address")),
    row(Japanese, Equals("IP アドレス")),
];

pub const SUBNET_KEY: &[Pattern] = &[
    row(Japanese, Contains("サブネット")),
    row(English, ContainsIgnoreCase("subnet")),
];

pub const GATEWAY_KEY: &[Pattern] = &[
    row(Japanese, Contains("ゲートウェイ")),
    row(English, ContainsIgnoreCase("gateway")),
];

pub const DNS_SERVERS_KEY: &[Pattern] = &[
    row(Japanese, AllOf(&["DNS", "サーバー"])),
    row(English, AllOfIgnoreCase(&["dns", "server"])),
];

pub const DHCP_ENABLED_KEY: &[Pattern] = &[
    row(Japanese, AllOf(&["DHCP", "有効"])),
    row(English, AllOfIgnoreCase(&["dhcp", "enabled"])),
];

/// Affirmative answer on a yes/no line.
pub const YES_VALUE: &[Pattern] = &[
    row(Japanese, Equals("はい")),
    row(English, Equals("Yes")),
    row(English, Equals("yes")),
    row(English, Equals("YES")),
];

// ============================================================================
// route print -4
// ============================================================================

pub const ACTIVE_ROUTES_HEADER: &[Pattern] = &[
    row(Japanese, Contains("アクティブ ルート")),
    row(English, Contains("Active Routes")),
];

pub const PERSISTENT_ROUTES_HEADER: &[Pattern] = &[
    row(Japanese, Contains("固定ルート")),
    row(English, Contains("Persistent Routes")),
];

pub const ROUTE_COLUMN_HEADER: &[Pattern] = &[
    row(Japanese, Contains("ネットワーク")),
    row(English, Contains("Network")),
];

// ============================================================================
// netsh interface ipv4 show config
// ============================================================================

pub const CONFIG_IP_ADDRESS: &[Pattern] = &[
    row(Japanese, Prefix("IP アドレス")),
    row(English, Prefix("IP Address")),
];

pub const CONFIG_SUBNET: &[Pattern] = &[
    row(Japanese, Prefix("サブネット マスク")),
    row(Japanese, Prefix("サブネット プレフィックス")),
    row(English, Prefix("Subnet Mask")),
    row(English, Prefix("Subnet Prefix")),
];

pub const CONFIG_GATEWAY: &[Pattern] = &[
    row(Japanese, Prefix("デフォルト ゲートウェイ")),
    row(English, Prefix("Default Gateway")),
];

/// DNS labels carry a source qualifier in front ("Statically Configured",
/// "静的に構成された"), so these rows match anywhere in the line.
pub const CONFIG_DNS: &[Pattern] = &[
    row(Japanese, Contains("DNS サーバー")),
    row(English, ContainsIgnoreCase("dns servers")),
];

// ============================================================================
// netsh interface show interface
// ============================================================================

pub const INTERFACE_LIST_HEADER: &[Pattern] = &[
    row(English, Prefix("Admin State")),
    row(English, Prefix("State")),
    row(Japanese, Prefix("管理状態")),
    row(Japanese, Prefix("状態")),
    row(English, Contains("---")),
];
