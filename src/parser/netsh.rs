// Fast IP Change - netsh Output Parsers
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Parsers for `netsh interface ipv4 show config` and
//! `netsh interface show interface`.

use super::normalize_subnet;
use super::patterns::{
    matches_any, CONFIG_DNS, CONFIG_GATEWAY, CONFIG_IP_ADDRESS, CONFIG_SUBNET,
    INTERFACE_LIST_HEADER,
};
use crate::models::{InterfaceEntry, IpConfig};

/// Parse one adapter's `show config` dump.
///
/// Each field takes the last token of the first matching line.
pub fn parse_ip_config(nic_name: &str, text: &str) -> IpConfig {
    let mut config = IpConfig::new(nic_name);

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if config.ip_address.is_none() && matches_any(CONFIG_IP_ADDRESS, line) {
            config.ip_address = last_value_token(line);
        } else if config.subnet_mask.is_none() && matches_any(CONFIG_SUBNET, line) {
            config.subnet_mask = last_value_token(line).map(|v| normalize_subnet(&v));
        } else if config.gateway.is_none() && matches_any(CONFIG_GATEWAY, line) {
            config.gateway = last_value_token(line);
        } else if config.dns_primary.is_none() && matches_any(CONFIG_DNS, line) {
            config.dns_primary = last_value_token(line);
        }
    }

    config
}

/// Last whitespace token after the first colon, without wrapping parens.
fn last_value_token(line: &str) -> Option<String> {
    let (_, value) = line.split_once(':')?;
    let token = value
        .split_whitespace()
        .last()?
        .trim_start_matches('(')
        .trim_end_matches(')');
    (!token.is_empty()).then(|| token.to_string())
}

/// Parse the adapter list.
///
/// Rows are `Admin State  State  Type  Interface Name`; names may contain
/// spaces and are re-joined.
pub fn parse_interface_list(text: &str) -> Vec<InterfaceEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !matches_any(INTERFACE_LIST_HEADER, line))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.len() {
                0..=2 => None,
                3 => Some(InterfaceEntry {
                    admin_state: fields[0].to_string(),
                    state: fields[1].to_string(),
                    interface_type: String::new(),
                    name: fields[2].to_string(),
                }),
                _ => Some(InterfaceEntry {
                    admin_state: fields[0].to_string(),
                    state: fields[1].to_string(),
                    interface_type: fields[2].to_string(),
                    name: fields[3..].join(" "),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH_CONFIG: &str = "\
Configuration for interface \"Ethernet\"
    DHCP enabled:                         No
    IP Address:                           192.168.1.10
    Subnet Prefix:                        192.168.1.0/24 (mask 255.255.255.0)
    Default Gateway:                      192.168.1.1
    Gateway Metric:                       0
    InterfaceMetric:                      25
    Statically Configured DNS Servers:    8.8.8.8
                                          8.8.4.4
    Register with which suffix:           Primary only
    Statically Configured WINS Servers:   None
";

    const JAPANESE_CONFIG: &str = "\
インターフェイス \"イーサネット\" の構成
    DHCP 有効:                          いいえ
    IP アドレス:                           10.0.0.5
    サブネット プレフィックス:                   10.0.0.0/16 (マスク 255.255.0.0)
    デフォルト ゲートウェイ:                    10.0.0.1
    ゲートウェイ メトリック:                    0
    静的に構成された DNS サーバー:               10.0.0.1
";

    #[test]
    fn test_english_config() {
        let config = parse_ip_config("Ethernet", ENGLISH_CONFIG);
        assert_eq!(config.nic_name, "Ethernet");
        assert_eq!(config.ip_address.as_deref(), Some("192.168.1.10"));
        assert_eq!(config.subnet_mask.as_deref(), Some("255.255.255.0"));
        assert_eq!(config.gateway.as_deref(), Some("192.168.1.1"));
        assert_eq!(config.dns_primary.as_deref(), Some("8.8.8.8"));
    }

    #[test]
    fn test_japanese_config() {
        let config = parse_ip_config("イーサネット", JAPANESE_CONFIG);
        assert_eq!(config.ip_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(config.subnet_mask.as_deref(), Some("255.255.0.0"));
        assert_eq!(config.gateway.as_deref(), Some("10.0.0.1"));
        assert_eq!(config.dns_primary.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_dhcp_dns_label_and_first_occurrence() {
        let text = "\
    DNS servers configured through DHCP:  192.168.1.1
                                          192.168.1.2
    DNS servers configured through DHCP:  10.10.10.10
";
        let config = parse_ip_config("Ethernet", text);
        assert_eq!(config.dns_primary.as_deref(), Some("192.168.1.1"));
    }

    #[test]
    fn test_prefix_only_subnet() {
        let config = parse_ip_config("Ethernet", "    Subnet Prefix:   172.16.0.0/12\n");
        assert_eq!(config.subnet_mask.as_deref(), Some("255.240.0.0"));

        let config = parse_ip_config("Ethernet", "    Subnet Prefix:   /33\n");
        assert_eq!(config.subnet_mask.as_deref(), Some("255.255.255.0"));
    }

    #[test]
    fn test_missing_values_stay_none() {
        let config = parse_ip_config("Ethernet", "    Default Gateway:\n    DHCP enabled: Yes\n");
        assert_eq!(config.gateway, None);
        assert_eq!(config.ip_address, None);

        let config = parse_ip_config("Ethernet", "");
        assert_eq!(config, IpConfig::new("Ethernet"));
    }

    #[test]
    fn test_interface_list() {
        let text = "\
Admin State    State          Type             Interface Name
-------------------------------------------------------------------------
Enabled        Connected      Dedicated        Ethernet
Enabled        Disconnected   Dedicated        Wi-Fi
Disabled       Disconnected   Dedicated        Ethernet 2 (USB)
";
        let entries = parse_interface_list(text);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "Ethernet");
        assert_eq!(entries[0].state, "Connected");
        assert_eq!(entries[1].interface_type, "Dedicated");
        assert_eq!(entries[2].admin_state, "Disabled");
        assert_eq!(entries[2].name, "Ethernet 2 (USB)");
    }

    #[test]
    fn test_japanese_interface_list() {
        let text = "\
管理状態       状態           種類             インターフェイス名
-------------------------------------------------------------------------
有効           接続済み       専用             イーサネット
有効           切断           専用             Wi-Fi
";
        let entries = parse_interface_list(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "イーサネット");
        assert_eq!(entries[1].state, "切断");
    }

    #[test]
    fn test_three_column_row() {
        let entries = parse_interface_list("Enabled Connected Ethernet\n");
        assert_eq!(entries[0].name, "Ethernet");
        assert_eq!(entries[0].interface_type, "");
    }
}
