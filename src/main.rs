// Fast IP Change - Main Entry Point
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! # Fast IP Change
//!
//! Switches Windows network adapters between saved static IP profiles and
//! DHCP from a console menu or one-shot commands.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

mod admin;
mod application;
mod command;
mod logging;
mod models;
mod network;
mod parser;
mod services;
mod storage;

use application::{Application, ProfileFields};
use command::SystemCommandRunner;
use models::APP_NAME;
use services::{ConsoleNotifier, Notifier, SilentNotifier};
use storage::{ConfigStore, JsonConfigStore};

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Print version information and exit.
fn print_version() {
    println!("{} {}", APP_NAME, VERSION);
    println!("Copyright (C) 2026 Fast IP Change contributors");
    println!("License: MIT");
}

/// Print help information and exit.
fn print_help() {
    let program = env::args().next().unwrap_or_else(|| "fast-ip-change".to_string());
    println!("Usage: {} [OPTIONS] [COMMAND]", program);
    println!();
    println!("Switch network adapters between static IP profiles and DHCP.");
    println!();
    println!("Commands:");
    println!("  menu                                  Interactive menu (default)");
    println!("  status                                Show adapter status");
    println!("  routes                                Show the IPv4 route table");
    println!("  nics                                  List adapters");
    println!("  profiles                              List saved profiles");
    println!("  apply <id|name>                       Apply a profile");
    println!("  dhcp <nic>                            Switch an adapter to DHCP");
    println!("  add <name> <nic> <ip> <mask> [gateway] [dns1] [dns2]");
    println!("                                        Save a new profile ('-' skips a field, mask may be 24)");
    println!("  edit <id|name> <name> <nic> <ip> <mask> [gateway] [dns1] [dns2]");
    println!("                                        Replace a profile's fields, keeping its ID");
    println!("  remove <id|name>                      Delete a profile");
    println!("  dhcp-nics [nic...]                    Adapters offered in the DHCP menu (none = all)");
    println!("  logs [file]                           Print the newest or a named log file");
    println!("  config-path                           Print the settings file path");
    println!();
    println!("Options:");
    println!("  -h, --help       Show this help message and exit");
    println!("  -v, --version    Show version information and exit");
    println!("  -d, --debug      Enable debug logging");
    println!();
    println!("Environment variables:");
    println!("  RUST_LOG         Extra log directives (trace, debug, info, warn, error)");
    println!("  EDITOR, VISUAL   Editor used by the menu's settings entry");
}

/// Parsed sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Menu,
    Status,
    Routes,
    Nics,
    Profiles,
    Apply(String),
    Dhcp(String),
    Add(ProfileFields),
    Edit(String, ProfileFields),
    Remove(String),
    DhcpNics(Vec<String>),
    Logs(Option<String>),
    ConfigPath,
}

impl Command {
    fn parse(words: &[String]) -> Result<Self, String> {
        let Some((name, rest)) = words.split_first() else {
            return Ok(Self::Menu);
        };

        let exact = |n: usize| -> Result<(), String> {
            if rest.len() == n {
                Ok(())
            } else {
                Err(format!("'{}' takes {} argument(s)", name, n))
            }
        };

        match name.as_str() {
            "menu" => exact(0).map(|_| Self::Menu),
            "status" => exact(0).map(|_| Self::Status),
            "routes" => exact(0).map(|_| Self::Routes),
            "nics" => exact(0).map(|_| Self::Nics),
            "profiles" => exact(0).map(|_| Self::Profiles),
            "config-path" => exact(0).map(|_| Self::ConfigPath),
            "apply" => exact(1).map(|_| Self::Apply(rest[0].clone())),
            "dhcp" => exact(1).map(|_| Self::Dhcp(rest[0].clone())),
            "remove" => exact(1).map(|_| Self::Remove(rest[0].clone())),
            "dhcp-nics" => Ok(Self::DhcpNics(rest.to_vec())),
            "logs" => match rest {
                [] => Ok(Self::Logs(None)),
                [file] => Ok(Self::Logs(Some(file.clone()))),
                _ => Err("'logs' takes at most 1 argument".to_string()),
            },
            "add" => {
                if !(4..=7).contains(&rest.len()) {
                    return Err("'add' takes 4 to 7 arguments".to_string());
                }
                Ok(Self::Add(profile_fields(rest)))
            }
            "edit" => {
                if !(5..=8).contains(&rest.len()) {
                    return Err("'edit' takes 5 to 8 arguments".to_string());
                }
                Ok(Self::Edit(rest[0].clone(), profile_fields(&rest[1..])))
            }
            other => Err(format!("Unknown command: {}", other)),
        }
    }

    fn needs_elevation(&self) -> bool {
        matches!(self, Self::Menu | Self::Apply(_) | Self::Dhcp(_))
    }
}

/// Positional profile fields; a missing trailing field or "-" is empty.
fn profile_fields(args: &[String]) -> ProfileFields {
    let field = |i: usize| match args.get(i).map(String::as_str) {
        None | Some("-") => String::new(),
        Some(v) => v.to_string(),
    };
    ProfileFields {
        name: field(0),
        nic_name: field(1),
        ip_address: field(2),
        subnet_mask: field(3),
        gateway: field(4),
        dns_primary: field(5),
        dns_secondary: field(6),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut debug_mode = false;
    let mut words = Vec::new();

    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            "-d" | "--debug" => {
                debug_mode = true;
            }
            _ => {
                if arg.starts_with('-') && arg != "-" {
                    eprintln!("Unknown option: {}", arg);
                    eprintln!("Try '--help' for more information.");
                    return ExitCode::FAILURE;
                }
                words.push(arg.clone());
            }
        }
    }

    let command = match Command::parse(&words) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Try '--help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    // The configured level needs the settings file before logging is up
    let store = JsonConfigStore::new();
    let configured_level = store
        .load()
        .map(|c| logging::parse_level(&c.settings.log_level))
        .unwrap_or(tracing::Level::INFO);
    let log_level = if debug_mode {
        tracing::Level::DEBUG
    } else {
        configured_level
    };
    let log_dir = logging::default_log_dir();
    let _log_guard = logging::init(log_level, &log_dir);

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    if command.needs_elevation() && !admin::is_elevated() {
        eprintln!("{} must be run as administrator to change adapter settings.", APP_NAME);
        tracing::error!("Not elevated; refusing to run {:?}", command);
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // One-shot commands print their own outcome
    let notifier: Arc<dyn Notifier> = if command == Command::Menu {
        Arc::new(ConsoleNotifier)
    } else {
        Arc::new(SilentNotifier)
    };

    let app = match Application::new(
        store,
        Arc::new(SystemCommandRunner),
        notifier,
        runtime.handle().clone(),
        log_dir,
    ) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("[{}] {}", e.code(), e);
            tracing::error!(code = e.code(), "Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Menu => runtime.block_on(app.run_menu()),
        Command::Status => app.print_status(),
        Command::Routes => app.print_routes(),
        Command::Nics => app.print_nics(),
        Command::Profiles => {
            app.print_profiles();
            Ok(())
        }
        Command::Apply(id) => app.apply(&id).map(|_| ()),
        Command::Dhcp(nic) => app.dhcp(&nic).map(|_| ()),
        Command::Add(fields) => app.add_profile(fields).map(|p| {
            println!("Added {} ({})", p.menu_label(), p.id());
        }),
        Command::Edit(id, fields) => app.edit_profile(&id, fields).map(|p| {
            println!("Updated {} ({})", p.menu_label(), p.id());
        }),
        Command::Remove(id) => app.remove_profile(&id).map(|p| {
            println!("Removed {} ({})", p.menu_label(), p.id());
        }),
        Command::DhcpNics(nics) => app.set_dhcp_nics(nics),
        Command::Logs(file) => app.show_logs(file.as_deref()),
        Command::ConfigPath => {
            println!("{}", app.config_path().display());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[{}] {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}
