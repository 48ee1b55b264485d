// Fast IP Change - Application
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Application root: wires storage, tools and services together and
//! implements the console front end.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::command::CommandRunner;
use crate::logging;
use crate::models::{ApplyReport, Error, Profile, Result, APP_NAME};
use crate::network::NetworkTools;
use crate::parser::prefix_to_subnet_mask;
use crate::services::{Applier, MenuCoordinator, Notifier, ProfileActivator};
use crate::storage::{ConfigStore, JsonConfigStore, SharedConfig};

/// Profile fields as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub nic_name: String,
    pub ip_address: String,
    pub subnet_mask: String,
    pub gateway: String,
    pub dns_primary: String,
    pub dns_secondary: String,
}

impl ProfileFields {
    /// Build a profile with a fresh ID.
    fn into_profile(self) -> Profile {
        let mask = expand_prefix_length(&self.subnet_mask);
        Profile::new(self.name, self.nic_name, self.ip_address, mask)
            .with_gateway(self.gateway)
            .with_dns(self.dns_primary, self.dns_secondary)
    }

    /// Build the replacement record for `current`, keeping its ID.
    fn into_edit_of(self, current: &Profile) -> Profile {
        let mask = expand_prefix_length(&self.subnet_mask);
        current
            .edited(self.name, self.nic_name, self.ip_address, mask)
            .with_gateway(self.gateway)
            .with_dns(self.dns_primary, self.dns_secondary)
    }
}

/// Accept "24" or "/24" for a mask. Anything else, including prefix
/// lengths outside 1..=32, is kept as typed for validation to judge.
fn expand_prefix_length(mask: &str) -> String {
    let digits = mask.trim().trim_start_matches('/');
    match digits.parse::<u32>() {
        Ok(len) if (1..=32).contains(&len) => prefix_to_subnet_mask(digits),
        _ => mask.to_string(),
    }
}

/// One line of operator input in the console menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 1-based profile entry.
    Profile(usize),
    /// 1-based DHCP entry.
    Dhcp(usize),
    Status,
    Settings,
    Reload,
    Quit,
    Invalid,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_ascii_lowercase();
        match input.as_str() {
            "s" => Self::Settings,
            "r" => Self::Reload,
            "i" => Self::Status,
            "q" | "quit" | "exit" => Self::Quit,
            _ => {
                if let Some(n) = input.strip_prefix('d') {
                    match n.parse::<usize>() {
                        Ok(n) if n > 0 => Self::Dhcp(n),
                        _ => Self::Invalid,
                    }
                } else {
                    match input.parse::<usize>() {
                        Ok(n) if n > 0 => Self::Profile(n),
                        _ => Self::Invalid,
                    }
                }
            }
        }
    }
}

/// Application root.
pub struct Application {
    store: Arc<JsonConfigStore>,
    config: SharedConfig,
    tools: NetworkTools,
    activator: Arc<ProfileActivator>,
    coordinator: MenuCoordinator,
    log_dir: PathBuf,
}

impl Application {
    /// Load the configuration and build every service.
    pub fn new(
        store: JsonConfigStore,
        runner: Arc<dyn CommandRunner>,
        notifier: Arc<dyn Notifier>,
        runtime: Handle,
        log_dir: PathBuf,
    ) -> Result<Self> {
        let store = Arc::new(store);
        let config = SharedConfig::new(store.load()?);
        let tools = NetworkTools::new(runner);
        let activator = Arc::new(ProfileActivator::new(
            config.clone(),
            Applier::new(tools.clone()),
            notifier,
        ));
        let coordinator = MenuCoordinator::new(config.clone(), activator.clone(), runtime);

        Ok(Self {
            store,
            config,
            tools,
            activator,
            coordinator,
            log_dir,
        })
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &MenuCoordinator {
        &self.coordinator
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Reload the configuration wholesale and rebuild the menu handlers.
    ///
    /// On a load failure the current configuration and handlers stay.
    pub fn reload(&self) -> Result<()> {
        self.config.reload(self.store.as_ref())?;
        self.coordinator.rebuild();
        info!(
            "Configuration reloaded, menu generation {}",
            self.coordinator.generation()
        );
        Ok(())
    }

    /// Open the settings file in an external editor, wait for it to exit,
    /// then reload and rebuild.
    pub async fn open_settings(&self) -> Result<()> {
        let path = self.store.config_file().to_path_buf();
        if !path.exists() {
            self.config.persist(self.store.as_ref())?;
        }

        let editor = settings_editor();
        info!("Opening settings with {}: {:?}", editor, path);
        let status = tokio::task::spawn_blocking(move || Command::new(&editor).arg(&path).status())
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;
        if !status.success() {
            warn!("Settings editor exited with {}", status);
        }

        self.reload()
    }

    // ========================================================================
    // Console menu
    // ========================================================================

    /// Run the interactive menu until the operator quits or stdin closes.
    pub async fn run_menu(&self) -> Result<()> {
        self.coordinator.rebuild();
        let nics = match self.tools.nic_names() {
            Ok(nics) => nics,
            Err(e) => {
                warn!(code = e.code(), "Could not list adapters for the DHCP menu: {}", e);
                Vec::new()
            }
        };
        self.coordinator.install_dhcp_entries(&nics);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.print_menu();
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match MenuChoice::parse(&line) {
                MenuChoice::Profile(n) => {
                    match self.coordinator.menu_entries().get(n - 1) {
                        Some(entry) => {
                            if let Err(e) = self.coordinator.trigger(&entry.profile_id) {
                                println!("{}", e);
                            }
                        }
                        None => println!("No profile {n}"),
                    }
                }
                MenuChoice::Dhcp(n) => match self.coordinator.dhcp_entries().get(n - 1) {
                    Some(nic) => {
                        if let Err(e) = self.coordinator.trigger_dhcp(nic) {
                            println!("{}", e);
                        }
                    }
                    None => println!("No DHCP entry d{n}"),
                },
                MenuChoice::Status => {
                    // ipconfig blocks; keep it off the menu loop
                    let tools = self.tools.clone();
                    match tokio::task::spawn_blocking(move || print_nic_status(&tools)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => println!("{}", e),
                        Err(e) => error!("Status query panicked: {}", e),
                    }
                }
                MenuChoice::Settings => {
                    if let Err(e) = self.open_settings().await {
                        error!(code = e.code(), "Settings edit failed: {}", e);
                        println!("{}", e);
                    }
                }
                MenuChoice::Reload => {
                    if let Err(e) = self.reload() {
                        error!(code = e.code(), "Reload failed: {}", e);
                        println!("{}", e);
                    }
                }
                MenuChoice::Quit => break,
                MenuChoice::Invalid => println!("Unknown choice: {}", line.trim()),
            }
        }

        self.coordinator.shutdown().await;
        Ok(())
    }

    fn print_menu(&self) {
        debug!(
            running = self.coordinator.live_handlers().total(),
            running_dhcp = self.coordinator.live_dhcp_handlers().total(),
            "Menu generation {}",
            self.coordinator.generation()
        );
        println!();
        println!("{APP_NAME}");
        for (i, entry) in self.coordinator.menu_entries().iter().enumerate() {
            println!("  {:>3}) {:<40} {}", i + 1, entry.label, entry.tooltip);
        }
        let dhcp = self.coordinator.dhcp_entries();
        if !dhcp.is_empty() {
            println!("  DHCP:");
            for (i, nic) in dhcp.iter().enumerate() {
                println!("  {:>3}) {}", format!("d{}", i + 1), nic);
            }
        }
        println!("    i) Status   s) Settings   r) Reload   q) Quit");
        print!("> ");
        let _ = std::io::stdout().flush();
    }

    // ========================================================================
    // One-shot commands
    // ========================================================================

    /// Print every adapter's status.
    pub fn print_status(&self) -> Result<()> {
        print_nic_status(&self.tools)
    }

    /// Print the active IPv4 routes.
    pub fn print_routes(&self) -> Result<()> {
        println!(
            "{:<18} {:<18} {:<18} {:<18} {:>6}",
            "Destination", "Netmask", "Gateway", "Interface", "Metric"
        );
        for route in self.tools.routes()? {
            println!(
                "{:<18} {:<18} {:<18} {:<18} {:>6}",
                route.destination, route.netmask, route.gateway, route.interface, route.metric
            );
        }
        Ok(())
    }

    /// Print the adapter list.
    pub fn print_nics(&self) -> Result<()> {
        let settings = self.config.settings();
        for entry in self.tools.interfaces()? {
            let dhcp = if settings.is_nic_enabled_for_dhcp(&entry.name) { "dhcp-menu" } else { "" };
            println!(
                "{:<30} {:<10} {:<14} {}",
                entry.name, entry.admin_state, entry.state, dhcp
            );
        }
        Ok(())
    }

    /// Print the configured profiles.
    pub fn print_profiles(&self) {
        let profiles = self.config.profiles();
        if profiles.is_empty() {
            println!("No profiles configured ({})", self.store.config_file().display());
            return;
        }
        for profile in profiles {
            println!("{}  {}", profile.id(), profile.menu_label());
            println!("    {} / {}", profile.ip_address, profile.subnet_mask);
            if let Some(gateway) = &profile.gateway {
                println!("    gateway {}", gateway);
            }
            let dns: Vec<&str> = [&profile.dns_primary, &profile.dns_secondary]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();
            if !dns.is_empty() {
                println!("    dns {}", dns.join(", "));
            }
        }
    }

    /// Apply a profile by ID or name.
    pub fn apply(&self, id_or_name: &str) -> Result<ApplyReport> {
        let report = self.activator.activate(id_or_name)?;
        print_report(&report);
        Ok(report)
    }

    /// Switch an adapter to DHCP.
    pub fn dhcp(&self, nic_name: &str) -> Result<ApplyReport> {
        let report = self.activator.switch_dhcp(nic_name)?;
        print_report(&report);
        Ok(report)
    }

    /// Validate, append and save a new profile.
    pub fn add_profile(&self, fields: ProfileFields) -> Result<Profile> {
        let profile = fields.into_profile();
        profile.validate()?;

        self.config.update(|c| c.add_profile(profile.clone()))?;
        self.config.persist(self.store.as_ref())?;
        info!(profile = %profile.name, "Profile added: {}", profile.id());
        Ok(profile)
    }

    /// Replace a profile's fields, keeping its ID and menu position, and
    /// save.
    pub fn edit_profile(&self, id_or_name: &str, fields: ProfileFields) -> Result<Profile> {
        let current = self
            .config
            .find_profile(id_or_name)
            .ok_or_else(|| Error::ProfileNotFound(id_or_name.to_string()))?;
        let edited = fields.into_edit_of(&current);
        edited.validate()?;

        self.config.update(|c| c.update_profile(edited.clone()))?;
        self.config.persist(self.store.as_ref())?;
        info!(profile = %edited.name, "Profile edited: {}", edited.id());
        Ok(edited)
    }

    /// Remove a profile by ID or name and save.
    pub fn remove_profile(&self, id_or_name: &str) -> Result<Profile> {
        let removed = self.config.update(|c| {
            let id = c
                .find_profile(id_or_name)
                .map(|p| p.id().to_string())
                .ok_or_else(|| Error::ProfileNotFound(id_or_name.to_string()))?;
            c.remove_profile(&id)
        })?;
        self.config.persist(self.store.as_ref())?;
        info!(profile = %removed.name, "Profile removed: {}", removed.id());
        Ok(removed)
    }

    /// Replace the DHCP menu NIC selection and save. Empty enables all.
    pub fn set_dhcp_nics(&self, nics: Vec<String>) -> Result<()> {
        self.config.update(|c| {
            c.settings.set_enabled_dhcp_nics(nics);
            Ok(())
        })?;
        self.config.persist(self.store.as_ref())
    }

    /// Print the newest or a named log file.
    pub fn show_logs(&self, name: Option<&str>) -> Result<()> {
        match logging::find_log_file(&self.log_dir, name)? {
            Some(path) => {
                println!("==> {} <==", path.display());
                print!("{}", logging::read_log_file(&path)?);
            }
            None => println!("No log files in {}", self.log_dir.display()),
        }
        Ok(())
    }

    /// Path of the settings file.
    pub fn config_path(&self) -> PathBuf {
        self.store.config_file().to_path_buf()
    }
}

fn print_nic_status(tools: &NetworkTools) -> Result<()> {
    for nic in tools.nic_status()? {
        println!("{} ({})", nic.name, nic.connection_state.as_str());
        println!("  IP address : {}", nic.ip_address);
        println!("  Subnet mask: {}", nic.subnet_mask);
        println!("  Gateway    : {}", nic.gateway);
        println!("  DNS        : {}", nic.dns);
        println!("  DHCP       : {}", nic.dhcp.as_str());
    }
    Ok(())
}

fn print_report(report: &ApplyReport) {
    for step in &report.steps {
        match &step.detail {
            Some(detail) => println!("  {:<20} {:?} ({})", step.step.as_str(), step.status, detail),
            None => println!("  {:<20} {:?}", step.step.as_str(), step.status),
        }
    }
    println!(
        "{}: done in {} ms{}",
        report.nic_name,
        report.total_duration_ms(),
        if report.verified { ", verified" } else { "" }
    );
}

/// Editor for the settings file: `$VISUAL`, `$EDITOR`, then a platform
/// default.
fn settings_editor() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| if cfg!(windows) { "notepad".into() } else { "vi".into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::network::testing::ScriptedRunner;
    use crate::services::notifier::testing::RecordingNotifier;
    use tempfile::{tempdir, TempDir};

    fn app(runner: Arc<ScriptedRunner>) -> (TempDir, Application) {
        let dir = tempdir().unwrap();
        let app = Application::new(
            JsonConfigStore::with_config_dir(dir.path().to_path_buf()),
            runner,
            Arc::new(RecordingNotifier::default()),
            Handle::current(),
            dir.path().join("logs"),
        )
        .unwrap();
        (dir, app)
    }

    fn office() -> ProfileFields {
        ProfileFields {
            name: "Office".into(),
            nic_name: "Ethernet".into(),
            ip_address: "192.168.1.10".into(),
            subnet_mask: "255.255.255.0".into(),
            gateway: "192.168.1.1".into(),
            dns_primary: "8.8.8.8".into(),
            dns_secondary: String::new(),
        }
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("2\n"), MenuChoice::Profile(2));
        assert_eq!(MenuChoice::parse(" d1 "), MenuChoice::Dhcp(1));
        assert_eq!(MenuChoice::parse("D3"), MenuChoice::Dhcp(3));
        assert_eq!(MenuChoice::parse("s"), MenuChoice::Settings);
        assert_eq!(MenuChoice::parse("r"), MenuChoice::Reload);
        assert_eq!(MenuChoice::parse("Q"), MenuChoice::Quit);
        assert_eq!(MenuChoice::parse("0"), MenuChoice::Invalid);
        assert_eq!(MenuChoice::parse("d"), MenuChoice::Invalid);
        assert_eq!(MenuChoice::parse("x"), MenuChoice::Invalid);
    }

    #[tokio::test]
    async fn test_add_and_remove_persist() {
        let (dir, app) = app(ScriptedRunner::new());

        let profile = app.add_profile(office()).unwrap();
        assert_eq!(profile.dns_secondary, None);

        let reloaded = JsonConfigStore::with_config_dir(dir.path().to_path_buf())
            .load()
            .unwrap();
        assert_eq!(reloaded.profiles, vec![profile.clone()]);

        let removed = app.remove_profile("Office").unwrap();
        assert_eq!(removed.id(), profile.id());
        assert!(app.config().profiles().is_empty());
        assert!(matches!(app.remove_profile("Office"), Err(Error::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_profile_is_not_saved() {
        let (_dir, app) = app(ScriptedRunner::new());
        let mut fields = office();
        fields.nic_name = "Ethernet & calc".into();

        let err = app.add_profile(fields).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert!(app.config().profiles().is_empty());
        assert!(!app.config_path().exists());
    }

    #[tokio::test]
    async fn test_add_expands_prefix_length() {
        let (_dir, app) = app(ScriptedRunner::new());
        let mut fields = office();
        fields.subnet_mask = "24".into();
        assert_eq!(app.add_profile(fields).unwrap().subnet_mask, "255.255.255.0");

        let mut fields = office();
        fields.name = "Lab".into();
        fields.subnet_mask = "/16".into();
        assert_eq!(app.add_profile(fields).unwrap().subnet_mask, "255.255.0.0");

        let mut fields = office();
        fields.subnet_mask = "33".into();
        assert_eq!(app.add_profile(fields).unwrap_err().code(), "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_edit_keeps_id_and_position() {
        let (dir, app) = app(ScriptedRunner::new());
        let office = app.add_profile(office()).unwrap();
        let mut lab = self::office();
        lab.name = "Lab".into();
        app.add_profile(lab).unwrap();

        let fields = ProfileFields {
            name: "Office 2F".into(),
            nic_name: "Wi-Fi".into(),
            ip_address: "10.1.2.3".into(),
            subnet_mask: "8".into(),
            ..Default::default()
        };
        let edited = app.edit_profile("Office", fields).unwrap();
        assert_eq!(edited.id(), office.id());
        assert_eq!(edited.subnet_mask, "255.0.0.0");
        assert_eq!(edited.gateway, None);

        let saved = JsonConfigStore::with_config_dir(dir.path().to_path_buf())
            .load()
            .unwrap();
        assert_eq!(saved.profiles.len(), 2);
        assert_eq!(saved.profiles[0], edited);
        assert_eq!(saved.profiles[1].name, "Lab");

        let by_id = app.edit_profile(office.id(), self::office()).unwrap();
        assert_eq!(by_id.id(), office.id());
        assert_eq!(app.config().profiles()[0].name, "Office");
    }

    #[tokio::test]
    async fn test_rejected_edit_changes_nothing() {
        let (dir, app) = app(ScriptedRunner::new());
        let office = app.add_profile(office()).unwrap();

        let mut fields = self::office();
        fields.ip_address = "192.168.1.300".into();
        let err = app.edit_profile("Office", fields).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert_eq!(app.config().profiles(), vec![office.clone()]);

        let saved = JsonConfigStore::with_config_dir(dir.path().to_path_buf())
            .load()
            .unwrap();
        assert_eq!(saved.profiles, vec![office]);

        assert!(matches!(
            app.edit_profile("Nowhere", self::office()),
            Err(Error::ProfileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reload_rebuilds_menu() {
        let (dir, app) = app(ScriptedRunner::new());
        app.add_profile(office()).unwrap();
        app.coordinator().rebuild();
        assert_eq!(app.coordinator().menu_entries().len(), 1);

        // An external edit adds a second profile
        let store = JsonConfigStore::with_config_dir(dir.path().to_path_buf());
        let mut edited = store.load().unwrap();
        edited
            .add_profile(Profile::new("Lab", "Wi-Fi", "10.0.0.2", "255.0.0.0"))
            .unwrap();
        store.save(&edited).unwrap();

        app.reload().unwrap();
        let labels: Vec<String> = app
            .coordinator()
            .menu_entries()
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["Office [Ethernet]", "Lab [Wi-Fi]"]);
        assert_eq!(app.coordinator().generation(), 2);

        app.coordinator().shutdown().await;
    }

    #[tokio::test]
    async fn test_apply_by_name() {
        let runner = ScriptedRunner::new();
        runner.on("show config", CommandOutput::ok("    IP Address:  192.168.1.10\n"));
        let (_dir, app) = app(runner.clone());
        app.add_profile(office()).unwrap();

        let report = app.apply("Office").unwrap();
        assert!(report.verified);
        assert_eq!(runner.count("set address name=Ethernet static 192.168.1.10"), 1);
    }

    #[tokio::test]
    async fn test_dhcp_nic_selection_is_saved() {
        let (dir, app) = app(ScriptedRunner::new());
        app.set_dhcp_nics(vec!["Wi-Fi".into()]).unwrap();

        let saved = JsonConfigStore::with_config_dir(dir.path().to_path_buf())
            .load()
            .unwrap();
        assert!(saved.settings.is_nic_enabled_for_dhcp("Wi-Fi"));
        assert!(!saved.settings.is_nic_enabled_for_dhcp("Ethernet"));

        app.set_dhcp_nics(Vec::new()).unwrap();
        assert!(app.config().settings().is_nic_enabled_for_dhcp("Ethernet"));
    }
}
