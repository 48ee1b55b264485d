// Fast IP Change - Configuration Storage
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Configuration persistence and the shared in-memory configuration.
//!
//! Handles:
//! - Loading and saving the JSON settings document ([`JsonConfigStore`])
//! - The process-wide configuration behind a read/write lock ([`SharedConfig`])
//!
//! Lock poisoning is handled by recovering the inner value, as poison
//! indicates a panic in another thread but the data itself may still be
//! valid. No file or process I/O ever happens while a lock is held.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::models::{Config, Error, Profile, Result, Settings, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Loads and saves the whole configuration document.
pub trait ConfigStore: Send + Sync {
    /// Load the configuration. A missing file yields the default config.
    fn load(&self) -> Result<Config>;

    /// Replace the persisted configuration.
    fn save(&self, config: &Config) -> Result<()>;
}

/// JSON file store at `<config dir>/FastIPChange/settings.json`.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl JsonConfigStore {
    /// Create a store in the user's configuration directory.
    pub fn new() -> Self {
        Self::with_config_dir(default_config_dir())
    }

    /// Create a store in a specific directory.
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        }
    }

    /// Get the settings file path.
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }
}

impl Default for JsonConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<Config> {
        if !self.config_file.exists() {
            info!("No configuration at {:?}, using defaults", self.config_file);
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| Error::ConfigReadFailed(format!("{}: {}", self.config_file.display(), e)))?;
        if content.trim().is_empty() {
            warn!("Configuration file {:?} is empty, using defaults", self.config_file);
            return Ok(Config::default());
        }

        let config = Config::from_json(&content)?;
        info!(
            "Loaded {} profiles from {:?}",
            config.profiles.len(),
            self.config_file
        );
        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| Error::ConfigWriteFailed(format!("{}: {}", self.config_dir.display(), e)))?;

        let json = config.to_json()?;
        fs::write(&self.config_file, json)
            .map_err(|e| Error::ConfigWriteFailed(format!("{}: {}", self.config_file.display(), e)))?;

        // Set restrictive permissions on the settings file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&self.config_file, fs::Permissions::from_mode(0o600));
        }

        debug!("Saved configuration to {:?}", self.config_file);
        Ok(())
    }
}

/// `<user config dir>/FastIPChange`, or `./FastIPChange` without one.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// The single in-memory configuration shared by the whole process.
///
/// Readers get value copies; writers replace or edit under the lock and
/// never perform I/O while holding it.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<Config>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    // ========================================================================
    // RwLock Helper Methods (handle poisoning gracefully)
    // ========================================================================

    fn read_lock<F, R>(&self, context: &str, reader: F) -> R
    where
        F: FnOnce(&Config) -> R,
    {
        match self.inner.read() {
            Ok(guard) => reader(&guard),
            Err(poisoned) => {
                warn!("RwLock poisoned reading {}, recovering", context);
                reader(&poisoned.into_inner())
            }
        }
    }

    fn write_lock<F, R>(&self, context: &str, writer: F) -> R
    where
        F: FnOnce(&mut Config) -> R,
    {
        match self.inner.write() {
            Ok(mut guard) => writer(&mut guard),
            Err(poisoned) => {
                warn!("RwLock poisoned writing {}, recovering", context);
                writer(&mut poisoned.into_inner())
            }
        }
    }

    // ========================================================================
    // Readers
    // ========================================================================

    /// Copy of the whole configuration.
    pub fn snapshot(&self) -> Config {
        self.read_lock("config", Config::clone)
    }

    /// Profiles in menu order.
    pub fn profiles(&self) -> Vec<Profile> {
        self.read_lock("profiles", |c| c.profiles.clone())
    }

    /// Find a profile by ID or exact name.
    pub fn find_profile(&self, id_or_name: &str) -> Option<Profile> {
        self.read_lock("profiles", |c| c.find_profile(id_or_name).cloned())
    }

    /// Copy of the settings.
    pub fn settings(&self) -> Settings {
        self.read_lock("settings", |c| c.settings.clone())
    }

    // ========================================================================
    // Writers
    // ========================================================================

    /// Replace the whole configuration.
    pub fn replace(&self, config: Config) {
        self.write_lock("config", |c| *c = config);
    }

    /// Edit the configuration in place.
    ///
    /// The closure runs under the write lock and must not block.
    pub fn update<F, R>(&self, edit: F) -> Result<R>
    where
        F: FnOnce(&mut Config) -> Result<R>,
    {
        self.write_lock("config", edit)
    }

    /// Reload from a store and replace the in-memory copy.
    ///
    /// On failure the current configuration is kept.
    pub fn reload(&self, store: &dyn ConfigStore) -> Result<()> {
        let config = store.load()?;
        let count = config.profiles.len();
        self.replace(config);
        info!("Configuration reloaded ({} profiles)", count);
        Ok(())
    }

    /// Save a snapshot to a store.
    pub fn persist(&self, store: &dyn ConfigStore) -> Result<()> {
        let snapshot = self.snapshot();
        store.save(&snapshot)
    }
}
