// Fast IP Change - Menu State Coordinator
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Supervisor for the per-entry trigger handlers behind the menu.
//!
//! Every visible profile owns one tokio task that waits on two channels:
//! a trigger queue and a cancellation channel. Cancellation is signalled by
//! dropping the `watch::Sender`, which wakes the receiver exactly once and
//! needs no knowledge of how many tasks listen.
//!
//! [`MenuCoordinator::rebuild`] is the only way the profile handler set
//! changes. It closes every current cancellation channel, forgets the old
//! bookkeeping, reads the profile list and spawns one handler per profile.
//! A replacement handler first waits for every earlier task of the same
//! profile ID to exit, including tasks retired by older rebuilds when the ID
//! was removed and later restored, so two generations for the same ID never
//! run at the same time.
//!
//! DHCP entries are installed once per process and are never touched by a
//! rebuild. Changes to the DHCP NIC selection apply after a restart.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::{Error, Result};
use crate::storage::SharedConfig;

/// Queued triggers per handler. Extra clicks beyond this are dropped.
const TRIGGER_QUEUE_DEPTH: usize = 4;

/// Work performed when a menu entry fires.
///
/// Both calls block and run on the blocking thread pool.
pub trait TriggerHandler: Send + Sync + 'static {
    /// Activate the profile with this ID.
    fn activate_profile(&self, profile_id: &str);

    /// Switch this adapter to DHCP.
    fn switch_to_dhcp(&self, nic_name: &str);
}

/// One profile entry of the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub profile_id: String,
    /// "Name [NIC]"
    pub label: String,
    /// "IP: <address>"
    pub tooltip: String,
}

#[derive(Debug, Clone)]
enum HandlerKind {
    Profile(String),
    Dhcp(String),
}

impl HandlerKind {
    fn key(&self) -> String {
        match self {
            Self::Profile(id) => id.clone(),
            Self::Dhcp(nic) => format!("dhcp:{nic}"),
        }
    }
}

/// Live handler of the current generation.
struct HandlerSlot {
    /// Dropped to cancel.
    cancel: watch::Sender<()>,
    trigger: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct State {
    generation: u64,
    handlers: HashMap<String, HandlerSlot>,
    entries: Vec<MenuEntry>,
    /// Cancelled tasks whose profile is gone, by profile ID. Awaited by a
    /// handler that restores the ID, otherwise on shutdown.
    retiring: HashMap<String, Vec<JoinHandle<()>>>,
    dhcp: Vec<(String, HandlerSlot)>,
    dhcp_installed: bool,
}

/// Count of running handler tasks, per key.
#[derive(Default)]
pub struct LiveHandlers {
    counts: Mutex<HashMap<String, (usize, usize)>>,
}

impl LiveHandlers {
    fn counts(&self) -> MutexGuard<'_, HashMap<String, (usize, usize)>> {
        match self.counts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Mutex poisoned reading live handlers, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn enter(self: &Arc<Self>, key: String) -> LiveGuard {
        {
            let mut counts = self.counts();
            let entry = counts.entry(key.clone()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 = entry.1.max(entry.0);
        }
        LiveGuard {
            registry: Arc::clone(self),
            key,
        }
    }

    /// Running handlers for one key.
    #[cfg(test)]
    pub fn count(&self, key: &str) -> usize {
        self.counts().get(key).map_or(0, |(live, _)| *live)
    }

    /// Highest number of handlers ever running at once for one key.
    #[cfg(test)]
    pub fn peak(&self, key: &str) -> usize {
        self.counts().get(key).map_or(0, |(_, peak)| *peak)
    }

    /// Running handlers across all keys.
    pub fn total(&self) -> usize {
        self.counts().values().map(|(live, _)| live).sum()
    }
}

struct LiveGuard {
    registry: Arc<LiveHandlers>,
    key: String,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        if let Some(entry) = self.registry.counts().get_mut(&self.key) {
            entry.0 = entry.0.saturating_sub(1);
        }
    }
}

/// Cancel-and-replace supervisor for menu trigger handlers.
pub struct MenuCoordinator {
    config: SharedConfig,
    handler: Arc<dyn TriggerHandler>,
    runtime: Handle,
    state: Mutex<State>,
    profile_live: Arc<LiveHandlers>,
    dhcp_live: Arc<LiveHandlers>,
}

impl MenuCoordinator {
    /// Create a coordinator that spawns its handlers on `runtime`.
    pub fn new(config: SharedConfig, handler: Arc<dyn TriggerHandler>, runtime: Handle) -> Self {
        Self {
            config,
            handler,
            runtime,
            state: Mutex::new(State::default()),
            profile_live: Arc::new(LiveHandlers::default()),
            dhcp_live: Arc::new(LiveHandlers::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Mutex poisoned reading coordinator state, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Replace every profile handler with one per current profile.
    ///
    /// Concurrent calls are serialized; each one fully cancels the previous
    /// generation before spawning the next.
    pub fn rebuild(&self) {
        let mut state = self.state();
        state.generation += 1;
        let generation = state.generation;

        // (1) + (2): close every cancellation channel, drop the bookkeeping
        let mut predecessors: HashMap<String, Vec<JoinHandle<()>>> = HashMap::new();
        for (id, slot) in state.handlers.drain() {
            drop(slot.cancel);
            predecessors.entry(id).or_default().push(slot.task);
        }
        state.entries.clear();
        state.retiring.retain(|_, tasks| {
            tasks.retain(|task| !task.is_finished());
            !tasks.is_empty()
        });

        // (3): profile list under the config read lock
        let profiles = self.config.profiles();

        // (4): one handler per profile, in list order
        let mut seen = HashSet::new();
        for profile in &profiles {
            let id = profile.id().to_string();
            if !seen.insert(id.clone()) {
                warn!(profile = %id, "Duplicate profile ID in configuration, skipped");
                continue;
            }

            let mut earlier = predecessors.remove(&id).unwrap_or_default();
            earlier.extend(state.retiring.remove(&id).unwrap_or_default());
            let slot = self.spawn_handler(
                HandlerKind::Profile(id.clone()),
                earlier,
                Arc::clone(&self.profile_live),
            );
            state.handlers.insert(id.clone(), slot);
            state.entries.push(MenuEntry {
                profile_id: id,
                label: profile.menu_label(),
                tooltip: format!("IP: {}", profile.ip_address),
            });
        }

        let removed = predecessors.len();
        for (id, tasks) in predecessors {
            state.retiring.entry(id).or_default().extend(tasks);
        }

        info!(
            "Menu rebuilt (generation {}): {} profile handlers, {} removed",
            generation,
            state.handlers.len(),
            removed
        );
    }

    /// Install DHCP entries for the enabled NICs. Only the first call has
    /// any effect; returns the installed adapter names.
    pub fn install_dhcp_entries(&self, nics: &[String]) -> Vec<String> {
        let settings = self.config.settings();
        let mut state = self.state();
        if state.dhcp_installed {
            warn!("DHCP entries already installed, restart to apply changes");
            return state.dhcp.iter().map(|(nic, _)| nic.clone()).collect();
        }
        state.dhcp_installed = true;

        for nic in nics {
            if !settings.is_nic_enabled_for_dhcp(nic) {
                debug!(nic = %nic, "DHCP entry disabled in settings");
                continue;
            }
            if state.dhcp.iter().any(|(existing, _)| existing == nic) {
                continue;
            }
            let slot = self.spawn_handler(
                HandlerKind::Dhcp(nic.clone()),
                Vec::new(),
                Arc::clone(&self.dhcp_live),
            );
            state.dhcp.push((nic.clone(), slot));
        }

        info!("Installed {} DHCP entries", state.dhcp.len());
        state.dhcp.iter().map(|(nic, _)| nic.clone()).collect()
    }

    /// Fire the handler of a profile.
    pub fn trigger(&self, profile_id: &str) -> Result<()> {
        let state = self.state();
        let slot = state
            .handlers
            .get(profile_id)
            .ok_or_else(|| Error::ProfileNotFound(profile_id.to_string()))?;
        queue_trigger(&slot.trigger, profile_id);
        Ok(())
    }

    /// Fire the DHCP handler of an adapter.
    pub fn trigger_dhcp(&self, nic_name: &str) -> Result<()> {
        let state = self.state();
        let (_, slot) = state
            .dhcp
            .iter()
            .find(|(nic, _)| nic == nic_name)
            .ok_or_else(|| Error::DhcpEntryNotFound(nic_name.to_string()))?;
        queue_trigger(&slot.trigger, nic_name);
        Ok(())
    }

    /// Profile entries in menu order.
    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        self.state().entries.clone()
    }

    /// Adapters with a DHCP entry.
    pub fn dhcp_entries(&self) -> Vec<String> {
        self.state().dhcp.iter().map(|(nic, _)| nic.clone()).collect()
    }

    /// Rebuild counter, starting at 0 before the first rebuild.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Running profile handler tasks.
    pub fn live_handlers(&self) -> &LiveHandlers {
        &self.profile_live
    }

    /// Running DHCP handler tasks.
    pub fn live_dhcp_handlers(&self) -> &LiveHandlers {
        &self.dhcp_live
    }

    /// Cancel every handler, including DHCP entries, and wait for all of
    /// them to exit.
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = {
            let mut state = self.state();
            let mut tasks: Vec<JoinHandle<()>> =
                state.retiring.drain().flat_map(|(_, tasks)| tasks).collect();
            for (_, slot) in state.handlers.drain() {
                drop(slot.cancel);
                tasks.push(slot.task);
            }
            for (_, slot) in state.dhcp.drain(..) {
                drop(slot.cancel);
                tasks.push(slot.task);
            }
            state.entries.clear();
            tasks
        };

        let count = tasks.len();
        for task in tasks {
            if let Err(e) = task.await {
                error!("Handler task failed during shutdown: {}", e);
            }
        }
        info!("Coordinator stopped ({} handler tasks joined)", count);
    }

    fn spawn_handler(
        &self,
        kind: HandlerKind,
        earlier: Vec<JoinHandle<()>>,
        live: Arc<LiveHandlers>,
    ) -> HandlerSlot {
        let (cancel, cancel_rx) = watch::channel(());
        let (trigger, trigger_rx) = mpsc::channel(TRIGGER_QUEUE_DEPTH);
        let task = self.runtime.spawn(run_handler(
            kind,
            earlier,
            cancel_rx,
            trigger_rx,
            Arc::clone(&self.handler),
            live,
        ));
        HandlerSlot {
            cancel,
            trigger,
            task,
        }
    }
}

fn queue_trigger(trigger: &mpsc::Sender<()>, key: &str) {
    match trigger.try_send(()) {
        Ok(()) => debug!("Trigger queued for {}", key),
        Err(mpsc::error::TrySendError::Full(())) => {
            warn!("Trigger queue full for {}, dropping", key)
        }
        Err(mpsc::error::TrySendError::Closed(())) => {
            warn!("Handler for {} has exited, dropping trigger", key)
        }
    }
}

async fn run_handler(
    kind: HandlerKind,
    earlier: Vec<JoinHandle<()>>,
    mut cancel: watch::Receiver<()>,
    mut triggers: mpsc::Receiver<()>,
    handler: Arc<dyn TriggerHandler>,
    live: Arc<LiveHandlers>,
) {
    for previous in earlier {
        if let Err(e) = previous.await {
            error!("Previous handler for {} failed: {}", kind.key(), e);
        }
    }

    let _live = live.enter(kind.key());
    debug!("Handler started: {}", kind.key());

    loop {
        tokio::select! {
            biased;
            // Any wake-up is a cancellation: nothing ever sends a value
            _ = cancel.changed() => break,
            received = triggers.recv() => {
                if received.is_none() {
                    break;
                }
                let handler = Arc::clone(&handler);
                let job = kind.clone();
                let work = tokio::task::spawn_blocking(move || match &job {
                    HandlerKind::Profile(id) => handler.activate_profile(id),
                    HandlerKind::Dhcp(nic) => handler.switch_to_dhcp(nic),
                });
                if let Err(e) = work.await {
                    error!("Handler work for {} panicked: {}", kind.key(), e);
                }
            }
        }
    }

    debug!("Handler cancelled: {}", kind.key());
}
